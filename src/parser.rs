//! Deployment directory parsing
//!
//! Turns the deployments root into `Deployment` entities. Directory and file
//! names are recognized by a small explicit grammar rather than regexes, so
//! the accepted format is auditable in one place:
//!
//! - deployment directories: `{id}_{name}`, `id` exactly six digits
//! - SQL files: `{phase}.sql` or `{phase}.{n}.sql` for expand/migrate/contract
//! - scripts: `{phase}.sh` for all four phases, executable bit required
//!
//! Root-level `{phase}.sh` files act as defaults for deployments that do not
//! carry their own script; a deployment-specific script always wins.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ZddError, ZddResult};
use crate::models::{Deployment, DeploymentId, Phase, ScriptFile, SqlFile};

/// A recognized phase file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseFileName {
    pub phase: Phase,
    pub kind: PhaseFileKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseFileKind {
    /// `{phase}.sql` (sequence 0) or `{phase}.{n}.sql`.
    Sql { sequence: u32 },
    /// `{phase}.sh`.
    Script,
}

/// Parse a deployment directory name of the form `{id}_{name}`.
///
/// Returns `None` for anything else; non-matching directories are skipped by
/// the scanner, not treated as errors.
pub fn parse_dir_name(name: &str) -> Option<(DeploymentId, &str)> {
    let (id_part, name_part) = name.split_once('_')?;
    let id = DeploymentId::parse(id_part)?;
    if name_part.is_empty() {
        return None;
    }
    Some((id, name_part))
}

/// Parse a phase file name into its typed form.
pub fn parse_phase_file_name(name: &str) -> Option<PhaseFileName> {
    let (stem, ext) = name.rsplit_once('.')?;
    match ext {
        "sh" => {
            let phase = Phase::parse(stem)?;
            Some(PhaseFileName {
                phase,
                kind: PhaseFileKind::Script,
            })
        }
        "sql" => {
            let (phase_part, sequence) = match stem.split_once('.') {
                Some((p, digits)) => {
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    (p, digits.parse().ok()?)
                }
                None => (stem, 0),
            };
            let phase = Phase::parse(phase_part)?;
            if phase == Phase::Post {
                // post carries a script, never SQL
                return None;
            }
            Some(PhaseFileName {
                phase,
                kind: PhaseFileKind::Sql { sequence },
            })
        }
        _ => None,
    }
}

/// Load all deployments under `root`, ascending by ID.
///
/// A missing root yields an empty list (not an error); an unreadable root or
/// subdirectory is an error. Entries that do not match the `{id}_{name}`
/// pattern are silently skipped.
pub fn load_deployments(root: &Path) -> ZddResult<Vec<Deployment>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(root).map_err(|source| ZddError::ReadDir {
        path: root.to_path_buf(),
        source,
    })?;

    let defaults = load_default_scripts(root);

    let mut deployments = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ZddError::ReadDir {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.path().is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some((id, name)) = parse_dir_name(file_name) else {
            continue;
        };

        let mut deployment = load_deployment(entry.path(), id, name)?;
        for (phase, script) in &defaults {
            let files = deployment.phase_mut(*phase);
            if files.script.is_none() {
                files.script = Some(script.clone());
            }
        }
        deployments.push(deployment);
    }

    deployments.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(deployments)
}

/// Load a single deployment from its directory.
fn load_deployment(dir: PathBuf, id: DeploymentId, name: &str) -> ZddResult<Deployment> {
    let entries = fs::read_dir(&dir).map_err(|source| ZddError::ReadDir {
        path: dir.clone(),
        source,
    })?;

    let mut deployment = Deployment::new(id.clone(), name, dir);

    for entry in entries {
        let entry = entry.map_err(|source| ZddError::ReadDir {
            path: deployment.directory.clone(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(parsed) = parse_phase_file_name(file_name) else {
            continue;
        };

        match parsed.kind {
            PhaseFileKind::Sql { sequence } => {
                let content =
                    fs::read_to_string(&path).map_err(|source| ZddError::InvalidDeployment {
                        id: id.to_string(),
                        message: format!("failed to read {}: {source}", path.display()),
                    })?;
                deployment.phase_mut(parsed.phase).sql.push(SqlFile {
                    path,
                    sequence,
                    content,
                });
            }
            PhaseFileKind::Script => {
                if is_executable(&path) {
                    deployment.phase_mut(parsed.phase).script = Some(ScriptFile { path });
                }
            }
        }
    }

    for phase in Phase::ALL {
        deployment.phase_mut(phase).sql.sort_by_key(|f| f.sequence);
    }

    Ok(deployment)
}

/// Root-level fallback scripts, one per phase at most.
fn load_default_scripts(root: &Path) -> Vec<(Phase, ScriptFile)> {
    Phase::ALL
        .into_iter()
        .filter_map(|phase| {
            let path = root.join(format!("{phase}.sh"));
            (path.is_file() && is_executable(&path)).then_some((phase, ScriptFile { path }))
        })
        .collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
