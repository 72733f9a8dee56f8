//! Deployment scaffolding
//!
//! Creates a new deployment directory with placeholder files for every phase
//! so the unit is immediately runnable as a no-op: comment-only SQL for
//! expand/migrate/contract and documented shell stubs for all four phases.
//!
//! Templates are embedded at compile time as immutable constants.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::ZddResult;
use crate::models::{Deployment, DeploymentId};
use crate::parser::load_deployments;

const EXPAND_SQL_TEMPLATE: &str = include_str!("../assets/expand.sql");
const MIGRATE_SQL_TEMPLATE: &str = include_str!("../assets/migrate.sql");
const CONTRACT_SQL_TEMPLATE: &str = include_str!("../assets/contract.sql");
const EXPAND_SCRIPT_TEMPLATE: &str = include_str!("../assets/expand.sh");
const MIGRATE_SCRIPT_TEMPLATE: &str = include_str!("../assets/migrate.sh");
const CONTRACT_SCRIPT_TEMPLATE: &str = include_str!("../assets/contract.sh");
const POST_SCRIPT_TEMPLATE: &str = include_str!("../assets/post.sh");

/// Sanitize a raw deployment name: lowercase, spaces become underscores.
pub fn sanitize_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Allocate the next sequential ID from the deployments already on disk.
pub fn next_deployment_id(existing: &[Deployment]) -> DeploymentId {
    existing
        .iter()
        .map(|d| &d.id)
        .max()
        .map(DeploymentId::next)
        .unwrap_or_else(DeploymentId::first)
}

/// Create a new deployment directory under `root` with template phase files.
///
/// Partially created directories are not rolled back; re-running `create`
/// with the same name reuses the directory and overwrites the placeholders.
pub fn create_deployment(root: &Path, raw_name: &str) -> ZddResult<Deployment> {
    let name = sanitize_name(raw_name);

    let existing = load_deployments(root)?;
    let id = next_deployment_id(&existing);

    let dir = root.join(format!("{id}_{name}"));
    let deployment = Deployment::new(id, name, dir);

    fs::create_dir_all(&deployment.directory)?;

    let files: [(&str, &str, bool); 7] = [
        ("expand.sql", EXPAND_SQL_TEMPLATE, false),
        ("migrate.sql", MIGRATE_SQL_TEMPLATE, false),
        ("contract.sql", CONTRACT_SQL_TEMPLATE, false),
        ("expand.sh", EXPAND_SCRIPT_TEMPLATE, true),
        ("migrate.sh", MIGRATE_SCRIPT_TEMPLATE, true),
        ("contract.sh", CONTRACT_SCRIPT_TEMPLATE, true),
        ("post.sh", POST_SCRIPT_TEMPLATE, true),
    ];
    for (file_name, content, executable) in files {
        write_template(&deployment.directory, file_name, content, executable)?;
    }

    Ok(deployment)
}

/// Atomic write-then-rename of one template file.
fn write_template(dir: &Path, file_name: &str, content: &str, executable: bool) -> ZddResult<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;

    #[cfg(unix)]
    if executable {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o755))?;
    }
    #[cfg(not(unix))]
    let _ = executable;

    tmp.persist(dir.join(file_name)).map_err(|e| e.error)?;
    Ok(())
}
