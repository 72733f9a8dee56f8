//! Core data models for zdd
//!
//! Defines the fundamental data structures used throughout zdd:
//! - `DeploymentId`: fixed-width sequential identifier
//! - `Phase`: the four workflow phases in execution order
//! - `Deployment`: a named unit of schema change and its phase files
//! - `AppliedDeployment`: a row of the durable ledger

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width of the zero-padded sequential deployment ID.
pub const ID_WIDTH: usize = 6;

/// Identifier of a deployment: a fixed-width, zero-padded decimal string.
///
/// Fixed width keeps string order and numeric order identical, so IDs sort
/// the same way on disk, in the ledger, and in memory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(String);

impl DeploymentId {
    /// Parse an ID string. Accepts exactly `ID_WIDTH` ASCII digits.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == ID_WIDTH && s.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    /// The ID allocated in an empty deployments root.
    pub fn first() -> Self {
        Self::from_number(1)
    }

    pub fn from_number(n: u64) -> Self {
        Self(format!("{n:06}"))
    }

    pub fn number(&self) -> u64 {
        // Content is validated as <= ID_WIDTH digits, so this cannot fail.
        self.0.parse().unwrap_or(0)
    }

    /// The ID following this one.
    pub fn next(&self) -> Self {
        Self::from_number(self.number() + 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the four workflow phases, in fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Expand,
    Migrate,
    Contract,
    Post,
}

impl Phase {
    /// All phases, in execution order.
    pub const ALL: [Phase; 4] = [Phase::Expand, Phase::Migrate, Phase::Contract, Phase::Post];

    /// Phases that may carry SQL. `post` is script-only.
    pub const SQL: [Phase; 3] = [Phase::Expand, Phase::Migrate, Phase::Contract];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Expand => "expand",
            Phase::Migrate => "migrate",
            Phase::Contract => "contract",
            Phase::Post => "post",
        }
    }

    pub fn parse(s: &str) -> Option<Phase> {
        match s {
            "expand" => Some(Phase::Expand),
            "migrate" => Some(Phase::Migrate),
            "contract" => Some(Phase::Contract),
            "post" => Some(Phase::Post),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single SQL file attached to a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFile {
    pub path: PathBuf,
    /// Numeric suffix of batch files like `expand.2.sql`; plain files are 0.
    pub sequence: u32,
    pub content: String,
}

impl SqlFile {
    /// Whether the file contains statements once `--` comments and blank
    /// lines are stripped. Comment-only files behave as if never created.
    pub fn has_statements(&self) -> bool {
        self.content.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("--")
        })
    }
}

/// A shell script attached to a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub path: PathBuf,
}

/// The files one phase contributes: at most one script plus SQL batches
/// ordered by sequence number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseFiles {
    pub script: Option<ScriptFile>,
    pub sql: Vec<SqlFile>,
}

impl PhaseFiles {
    /// Whether any SQL file of this phase carries real statements.
    pub fn has_sql_statements(&self) -> bool {
        self.sql.iter().any(SqlFile::has_statements)
    }
}

/// A named, ID-ordered unit of schema change composed of up to four phases.
///
/// Deployments are read-only reconstructions of filesystem state, recomputed
/// on every invocation; the ledger is the only durable state.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub id: DeploymentId,
    /// Sanitized name (lowercase, underscores), embedded in the directory name.
    pub name: String,
    pub directory: PathBuf,
    /// Populated from the ledger once the deployment is recorded as applied.
    pub applied_at: Option<DateTime<Utc>>,
    pub expand: PhaseFiles,
    pub migrate: PhaseFiles,
    pub contract: PhaseFiles,
    /// Script-only by construction: the parser never attaches `post.sql`.
    pub post: PhaseFiles,
}

impl Deployment {
    /// Create a deployment with empty phases.
    pub fn new(id: DeploymentId, name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.into(),
            directory: directory.into(),
            applied_at: None,
            expand: PhaseFiles::default(),
            migrate: PhaseFiles::default(),
            contract: PhaseFiles::default(),
            post: PhaseFiles::default(),
        }
    }

    pub fn phase(&self, phase: Phase) -> &PhaseFiles {
        match phase {
            Phase::Expand => &self.expand,
            Phase::Migrate => &self.migrate,
            Phase::Contract => &self.contract,
            Phase::Post => &self.post,
        }
    }

    pub fn phase_mut(&mut self, phase: Phase) -> &mut PhaseFiles {
        match phase {
            Phase::Expand => &mut self.expand,
            Phase::Migrate => &mut self.migrate,
            Phase::Contract => &mut self.contract,
            Phase::Post => &mut self.post,
        }
    }

    /// Directory name of the form `{id}_{name}`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }

    /// SQL phases that actually contain statements, for the status report.
    pub fn phases_with_sql(&self) -> Vec<Phase> {
        Phase::SQL
            .into_iter()
            .filter(|&p| self.phase(p).has_sql_statements())
            .collect()
    }

    /// Integrity fingerprint: SHA-256 over the expand, migrate, and contract
    /// SQL content in that fixed order (sequence order within a phase).
    /// Post-phase content is excluded. Attached to the ledger row at
    /// recording time, never stored on the entity.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for phase in Phase::SQL {
            for sql in &self.phase(phase).sql {
                hasher.update(sql.content.as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

/// A row of the applied-deployments ledger. Created exactly once per
/// deployment, after all of its tasks succeed; never updated or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDeployment {
    pub id: DeploymentId,
    pub name: String,
    pub applied_at: DateTime<Utc>,
    pub checksum: String,
}
