//! zdd - zero-downtime deployments for PostgreSQL schema changes
//!
//! zdd models schema changes as ordered deployment units, each contributing
//! SQL and/or shell hooks to the four phases of the expand-migrate-contract
//! workflow. The tool determines which deployments are outstanding, executes
//! their phases in a fixed global order, and durably records success in a
//! ledger table.

pub mod compare;
pub mod config;
pub mod db;
pub mod error;
pub mod execute;
pub mod models;
pub mod parser;
pub mod plan;
pub mod scaffold;
pub mod schema_diff;
pub mod script;

// Re-exports for convenience
pub use compare::{compare_deployments, DeploymentStatus};
pub use config::Config;
pub use db::{DatabaseProvider, PostgresDb};
pub use error::{ZddError, ZddResult};
pub use execute::Deployer;
pub use models::{AppliedDeployment, Deployment, DeploymentId, Phase, PhaseFiles, ScriptFile, SqlFile};
pub use parser::{load_deployments, parse_dir_name, parse_phase_file_name};
pub use plan::{build_plan, Plan, Task, TaskKind};
pub use scaffold::create_deployment;
pub use script::{CommandExecutor, ShellExecutor};
