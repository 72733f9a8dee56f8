//! Database capability interface and adapters.
//!
//! The core never talks to PostgreSQL directly; everything goes through the
//! `DatabaseProvider` trait so production and test implementations are
//! interchangeable.

pub mod postgres;

pub use postgres::PostgresDb;

use crate::error::ZddResult;
use crate::models::{AppliedDeployment, Deployment};

/// Capability interface for the relational database behind the ledger.
pub trait DatabaseProvider {
    /// Create the ledger schema and table if they do not exist.
    fn init_ledger(&mut self) -> ZddResult<()>;

    /// All recorded deployments, ordered by `applied_at` ascending.
    fn applied_deployments(&mut self) -> ZddResult<Vec<AppliedDeployment>>;

    /// Execute a SQL batch atomically: all statements in one transaction,
    /// committed together or not at all.
    fn execute_sql_in_transaction(&mut self, sql: &str) -> ZddResult<()>;

    /// Record a deployment as applied. Called exactly once per deployment,
    /// immediately after all of its tasks succeed.
    fn record_deployment(&mut self, deployment: &Deployment, checksum: &str) -> ZddResult<()>;

    /// Dump a textual description of the current schema.
    fn dump_schema(&mut self) -> ZddResult<String>;

    /// Connection descriptor, propagated to phase scripts as
    /// `ZDD_DATABASE_URL`.
    fn connection_url(&self) -> &str;
}
