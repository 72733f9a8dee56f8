//! PostgreSQL implementation of `DatabaseProvider`.
//!
//! The ledger lives in a dedicated `zdd` schema, one table keyed by
//! deployment ID with an index on `applied_at` for ordered retrieval.

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls};

use crate::error::{ZddError, ZddResult};
use crate::models::{AppliedDeployment, Deployment, DeploymentId};

use super::DatabaseProvider;

/// Ledger schema and table, created on `init_ledger`. Idempotent.
const SETUP_SCHEMA_SQL: &str = include_str!("../../assets/setup_schema.sql");

/// Table definitions of everything outside the system catalogs, rendered as
/// one CREATE TABLE line per table.
const DUMP_SCHEMA_SQL: &str = "\
    SELECT t.table_schema, t.table_name,
           'CREATE TABLE ' || t.table_schema || '.' || t.table_name || ' (' ||
           array_to_string(
               array_agg(c.column_name || ' ' || c.data_type ORDER BY c.ordinal_position),
               ', '
           ) || ');' AS table_def
    FROM information_schema.tables t
    JOIN information_schema.columns c
      ON t.table_name = c.table_name
     AND t.table_schema = c.table_schema
    WHERE t.table_schema NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
    GROUP BY t.table_schema, t.table_name
    ORDER BY t.table_schema, t.table_name";

/// PostgreSQL-backed ledger and SQL executor.
pub struct PostgresDb {
    client: Client,
    url: String,
}

impl PostgresDb {
    /// Connect to the database at `url`.
    pub fn connect(url: &str) -> ZddResult<Self> {
        let client = Client::connect(url, NoTls)?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl DatabaseProvider for PostgresDb {
    fn init_ledger(&mut self) -> ZddResult<()> {
        self.client.batch_execute(SETUP_SCHEMA_SQL)?;
        Ok(())
    }

    fn applied_deployments(&mut self) -> ZddResult<Vec<AppliedDeployment>> {
        let rows = self.client.query(
            "SELECT id, name, applied_at, checksum \
             FROM zdd.applied_deployments ORDER BY applied_at ASC",
            &[],
        )?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get(0);
            let id = DeploymentId::parse(&id)
                .ok_or_else(|| ZddError::MalformedLedgerId { id: id.clone() })?;
            records.push(AppliedDeployment {
                id,
                name: row.get(1),
                applied_at: row.get::<_, DateTime<Utc>>(2),
                checksum: row.get(3),
            });
        }
        Ok(records)
    }

    fn execute_sql_in_transaction(&mut self, sql: &str) -> ZddResult<()> {
        let mut tx = self.client.transaction()?;
        tx.batch_execute(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn record_deployment(&mut self, deployment: &Deployment, checksum: &str) -> ZddResult<()> {
        self.client.execute(
            "INSERT INTO zdd.applied_deployments (id, name, applied_at, checksum) \
             VALUES ($1, $2, now(), $3)",
            &[&deployment.id.as_str(), &deployment.name, &checksum],
        )?;
        Ok(())
    }

    fn dump_schema(&mut self) -> ZddResult<String> {
        let rows = self.client.query(DUMP_SCHEMA_SQL, &[])?;

        let mut dump = String::from("-- Schema dump generated by zdd\n\n");
        for row in rows {
            let schema: String = row.get(0);
            let table: String = row.get(1);
            let table_def: String = row.get(2);
            dump.push_str(&format!("-- Table: {schema}.{table}\n{table_def}\n\n"));
        }
        Ok(dump)
    }

    fn connection_url(&self) -> &str {
        &self.url
    }
}
