//! Plan execution
//!
//! Runs a plan's tasks strictly in list order against the database and
//! process-execution collaborators. Fail-fast: the first task error aborts
//! the remaining plan. Each deployment is recorded in the ledger immediately
//! after its last task succeeds, so a later deployment's failure never
//! un-records an earlier success within the same run.

use std::fs;
use std::path::PathBuf;

use crate::db::DatabaseProvider;
use crate::error::{ZddError, ZddResult};
use crate::models::{Deployment, Phase};
use crate::parser::load_deployments;
use crate::plan::{build_plan, Plan, Task, TaskKind};
use crate::script::CommandExecutor;

/// Executes deployment plans against injected collaborators.
///
/// Single-threaded and strictly sequential: one task at a time, one
/// deployment at a time, deployments in ascending ID order.
pub struct Deployer<'a> {
    db: &'a mut dyn DatabaseProvider,
    executor: &'a dyn CommandExecutor,
    deployments_path: PathBuf,
    verbose: bool,
}

impl<'a> Deployer<'a> {
    pub fn new(
        db: &'a mut dyn DatabaseProvider,
        executor: &'a dyn CommandExecutor,
        deployments_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            executor,
            deployments_path: deployments_path.into(),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Load local deployments, fetch the ledger, and build the plan.
    pub fn build_plan(&mut self) -> ZddResult<Plan> {
        let local = load_deployments(&self.deployments_path)?;
        let ledger = self.db.applied_deployments()?;
        Ok(build_plan(local, &ledger))
    }

    /// Execute all tasks in order.
    ///
    /// The head deployment (owner of the last task) runs with
    /// `ZDD_IS_HEAD=true`; everything before it is catch-up replay with
    /// `ZDD_IS_HEAD=false`. That flag is the only cooperative idempotence
    /// mechanism: the executor itself skips nothing beyond already-recorded
    /// deployments, which never enter the plan.
    pub fn execute(&mut self, plan: &Plan) -> ZddResult<()> {
        if plan.is_empty() {
            println!("No pending deployments to apply");
            return Ok(());
        }

        let head = plan.head();
        let mut current: Option<usize> = None;

        for (position, task) in plan.tasks.iter().enumerate() {
            let deployment = plan.deployment(task);

            if current != Some(task.deployment) {
                println!("Applying deployment {}: {}", deployment.id, deployment.name);
                current = Some(task.deployment);
            }

            let is_head = head == Some(task.deployment);
            self.run_task(task, deployment, is_head)?;

            let last_of_deployment = plan
                .tasks
                .get(position + 1)
                .map(|next| next.deployment != task.deployment)
                .unwrap_or(true);
            if last_of_deployment {
                self.record(deployment)?;
            }
        }

        println!("All deployments applied successfully!");
        Ok(())
    }

    fn run_task(&mut self, task: &Task, deployment: &Deployment, is_head: bool) -> ZddResult<()> {
        match task.kind {
            TaskKind::Script => {
                println!("  Executing {} script: {}", task.phase, task.path.display());
                let env = self.script_env(deployment, task.phase, is_head);
                if self.verbose {
                    for (key, value) in &env {
                        println!("    {key}={value}");
                    }
                }

                let output = self
                    .executor
                    .run_script(&task.path, &deployment.directory, &env)
                    .map_err(|source| ZddError::PhaseFailed {
                        phase: task.phase,
                        id: deployment.id.to_string(),
                        source: Box::new(source),
                    })?;
                if self.verbose && !output.is_empty() {
                    print!("{output}");
                }
            }
            TaskKind::Sql => {
                println!("  Executing {} SQL file: {}", task.phase, task.path.display());
                let content =
                    fs::read_to_string(&task.path).map_err(|source| ZddError::PhaseFailed {
                        phase: task.phase,
                        id: deployment.id.to_string(),
                        source: Box::new(ZddError::Io(source)),
                    })?;

                self.db
                    .execute_sql_in_transaction(&content)
                    .map_err(|source| ZddError::PhaseFailed {
                        phase: task.phase,
                        id: deployment.id.to_string(),
                        source: Box::new(source),
                    })?;
            }
        }
        Ok(())
    }

    fn record(&mut self, deployment: &Deployment) -> ZddResult<()> {
        let checksum = deployment.checksum();
        self.db
            .record_deployment(deployment, &checksum)
            .map_err(|source| ZddError::RecordFailed {
                id: deployment.id.to_string(),
                source: Box::new(source),
            })?;
        println!("Deployment {} applied successfully", deployment.id);
        Ok(())
    }

    fn script_env(
        &self,
        deployment: &Deployment,
        phase: Phase,
        is_head: bool,
    ) -> Vec<(String, String)> {
        vec![
            (
                "ZDD_IS_HEAD".to_string(),
                if is_head { "true" } else { "false" }.to_string(),
            ),
            ("ZDD_DEPLOYMENT_ID".to_string(), deployment.id.to_string()),
            ("ZDD_DEPLOYMENT_NAME".to_string(), deployment.name.clone()),
            ("ZDD_PHASE".to_string(), phase.to_string()),
            (
                "ZDD_DEPLOYMENTS_PATH".to_string(),
                self.deployments_path.display().to_string(),
            ),
            (
                "ZDD_DATABASE_URL".to_string(),
                self.db.connection_url().to_string(),
            ),
        ]
    }
}
