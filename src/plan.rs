//! Deployment plan: the ordered task list for one execution run.
//!
//! Tasks and plans are value objects generated fresh per planning run and
//! never persisted; the ledger is the only durable state.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::models::{AppliedDeployment, Deployment, Phase};

/// What a task executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Script,
    Sql,
}

/// An atomic, schedulable unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub kind: TaskKind,
    pub path: PathBuf,
    pub phase: Phase,
    /// Index of the owning deployment in `Plan::deployments`.
    pub deployment: usize,
}

/// The ordered task list for one run, plus the IDs that were already
/// recorded as applied at planning time.
#[derive(Debug, Default)]
pub struct Plan {
    /// Pending deployments, ascending by ID. Task order follows this list
    /// with no interleaving: deployment N's tasks fully precede N+1's.
    pub deployments: Vec<Deployment>,
    pub tasks: Vec<Task>,
    /// Deployment IDs recorded as applied when the plan was built.
    pub applied: BTreeSet<String>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The deployment owning a task.
    pub fn deployment(&self, task: &Task) -> &Deployment {
        &self.deployments[task.deployment]
    }

    /// Index of the head deployment: the owner of the last task, i.e. the
    /// most recently pending unit. Only its tasks run with `ZDD_IS_HEAD=true`.
    pub fn head(&self) -> Option<usize> {
        self.tasks.last().map(|t| t.deployment)
    }
}

/// Tasks contributed by one deployment, in fixed phase order
/// expand → migrate → contract → post. Within a phase the script precedes
/// the SQL batches; comment-only SQL contributes nothing; post is
/// script-only.
pub fn deployment_tasks(deployment: &Deployment, index: usize) -> Vec<Task> {
    let mut tasks = Vec::new();
    for phase in Phase::ALL {
        let files = deployment.phase(phase);
        if let Some(script) = &files.script {
            tasks.push(Task {
                kind: TaskKind::Script,
                path: script.path.clone(),
                phase,
                deployment: index,
            });
        }
        if phase != Phase::Post {
            for sql in &files.sql {
                if sql.has_statements() {
                    tasks.push(Task {
                        kind: TaskKind::Sql,
                        path: sql.path.clone(),
                        phase,
                        deployment: index,
                    });
                }
            }
        }
    }
    tasks
}

/// Build the plan: every local deployment not recorded in the ledger
/// contributes its tasks, ascending by ID, into one flat list.
pub fn build_plan(local: Vec<Deployment>, ledger: &[AppliedDeployment]) -> Plan {
    let applied: BTreeSet<String> = ledger.iter().map(|r| r.id.to_string()).collect();

    let pending: Vec<Deployment> = local
        .into_iter()
        .filter(|d| !applied.contains(d.id.as_str()))
        .collect();

    let mut tasks = Vec::new();
    for (index, deployment) in pending.iter().enumerate() {
        tasks.extend(deployment_tasks(deployment, index));
    }

    Plan {
        deployments: pending,
        tasks,
        applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeploymentId, ScriptFile, SqlFile};
    use chrono::Utc;

    fn deployment(n: u64) -> Deployment {
        Deployment::new(DeploymentId::from_number(n), format!("d{n}"), "/tmp/x")
    }

    fn script(name: &str) -> ScriptFile {
        ScriptFile {
            path: PathBuf::from(name),
        }
    }

    fn sql(name: &str, sequence: u32, content: &str) -> SqlFile {
        SqlFile {
            path: PathBuf::from(name),
            sequence,
            content: content.to_string(),
        }
    }

    fn record(n: u64) -> AppliedDeployment {
        AppliedDeployment {
            id: DeploymentId::from_number(n),
            name: format!("d{n}"),
            applied_at: Utc::now(),
            checksum: String::new(),
        }
    }

    #[test]
    fn test_tasks_follow_fixed_phase_order() {
        let mut d = deployment(1);
        d.post.script = Some(script("post.sh"));
        d.contract.sql.push(sql("contract.sql", 0, "DROP TABLE old;"));
        d.expand.script = Some(script("expand.sh"));
        d.expand.sql.push(sql("expand.sql", 0, "SELECT 1;"));
        d.migrate.sql.push(sql("migrate.sql", 0, "SELECT 2;"));

        let tasks = deployment_tasks(&d, 0);
        let shape: Vec<(Phase, TaskKind)> = tasks.iter().map(|t| (t.phase, t.kind)).collect();
        assert_eq!(
            shape,
            vec![
                (Phase::Expand, TaskKind::Script),
                (Phase::Expand, TaskKind::Sql),
                (Phase::Migrate, TaskKind::Sql),
                (Phase::Contract, TaskKind::Sql),
                (Phase::Post, TaskKind::Script),
            ]
        );
    }

    #[test]
    fn test_script_precedes_sql_within_phase() {
        let mut d = deployment(1);
        d.migrate.sql.push(sql("migrate.sql", 0, "SELECT 1;"));
        d.migrate.script = Some(script("migrate.sh"));

        let tasks = deployment_tasks(&d, 0);
        assert_eq!(tasks[0].kind, TaskKind::Script);
        assert_eq!(tasks[1].kind, TaskKind::Sql);
    }

    #[test]
    fn test_comment_only_sql_contributes_no_task() {
        let mut d = deployment(1);
        d.expand
            .sql
            .push(sql("expand.sql", 0, "-- nothing here\n\n"));
        d.migrate.sql.push(sql("migrate.sql", 0, "SELECT 1;"));

        let tasks = deployment_tasks(&d, 0);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].phase, Phase::Migrate);
    }

    #[test]
    fn test_numbered_batches_stay_in_sequence_order() {
        let mut d = deployment(1);
        // Loader sorts by sequence before planning; mirror that here.
        d.expand.sql.push(sql("expand.sql", 0, "SELECT 0;"));
        d.expand.sql.push(sql("expand.1.sql", 1, "SELECT 1;"));
        d.expand.sql.push(sql("expand.2.sql", 2, "SELECT 2;"));

        let tasks = deployment_tasks(&d, 0);
        let paths: Vec<&str> = tasks.iter().map(|t| t.path.to_str().unwrap()).collect();
        assert_eq!(paths, vec!["expand.sql", "expand.1.sql", "expand.2.sql"]);
    }

    #[test]
    fn test_build_plan_skips_applied_deployments() {
        let mut d1 = deployment(1);
        d1.migrate.sql.push(sql("m1.sql", 0, "SELECT 1;"));
        let mut d2 = deployment(2);
        d2.migrate.sql.push(sql("m2.sql", 0, "SELECT 2;"));

        let plan = build_plan(vec![d1, d2], &[record(1)]);

        assert_eq!(plan.deployments.len(), 1);
        assert_eq!(plan.deployments[0].id.as_str(), "000002");
        assert_eq!(plan.tasks.len(), 1);
        assert!(plan.applied.contains("000001"));
    }

    #[test]
    fn test_tasks_do_not_interleave_across_deployments() {
        let mut d1 = deployment(1);
        d1.expand.sql.push(sql("a.sql", 0, "SELECT 1;"));
        d1.post.script = Some(script("a_post.sh"));
        let mut d2 = deployment(2);
        d2.expand.sql.push(sql("b.sql", 0, "SELECT 2;"));

        let plan = build_plan(vec![d1, d2], &[]);
        let owners: Vec<usize> = plan.tasks.iter().map(|t| t.deployment).collect();
        assert_eq!(owners, vec![0, 0, 1]);
    }

    #[test]
    fn test_head_is_last_pending_deployment() {
        let mut d1 = deployment(1);
        d1.expand.sql.push(sql("a.sql", 0, "SELECT 1;"));
        let mut d2 = deployment(2);
        d2.expand.sql.push(sql("b.sql", 0, "SELECT 2;"));

        let plan = build_plan(vec![d1, d2], &[]);
        assert_eq!(plan.head(), Some(1));

        let empty = build_plan(Vec::new(), &[]);
        assert_eq!(empty.head(), None);
    }
}
