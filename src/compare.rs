//! Comparison of local deployments against the applied ledger.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::models::{AppliedDeployment, Deployment};

/// Partition of local deployments against the ledger.
#[derive(Debug, Default)]
pub struct DeploymentStatus {
    /// Local deployments with a ledger record; `applied_at` is populated.
    pub applied: Vec<Deployment>,
    /// Local deployments with no ledger record.
    pub pending: Vec<Deployment>,
    /// Ledger records with no local directory: history diverges from the
    /// working tree (deleted or unshared deployment directories).
    pub missing: Vec<Deployment>,
}

/// Classify `local` deployments against `ledger` records.
///
/// Input ordering is preserved; `load_deployments` already sorts by ID.
pub fn compare_deployments(
    local: Vec<Deployment>,
    ledger: &[AppliedDeployment],
) -> DeploymentStatus {
    let ledger_by_id: BTreeMap<&str, &AppliedDeployment> =
        ledger.iter().map(|r| (r.id.as_str(), r)).collect();
    let local_ids: BTreeSet<String> = local.iter().map(|d| d.id.to_string()).collect();

    let mut status = DeploymentStatus::default();

    for mut deployment in local {
        if let Some(record) = ledger_by_id.get(deployment.id.as_str()) {
            deployment.applied_at = Some(record.applied_at);
            status.applied.push(deployment);
        } else {
            status.pending.push(deployment);
        }
    }

    for record in ledger {
        if !local_ids.contains(record.id.as_str()) {
            let mut missing =
                Deployment::new(record.id.clone(), record.name.clone(), PathBuf::new());
            missing.applied_at = Some(record.applied_at);
            status.missing.push(missing);
        }
    }

    status
}
