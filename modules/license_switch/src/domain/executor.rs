use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{SwitchFailure, UserRecord};
use crate::domain::ports::DirectoryPort;
use crate::domain::validator::ResolvedSwitch;

/// Per-user tallies of one switching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub processed: usize,
    pub succeeded: usize,
    pub failures: Vec<SwitchFailure>,
}

impl SwitchOutcome {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Applies the switch to each user in order, one call per user.
pub struct SwitchExecutor {
    directory: Arc<dyn DirectoryPort>,
    delay: Duration,
    preview: bool,
}

impl SwitchExecutor {
    pub fn new(directory: Arc<dyn DirectoryPort>, delay: Duration, preview: bool) -> Self {
        Self {
            directory,
            delay,
            preview,
        }
    }

    /// Never fails as a whole: a rejected user is recorded and the loop moves on.
    /// Already switched users are not rolled back.
    #[instrument(
        name = "license_switch.execute",
        skip(self, users, switch),
        fields(users = users.len(), preview = self.preview)
    )]
    pub async fn execute(&self, users: &[UserRecord], switch: &ResolvedSwitch) -> SwitchOutcome {
        let mut outcome = SwitchOutcome::default();
        let total = users.len();

        for (idx, user) in users.iter().enumerate() {
            outcome.processed += 1;

            if self.preview {
                debug!(
                    user_id = %user.id,
                    upn = %user.principal_name,
                    "[{}/{}] preview: would switch {} -> {}",
                    idx + 1,
                    total,
                    switch.source.sku_name,
                    switch.destination.sku_name
                );
                outcome.succeeded += 1;
            } else {
                match self
                    .directory
                    .switch_license(&user.id, &switch.source.sku_id, &switch.destination.sku_id)
                    .await
                {
                    Ok(()) => {
                        debug!(
                            user_id = %user.id,
                            upn = %user.principal_name,
                            "[{}/{}] switched",
                            idx + 1,
                            total
                        );
                        outcome.succeeded += 1;
                    }
                    Err(e) => {
                        let reason = format!("{e:#}");
                        warn!(
                            user_id = %user.id,
                            upn = %user.principal_name,
                            error = %reason,
                            "[{}/{}] switch failed",
                            idx + 1,
                            total
                        );
                        outcome.failures.push(SwitchFailure {
                            user_id: user.id.clone(),
                            principal_name: user.principal_name.clone(),
                            reason,
                        });
                    }
                }
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            processed = outcome.processed,
            succeeded = outcome.succeeded,
            failed = outcome.failed(),
            "switching finished"
        );
        outcome
    }
}
