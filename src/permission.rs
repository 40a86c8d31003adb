use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Microphone permission source
#[async_trait::async_trait]
pub trait PermissionGate: Send + Sync {
    /// Whether permission is already granted
    async fn check_microphone_permission(&self) -> Result<bool>;

    /// Ask for permission; `false` means the user declined
    async fn request_microphone_permission(&self) -> Result<bool>;
}

/// How microphone permission requests are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    /// Granted from the start
    Granted,
    /// Not granted until requested, then granted
    #[default]
    Prompt,
    /// Never granted
    Denied,
}

/// Permission gate answering from configuration
pub struct ConfiguredPermissionGate {
    policy: PermissionPolicy,
    granted: AtomicBool,
}

impl ConfiguredPermissionGate {
    pub fn new(policy: PermissionPolicy) -> Self {
        Self {
            policy,
            granted: AtomicBool::new(policy == PermissionPolicy::Granted),
        }
    }
}

#[async_trait::async_trait]
impl PermissionGate for ConfiguredPermissionGate {
    async fn check_microphone_permission(&self) -> Result<bool> {
        Ok(self.granted.load(Ordering::SeqCst))
    }

    async fn request_microphone_permission(&self) -> Result<bool> {
        let granted = self.policy != PermissionPolicy::Denied;
        info!("Microphone permission requested: {}", if granted { "granted" } else { "denied" });
        self.granted.store(granted, Ordering::SeqCst);
        Ok(granted)
    }
}
