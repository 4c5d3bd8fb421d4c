//! Capabilities the control-surface host lends to the plugin.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Configuration;

/// Identifier of a repeating refresh owned by one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-button settings blob persisted by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSettings {
    #[serde(rename = "intervalId", skip_serializing_if = "Option::is_none")]
    pub interval_id: Option<TimerId>,
}

/// Read access to the plugin-wide settings.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn global_settings(&self) -> anyhow::Result<Configuration>;
}

/// One button instance as exposed by the host.
#[async_trait]
pub trait KeyAction: Send + Sync {
    /// Stable identifier of the button instance.
    fn id(&self) -> &str;

    async fn settings(&self) -> anyhow::Result<ActionSettings>;

    async fn set_settings(&self, settings: ActionSettings) -> anyhow::Result<()>;

    async fn set_image(&self, path: &str) -> anyhow::Result<()>;

    async fn set_title(&self, title: &str) -> anyhow::Result<()>;
}
