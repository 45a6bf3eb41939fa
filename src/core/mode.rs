//! Run mode: continuous development loop or a single production build.

use serde::{Deserialize, Serialize};

/// Run mode, selected once at startup and never changed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Watch the source tree and rebuild on every change.
    #[value(alias = "dev")]
    Development,
    /// Build exactly once and terminate.
    #[default]
    #[value(alias = "prod")]
    Production,
}

impl RunMode {
    /// Check if this mode keeps running after the first build.
    #[inline]
    pub const fn is_continuous(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is development mode.
    #[inline]
    pub const fn is_dev(self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}
