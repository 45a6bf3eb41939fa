//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 0             # 0 coalesces only same-turn notifications
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSectionConfig {
    pub debounce_ms: u64,
}

impl WatchSectionConfig {
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
