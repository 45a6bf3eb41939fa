//! Configuration section definitions.

mod build;
mod script;
mod style;
mod watch;

pub use build::BuildSectionConfig;
pub use script::ScriptSectionConfig;
pub use style::StyleSectionConfig;
pub use watch::WatchSectionConfig;
