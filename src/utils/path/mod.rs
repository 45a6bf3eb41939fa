//! Path utilities.
//!
//! Pure functions for path manipulation.
//!
//! - [`fs`]: Filesystem path normalization and editor-artifact detection

pub mod fs;

pub use fs::{is_temp_file, normalize_path, resolve_path};
