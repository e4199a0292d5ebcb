//! Platform directory resolution.
//!
//! The [`BaseDirs`] trait lets settings discovery be exercised in tests
//! without touching the real user configuration directory.

use directories_next::ProjectDirs;
use std::path::PathBuf;

/// Application name used for platform directory lookup.
const APPLICATION: &str = "model-airlock";

/// Source of platform-specific directories.
pub trait BaseDirs {
    /// Directory holding the airlock's user configuration, if known.
    fn config_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by the operating system's conventions.
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    project: ProjectDirs,
}

impl SystemBaseDirs {
    /// Resolve the platform directories.
    ///
    /// Returns `None` when no home directory can be determined.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use model_airlock::dirs::{BaseDirs, SystemBaseDirs};
    ///
    /// let dirs = SystemBaseDirs::new().expect("home directory");
    /// println!("{:?}", dirs.config_dir());
    /// ```
    #[must_use]
    pub fn new() -> Option<Self> {
        ProjectDirs::from("", "", APPLICATION).map(|project| Self { project })
    }
}

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        Some(self.project.config_dir().to_path_buf())
    }
}

/// [`BaseDirs`] that knows no directories.
///
/// Used when the platform lookup fails so that settings fall back to
/// defaults rather than erroring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBaseDirs;

impl BaseDirs for NoBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        None
    }
}
