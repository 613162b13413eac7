//! Runtime configuration for the clipboard image hook.
//!
//! ## Environment Variables
//!
//! - `TMPDIR`: root directory for pasted images (default `/tmp`)
//! - `OPENCODE_GLM_CLIPBOARD_MAX_AGE_HOURS`: age after which pasted images are
//!   swept, in (possibly fractional) hours (default `24`)

use std::path::PathBuf;
use std::time::Duration;

pub const TMPDIR_ENV: &str = "TMPDIR";
pub const MAX_AGE_ENV: &str = "OPENCODE_GLM_CLIPBOARD_MAX_AGE_HOURS";

pub const DEFAULT_TEMP_ROOT: &str = "/tmp";
pub const DEFAULT_MAX_AGE_HOURS: f64 = 24.0;

/// Directory created under the temp root to hold pasted images.
pub const SAVE_DIR_NAME: &str = "opencode-pasted-images";

#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardConfig {
    /// Root under which the save directory lives
    pub temp_root: PathBuf,
    /// Pasted images older than this are removed by the sweep
    pub max_age: Duration,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            temp_root: PathBuf::from(DEFAULT_TEMP_ROOT),
            max_age: default_max_age(),
        }
    }
}

impl ClipboardConfig {
    /// Create config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let temp_root = lookup(TMPDIR_ENV)
            .filter(|root| !root.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_ROOT));

        Self {
            temp_root,
            max_age: parse_max_age_hours(lookup(MAX_AGE_ENV).as_deref()),
        }
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// `<temp_root>/opencode-pasted-images`
    pub fn save_dir(&self) -> PathBuf {
        self.temp_root.join(SAVE_DIR_NAME)
    }
}

fn default_max_age() -> Duration {
    Duration::from_secs_f64(DEFAULT_MAX_AGE_HOURS * 3600.0)
}

/// Parse the max-age setting. Anything absent, unparseable or non-positive
/// falls back to the 24 hour default; values too large for a `Duration`
/// saturate, so nothing is ever old enough to sweep.
pub fn parse_max_age_hours(raw: Option<&str>) -> Duration {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default_max_age();
    };

    match raw.parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours > 0.0 => {
            Duration::try_from_secs_f64(hours * 3600.0).unwrap_or(Duration::MAX)
        }
        _ => default_max_age(),
    }
}
