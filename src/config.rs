//! Startup configuration.
//!
//! Nothing here is read from the command line or the environment; the
//! defaults are the bootstrap's fixed settings and the `with_*` methods exist
//! for embedders and tests.

use std::path::PathBuf;

use crate::types::Color;

/// Background color the frame is cleared to.
pub const DEFAULT_CLEAR_COLOR: Color = [0.2, 0.3, 0.3, 1.0];

/// When to read the GL error flag.
///
/// The same policy applies at every check point: after the vertex buffer
/// upload, after each viewport update, and after each frame's draw.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorChecks {
    /// Check at every check point.
    #[default]
    Always,
    /// Check only when built with debug assertions.
    DebugOnly,
    /// Never read the error flag.
    Never,
}

impl ErrorChecks {
    /// Whether checks run in this build.
    #[must_use]
    pub const fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::DebugOnly => cfg!(debug_assertions),
            Self::Never => false,
        }
    }
}

/// Window and GL context settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
    /// Initial inner size in physical pixels.
    pub size: [u32; 2],
    /// Depth buffer precision.
    pub depth_bits: u8,
    /// Requested MSAA sample count. `0` disables multisampling.
    pub msaa_samples: u8,
    /// Requested GL version, `(major, minor)`, core profile.
    pub gl_version: (u8, u8),
    /// Wait for vertical sync when presenting.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Voxel Engine".to_owned(),
            size: [1280, 720],
            depth_bits: 24,
            msaa_samples: 4,
            gl_version: (3, 3),
            vsync: true,
        }
    }
}

/// Log sink settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory the per-run log file is written into. Created on demand.
    pub dir: PathBuf,
    /// File name prefix; the start timestamp and `.log` are appended.
    pub file_stem: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("temp"),
            file_stem: "main".to_owned(),
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Window and context settings.
    pub window: WindowConfig,
    /// Log sink settings.
    pub log: LogConfig,
    /// Per-frame background color.
    pub clear_color: Color,
    /// GL error flag policy.
    pub error_checks: ErrorChecks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            log: LogConfig::default(),
            clear_color: DEFAULT_CLEAR_COLOR,
            error_checks: ErrorChecks::default(),
        }
    }
}

impl Config {
    /// Replace the window settings.
    #[must_use]
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Replace the log settings.
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Replace the background color.
    #[must_use]
    pub fn with_clear_color(mut self, clear_color: Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// Replace the GL error check policy.
    #[must_use]
    pub fn with_error_checks(mut self, error_checks: ErrorChecks) -> Self {
        self.error_checks = error_checks;
        self
    }
}
