//! Error types for GPU setup, the frame loop, and teardown.

use thiserror::Error;

use crate::types::ShaderStage;

/// Everything that can go wrong between context activation and teardown.
///
/// None of these are retried. The driver's diagnostic text (if any) is
/// logged at the point of detection, so by the time one of these reaches
/// the entry point the log already holds the details.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The driver rejected a shader's source.
    #[error("{stage} shader compile error: {log}")]
    Compile {
        /// Which stage failed.
        stage: ShaderStage,
        /// The driver's info log.
        log: String,
    },

    /// The driver refused to link the program.
    #[error("program link error: {log}")]
    Link {
        /// The driver's info log.
        log: String,
    },

    /// The GL error flag was set after an operation expected to be
    /// error-free.
    #[error("GL error 0x{code:04X} after {operation}")]
    Driver {
        /// The operation that was just issued.
        operation: &'static str,
        /// Raw value returned by `glGetError`.
        code: u32,
    },

    /// A required setup step reported failure.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The driver could not hand out a new object name.
    #[error("failed to create {object}: {reason}")]
    Allocation {
        /// Kind of object, e.g. `"vertex array"`.
        object: &'static str,
        /// Message from the GL binding.
        reason: String,
    },

    /// The window, context, or surface could not be created or presented.
    #[error("window error: {0}")]
    Window(String),
}

impl RenderError {
    pub(crate) fn allocation(object: &'static str) -> impl FnOnce(String) -> Self {
        move |reason| Self::Allocation { object, reason }
    }
}
