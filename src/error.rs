//! Error types for fetching, templating, rendering and bootstrap.

use crate::target::DataKind;
use thiserror::Error;

/// Outcome of a failed request to the tooltip service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network failure, non-2xx status or an unparsable body.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Well-formed response carrying an `err` field.
    #[error("{0}")]
    Semantic(String),
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport(message.into())
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, FetchError::Semantic(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unterminated tag starting at byte {0}")]
    Unterminated(usize),

    #[error("unsupported template block `{0}`")]
    UnsupportedBlock(String),

    #[error("invalid expression `{0}`")]
    InvalidExpression(String),

    #[error("{0} is not defined")]
    MissingField(String),
}

/// Why a render attempt ended on the error fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no patch version available")]
    NoPatch,

    #[error("patch version errored: {0}")]
    Patch(String),

    #[error("cannot request {kind} template: {source}")]
    Template { kind: DataKind, source: FetchError },

    #[error("cannot request {kind}/{id}: {source}")]
    Data {
        kind: DataKind,
        id: String,
        source: FetchError,
    },

    #[error("display error: {0}")]
    Display(#[from] TemplateError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("bootstrap is already running")]
    InProgress,

    #[error("tooltips are already initialized")]
    AlreadyReady,

    #[error("host document error: {0}")]
    Host(String),
}
