use miette::Diagnostic;
use thiserror::Error;

/// Result type for compiler operations.
pub type Result<T, E = CompileError> = std::result::Result<T, E>;

/// Errors raised while resolving or compiling an app graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CompileError {
    /// The app graph is misconfigured, e.g. a component no module declares.
    #[error("{message}")]
    #[diagnostic(code(trellis::compile::configuration))]
    Configuration { message: String },

    /// An internal invariant of the compiler did not hold.
    #[error("Illegal state: {message}")]
    #[diagnostic(
        code(trellis::compile::illegal_state),
        help("this indicates a bug in the compiler, please report it")
    )]
    IllegalState { message: String },

    #[error("Template parse errors in {component}: {message}")]
    #[diagnostic(code(trellis::compile::template_parse))]
    TemplateParse { component: String, message: String },

    #[error("Failed to load {url}: {message}")]
    #[diagnostic(
        code(trellis::compile::loading),
        help("check that the file exists relative to trellis.toml")
    )]
    Loading { url: String, message: String },
}

impl CompileError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    pub fn template_parse(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateParse {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn loading(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Loading {
            url: url.into(),
            message: message.into(),
        }
    }
}
