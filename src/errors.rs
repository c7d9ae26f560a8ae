use thiserror::Error;

/// Errors raised while loading data or wiring up the command engine.
///
/// Gameplay failures never surface here; those travel through the command
/// result protocol (see [`crate::engine::CommandError`]).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Wrapper around IO errors (reading seed files).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON parse errors in seed data.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A command declared a pattern that does not compile.
    #[error("invalid pattern for command {command}: {source}")]
    Pattern {
        command: String,
        #[source]
        source: regex::Error,
    },

    /// A catch-all pattern was declared before other patterns.
    #[error("catch-all pattern must be last for command {0}")]
    CatchAllNotLast(String),

    /// An alias points at a command that was never registered.
    #[error("cannot alias {alias}: unknown command {command}")]
    UnknownAliasTarget { alias: String, command: String },

    /// Seed data references something that does not exist or is malformed.
    #[error("invalid seed data: {0}")]
    InvalidData(String),
}
