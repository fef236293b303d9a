use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArbiterError {
    #[error("Behavior manager already initialized")]
    AlreadyInitialized,

    #[error("Behavior manager used before initialization")]
    NotInitialized,

    #[error("Behavior '{behavior}' returned unrecognized status '{status}'")]
    UnrecognizedStatus { behavior: String, status: String },

    #[error("Behavior '{behavior}' failed to initialize: {reason}")]
    BehaviorInitFailed { behavior: String, reason: String },

    #[error("Behavior '{behavior}' failed to resume: {reason}")]
    ResumeFailed { behavior: String, reason: String },

    #[error("Behavior not found: {0}")]
    UnknownBehavior(String),

    #[error("Behavior already registered: {0}")]
    DuplicateBehavior(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArbiterError {
    /// Programmer errors are contract violations, not runtime conditions
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            ArbiterError::AlreadyInitialized
                | ArbiterError::NotInitialized
                | ArbiterError::UnrecognizedStatus { .. }
        )
    }

    /// Configuration gaps are fatal at construction time
    pub fn is_configuration_gap(&self) -> bool {
        matches!(
            self,
            ArbiterError::UnknownBehavior(_)
                | ArbiterError::DuplicateBehavior(_)
                | ArbiterError::InvalidConfig(_)
                | ArbiterError::Toml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ArbiterError>;
