/// Configuration problems. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("auth.username must not be empty")]
    EmptyUsername,
    #[error("auth.password must not be empty")]
    EmptyPassword,
    #[error("auth.username must not contain ':'")]
    ColonInUsername,
    #[error("auth.realm must be non-empty and free of control characters")]
    InvalidRealm,
    #[error("auth.nonce_store.capacity must be greater than zero")]
    ZeroNonceCapacity,
    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("failed to install log subscriber: {0}")]
    Logging(String),
    #[error("failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}
