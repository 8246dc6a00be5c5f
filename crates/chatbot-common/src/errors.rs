use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("ai error: {0}")]
    Ai(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("api.base_url must not be empty".into());
        assert_eq!(
            err.to_string(),
            "config validation error: api.base_url must not be empty"
        );
    }

    #[test]
    fn chatbot_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: ChatbotError = config_err.into();
        assert!(matches!(err, ChatbotError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn chatbot_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: ChatbotError = io_err.into();
        assert!(matches!(err, ChatbotError::Io(_)));
        assert!(err.to_string().contains("stdout closed"));
    }

    #[test]
    fn chatbot_error_string_variants() {
        let err = ChatbotError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");

        let err = ChatbotError::Ai("backend unhealthy".into());
        assert_eq!(err.to_string(), "ai error: backend unhealthy");
    }
}
