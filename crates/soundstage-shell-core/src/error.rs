use thiserror::Error;

/// Core error types for shell operations
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Backend spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process management error: {0}")]
    Process(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ShellError {
    /// Whether the shell can keep running in a degraded state after this
    /// error; configuration errors are construction-time and fatal
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ShellError::SpawnFailed(_) | ShellError::Process(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ShellError::SpawnFailed("no such file".to_string());
        let display = format!("{error}");
        assert!(display.contains("Backend spawn failed"));

        let error = ShellError::Configuration("bad interval".to_string());
        let display = format!("{error}");
        assert!(display.contains("Configuration error"));
    }

    #[test]
    fn test_error_categorization() {
        assert!(ShellError::SpawnFailed("test".to_string()).is_recoverable());
        assert!(ShellError::Process("test".to_string()).is_recoverable());
        assert!(!ShellError::Configuration("test".to_string()).is_recoverable());
    }
}
