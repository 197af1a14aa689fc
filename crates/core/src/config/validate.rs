use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Duration and dimension limits form non-empty ranges
/// - Timeout clamp is ordered and the multiplier is positive
/// - Session sweep interval is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    let limits = &config.limits;
    if limits.min_duration_secs <= 0.0 || limits.min_duration_secs >= limits.max_duration_secs {
        return Err(invalid(
            "limits.min_duration_secs must be positive and below limits.max_duration_secs",
        ));
    }
    if limits.min_width == 0 || limits.min_height == 0 {
        return Err(invalid("limits.min_width and limits.min_height must be non-zero"));
    }
    if limits.min_width > limits.max_width || limits.min_height > limits.max_height {
        return Err(invalid("limits minimum resolution exceeds maximum resolution"));
    }
    if limits.min_file_size >= limits.max_file_size {
        return Err(invalid("limits.min_file_size must be below limits.max_file_size"));
    }

    let session = &config.session;
    if session.timeout_multiplier <= 0.0 {
        return Err(invalid("session.timeout_multiplier must be positive"));
    }
    if session.min_timeout_secs > session.max_timeout_secs {
        return Err(invalid(
            "session.min_timeout_secs cannot exceed session.max_timeout_secs",
        ));
    }

    if session.sweep_interval_secs == 0 {
        return Err(invalid("session.sweep_interval_secs cannot be 0"));
    }

    if config.transcoder.analysis_timeout_secs == 0 {
        return Err(invalid("transcoder.analysis_timeout_secs cannot be 0"));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_inverted_duration_range_fails() {
        let mut config = Config::default();
        config.limits.min_duration_secs = 400.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_sweep_interval_fails() {
        let mut config = Config::default();
        config.session.sweep_interval_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("sweep_interval_secs"));
    }

    #[test]
    fn test_validate_inverted_timeout_clamp_fails() {
        let mut config = Config::default();
        config.session.min_timeout_secs = 1000;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("min_timeout_secs"));
    }

    #[test]
    fn test_validate_zero_multiplier_fails() {
        let mut config = Config::default();
        config.session.timeout_multiplier = 0.0;
        assert!(validate_config(&config).is_err());
    }
}
