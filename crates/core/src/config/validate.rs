use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Shop credentials and base URL are non-empty
/// - Retry bounds are at least 1
/// - Label font size is positive
/// - Staging and hotfolder directories differ
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.shop.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "shop.base_url cannot be empty".to_string(),
        ));
    }
    if !config.shop.base_url.starts_with("http") {
        return Err(ConfigError::ValidationError(
            "shop.base_url must be an http(s) URL".to_string(),
        ));
    }
    if config.shop.consumer_key.is_empty() || config.shop.consumer_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "shop consumer_key/consumer_secret cannot be empty".to_string(),
        ));
    }

    if config.orchestrator.order_retry_limit == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.order_retry_limit must be at least 1".to_string(),
        ));
    }
    if config.orchestrator.api_retry_limit == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.api_retry_limit must be at least 1".to_string(),
        ));
    }
    if config.acquirer.attempts == 0 {
        return Err(ConfigError::ValidationError(
            "acquirer.attempts must be at least 1".to_string(),
        ));
    }

    if config.label.font_size <= 0.0 {
        return Err(ConfigError::ValidationError(
            "label.font_size must be positive".to_string(),
        ));
    }

    if config.staging.path == config.hotfolder.path {
        return Err(ConfigError::ValidationError(
            "staging.path and hotfolder.path must differ".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[shop]
base_url = "https://shop.example.com/wp-json/wc/v3"
consumer_key = "ck_test"
consumer_secret = "cs_test"

[hotfolder]
path = "/print/hotfolder"

[label]
sender_name = "Acme Prints"
sender_street = "Main Street 1"
sender_postalcode = "12345"
sender_city = "Springfield"
sender_country = "Germany"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_credentials_fails() {
        let mut config = valid_config();
        config.shop.consumer_secret = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_non_http_base_url_fails() {
        let mut config = valid_config();
        config.shop.base_url = "ftp://shop.example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_retry_limit_fails() {
        let mut config = valid_config();
        config.orchestrator.order_retry_limit = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_staging_equals_hotfolder_fails() {
        let mut config = valid_config();
        config.staging.path = config.hotfolder.path.clone();
        assert!(validate_config(&config).is_err());
    }
}
