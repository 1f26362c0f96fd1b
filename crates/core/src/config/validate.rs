use super::{types::Config, ConfigError, Strategy};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - cache-only strategy requires the cache to be enabled
/// - Ingestion max_pages, when set, is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Strategy validation
    if config.data_source.strategy == Strategy::CacheOnly && !config.data_source.cache_enabled {
        return Err(ConfigError::ValidationError(
            "data_source.strategy = \"cache-only\" requires data_source.cache_enabled = true"
                .to_string(),
        ));
    }

    // Ingestion validation
    if config.ingestion.max_pages == Some(0) {
        return Err(ConfigError::ValidationError(
            "ingestion.max_pages cannot be 0".to_string(),
        ));
    }

    Ok(())
}
