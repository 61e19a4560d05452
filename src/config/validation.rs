use crate::config::types::{Config, CrawlerConfig, Credentials, RepoSource, UserAgentConfig};
use crate::ConfigError;
use std::collections::BTreeMap;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_credentials(&config.credentials)?;
    for (product, repositories) in &config.products {
        for (kind, source) in repositories {
            validate_repo_source(product, kind, source, &config.credentials)?;
        }
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.worker_pool_size < 1 || config.worker_pool_size > 100 {
        return Err(ConfigError::Validation(format!(
            "worker_pool_size must be between 1 and 100, got {}",
            config.worker_pool_size
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "attempts must be >= 1, got {}",
            config.attempts
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

fn validate_credentials(credentials: &BTreeMap<String, Credentials>) -> Result<(), ConfigError> {
    for (name, entry) in credentials {
        if entry.username.is_empty() {
            return Err(ConfigError::Validation(format!(
                "credentials '{}' must have a username",
                name
            )));
        }
        // Embedded into URLs as user:pass@host, so the separator characters are not allowed
        if entry.username.contains(':') || entry.username.contains('@') {
            return Err(ConfigError::Validation(format!(
                "username of credentials '{}' cannot contain ':' or '@'",
                name
            )));
        }
    }
    Ok(())
}

/// Validates one repository source of a product
fn validate_repo_source(
    product: &str,
    kind: &str,
    source: &RepoSource,
    credentials: &BTreeMap<String, Credentials>,
) -> Result<(), ConfigError> {
    let url = Url::parse(&source.path).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid path '{}' for {}.{}: {}",
            source.path, product, kind, e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Path '{}' for {}.{} must use http or https",
            source.path, product, kind
        )));
    }

    if let Some(name) = &source.credentials {
        if !credentials.contains_key(name) {
            return Err(ConfigError::UnknownCredentials {
                product: product.to_string(),
                name: name.clone(),
            });
        }
    }

    Ok(())
}
