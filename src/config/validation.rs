use crate::config::types::{
    Config, CrawlerConfig, PartitionEntry, RankConfig, ServerConfig, UserAgentConfig,
};
use crate::url::classify_partition;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_rank_config(&config.rank)?;
    validate_server_config(&config.server)?;
    validate_partitions(&config.partitions)?;
    validate_disallow(&config.disallow)?;

    if config.storage.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_connections < 1 || config.max_connections > 100 {
        return Err(ConfigError::Validation(format!(
            "max_connections must be between 1 and 100, got {}",
            config.max_connections
        )));
    }

    if config.max_pages_per_partition < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages_per_partition must be >= 1, got {}",
            config.max_pages_per_partition
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
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
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates rank engine parameters
fn validate_rank_config(config: &RankConfig) -> Result<(), ConfigError> {
    if !(config.damping > 0.0 && config.damping < 1.0) {
        return Err(ConfigError::Validation(format!(
            "damping must be strictly between 0 and 1, got {}",
            config.damping
        )));
    }

    if !(config.tolerance > 0.0) {
        return Err(ConfigError::Validation(format!(
            "tolerance must be > 0, got {}",
            config.tolerance
        )));
    }

    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(
            "max_iterations must be >= 1".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation("max_pages must be >= 1".to_string()));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.bind_address.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "bind_address must be a socket address, got '{}'",
            config.bind_address
        )));
    }

    if let Some(directory) = &config.directory_url {
        Url::parse(directory)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid directory_url: {}", e)))?;

        if config.public_address.is_none() {
            return Err(ConfigError::Validation(
                "public_address is required when directory_url is set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates partition entries
fn validate_partitions(partitions: &[PartitionEntry]) -> Result<(), ConfigError> {
    if partitions.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[partition]] must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    let mut catch_all = 0;

    for entry in partitions {
        validate_partition_name(&entry.name)?;

        if !names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate partition name '{}'",
                entry.name
            )));
        }

        if entry.url_patterns.is_empty() {
            catch_all += 1;
        }

        if entry.url_patterns.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Partition '{}' has an empty url pattern",
                entry.name
            )));
        }

        for seed in &entry.seeds {
            let url = Url::parse(seed).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
            })?;

            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(ConfigError::Validation(format!(
                    "Seed URL '{}' must use HTTP or HTTPS",
                    seed
                )));
            }
        }
    }

    if catch_all > 1 {
        return Err(ConfigError::Validation(
            "at most one partition may omit url-patterns".to_string(),
        ));
    }

    // A seed must land in the partition that lists it
    for (index, entry) in partitions.iter().enumerate() {
        for seed in &entry.seeds {
            if classify_partition(seed, partitions) != Some(index) {
                return Err(ConfigError::Validation(format!(
                    "Seed URL '{}' does not classify into partition '{}'",
                    seed, entry.name
                )));
            }
        }
    }

    Ok(())
}

/// Partition names appear in URL paths and storage rows
fn validate_partition_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "Partition name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Partition name '{}' must contain only lowercase letters, digits and hyphens",
            name
        )));
    }

    // Reserved by the server's own routes
    if name == "page-data" || name == "health" {
        return Err(ConfigError::Validation(format!(
            "Partition name '{}' is reserved",
            name
        )));
    }

    Ok(())
}

/// Validates the static denylist
fn validate_disallow(urls: &[String]) -> Result<(), ConfigError> {
    for entry in urls {
        Url::parse(entry).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid disallowed URL '{}': {}", entry, e))
        })?;
    }
    Ok(())
}
