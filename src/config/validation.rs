use crate::config::types::Config;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates a parsed configuration
///
/// Checks budgets, cadence bounds, and that every explicit seed (and the
/// proxy, when set) parses as an absolute http(s) URL.
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.crawl.results_wanted == 0 {
        return Err(ConfigError::Validation(
            "results_wanted must be at least 1".to_string(),
        ));
    }

    if config.crawl.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max_pages must be at least 1".to_string(),
        ));
    }

    if config.crawl.max_concurrency == 0 {
        return Err(ConfigError::Validation(
            "max_concurrency must be at least 1".to_string(),
        ));
    }

    if config.crawl.list_delay_ms_min > config.crawl.list_delay_ms_max {
        return Err(ConfigError::Validation(format!(
            "list delay bounds inverted: {} > {}",
            config.crawl.list_delay_ms_min, config.crawl.list_delay_ms_max
        )));
    }

    if config.crawl.detail_delay_ms_min > config.crawl.detail_delay_ms_max {
        return Err(ConfigError::Validation(format!(
            "detail delay bounds inverted: {} > {}",
            config.crawl.detail_delay_ms_min, config.crawl.detail_delay_ms_max
        )));
    }

    for seed in config.seed_urls() {
        validate_http_url(&seed)?;
    }

    if let Some(proxy) = &config.http.proxy_url {
        Url::parse(proxy).map_err(|_| ConfigError::InvalidUrl(proxy.clone()))?;
    }

    Ok(())
}

fn validate_http_url(raw: &str) -> ConfigResult<()> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(())
}
