use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[search]
keyword = "rust"
location = "Ho Chi Minh"
max_age_days = 30

[crawl]
results_wanted = 25
max_pages = 5
max_concurrency = 4

[output]
path = "./out.jsonl"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.search.keyword, "rust");
        assert_eq!(config.crawl.results_wanted, 25);
        assert_eq!(config.crawl.max_pages, 5);
        assert_eq!(config.crawl.max_concurrency, 4);
        assert_eq!(config.output.path, "./out.jsonl");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.results_wanted, 10);
        assert!(config.crawl.collect_details);
    }

    #[test]
    fn test_quota_alias_accepted() {
        let file = create_temp_config("[crawl]\nlimit = 3\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.results_wanted, 3);
    }

    #[test]
    fn test_camel_case_aliases_accepted() {
        let file = create_temp_config(
            "[crawl]\ncollectDetails = false\nmaxConcurrency = 2\n\n[search]\nstartUrl = \"https://careerviet.vn/jobs/all-jobs-en.html\"\n",
        );
        let config = load_config(file.path()).unwrap();
        assert!(!config.crawl.collect_details);
        assert_eq!(config.crawl.max_concurrency, 2);
        assert!(config.search.start_url.is_some());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawl]\nresults_wanted = 0\n");
        assert!(load_config(file.path()).is_err());
    }
}
