use serde::Deserialize;
use url::Url;

/// Main configuration structure for a harvest run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Search filters and explicit seed URL overrides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    /// Keyword filter applied to the derived listing URL
    #[serde(default)]
    pub keyword: String,

    /// Location filter applied to the derived listing URL
    #[serde(default)]
    pub location: String,

    /// Drop records whose posting date is older than this many days
    #[serde(default)]
    pub max_age_days: Option<u32>,

    /// Explicit seed listing URLs; when present, no URL is derived
    #[serde(default, alias = "startUrls")]
    pub start_urls: Vec<String>,

    /// Single explicit seed, appended after `start_urls`
    #[serde(default, alias = "startUrl")]
    pub start_url: Option<String>,

    /// Legacy single-seed key, appended last
    #[serde(default)]
    pub url: Option<String>,
}

/// Crawl budgets, dedup, and request cadence
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// How many records to emit before stopping
    #[serde(
        default = "default_results_wanted",
        alias = "jobs",
        alias = "max_items",
        alias = "maxItems",
        alias = "max_results",
        alias = "maxResults",
        alias = "limit"
    )]
    pub results_wanted: usize,

    /// Maximum listing pages to follow per seed
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// When false, emit link-only stub records without fetching details
    #[serde(default = "default_true", alias = "collectDetails")]
    pub collect_details: bool,

    /// When false, the global visited-URL check is skipped
    #[serde(default = "default_true")]
    pub dedupe: bool,

    /// Worker pool size
    #[serde(default = "default_concurrency", alias = "maxConcurrency")]
    pub max_concurrency: usize,

    /// Pre-fetch delay bounds for listing pages (milliseconds)
    #[serde(default = "default_list_delay_min", alias = "listDelayMsMin")]
    pub list_delay_ms_min: u64,
    #[serde(default = "default_list_delay_max", alias = "listDelayMsMax")]
    pub list_delay_ms_max: u64,

    /// Pre-fetch delay bounds for detail pages (milliseconds)
    #[serde(default = "default_detail_delay_min", alias = "detailDelayMsMin")]
    pub detail_delay_ms_min: u64,
    #[serde(default = "default_detail_delay_max", alias = "detailDelayMsMax")]
    pub detail_delay_ms_max: u64,
}

/// HTTP client options passed through to the fetcher
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Proxy URL handed opaquely to the client builder
    #[serde(default, alias = "proxyUrl")]
    pub proxy_url: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON Lines output file
    #[serde(default = "default_output_path", alias = "output_path")]
    pub path: String,
}

fn default_results_wanted() -> usize {
    10
}

fn default_max_pages() -> u32 {
    25
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    10
}

fn default_list_delay_min() -> u64 {
    150
}

fn default_list_delay_max() -> u64 {
    600
}

fn default_detail_delay_min() -> u64 {
    200
}

fn default_detail_delay_max() -> u64 {
    700
}

fn default_output_path() -> String {
    "./jobs.jsonl".to_string()
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            results_wanted: default_results_wanted(),
            max_pages: default_max_pages(),
            collect_details: true,
            dedupe: true,
            max_concurrency: default_concurrency(),
            list_delay_ms_min: default_list_delay_min(),
            list_delay_ms_max: default_list_delay_max(),
            detail_delay_ms_min: default_detail_delay_min(),
            detail_delay_ms_max: default_detail_delay_max(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// Canonical English "all jobs" listing, used when no filters are given
pub const ALL_JOBS_URL: &str = "https://careerviet.vn/jobs/all-jobs-en.html";

/// Vietnamese listing endpoint that accepts keyword/location query params
const FILTERED_LISTING_URL: &str = "https://careerviet.vn/vi/tim-viec-lam/tat-ca-viec-lam";

impl Config {
    /// Returns the seed listing URLs for this run.
    ///
    /// Explicit seeds win in documented order (`start_urls`, then
    /// `start_url`, then `url`); with none given, a listing URL is derived
    /// from the search filters.
    pub fn seed_urls(&self) -> Vec<String> {
        let mut seeds: Vec<String> = Vec::new();
        seeds.extend(self.search.start_urls.iter().cloned());
        if let Some(u) = &self.search.start_url {
            seeds.push(u.clone());
        }
        if let Some(u) = &self.search.url {
            seeds.push(u.clone());
        }
        if seeds.is_empty() {
            seeds.push(self.derive_start_url());
        }
        seeds
    }

    /// Builds a listing URL from the configured search filters.
    ///
    /// No filters yields the English all-jobs listing. With filters, the
    /// Vietnamese listing endpoint takes `keyword`/`location` query params
    /// and a `posted` recency param mapped from `max_age_days`.
    pub fn derive_start_url(&self) -> String {
        let kw = self.search.keyword.trim();
        let loc = self.search.location.trim();
        if kw.is_empty() && loc.is_empty() {
            return ALL_JOBS_URL.to_string();
        }

        // FILTERED_LISTING_URL is a compile-time constant and always parses.
        let mut url = Url::parse(FILTERED_LISTING_URL).expect("constant listing URL");
        {
            let mut params = url.query_pairs_mut();
            if !kw.is_empty() {
                params.append_pair("keyword", kw);
            }
            if !loc.is_empty() {
                params.append_pair("location", loc);
            }
            if let Some(age) = self.search.max_age_days {
                let posted = match age {
                    1 => Some("24h"),
                    7 => Some("7d"),
                    30 => Some("30d"),
                    _ => None,
                };
                if let Some(p) = posted {
                    params.append_pair("posted", p);
                }
            }
        }
        url.to_string()
    }
}
