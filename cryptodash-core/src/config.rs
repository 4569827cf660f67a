use crate::error::DashError;
use crate::pagination::PageSizes;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://cryptodashweb.azurewebsites.net";
pub const DEFAULT_SORT_KEY: &str = "id";
const DEFAULT_USER_AGENT: &str = "cryptodash-core/0.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_API_URL: &str = "CRYPTODASH_API_URL";
const ENV_PAGE_SIZES: &str = "CRYPTODASH_PAGE_SIZES";
const ENV_SORT_KEY: &str = "CRYPTODASH_SORT_KEY";
const ENV_TIMEOUT_SECS: &str = "CRYPTODASH_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct DashConfig {
    pub api_base_url: String,
    pub page_sizes: PageSizes,
    pub sort_key: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            page_sizes: PageSizes::default(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DashConfig {
    /// Defaults overlaid with any `CRYPTODASH_*` environment variables.
    pub fn from_env() -> Result<Self, DashError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DashError> {
        let mut config = DashConfig::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config = config.with_api_base_url(&url)?;
        }
        if let Some(sizes) = lookup(ENV_PAGE_SIZES) {
            config.page_sizes = parse_page_sizes(&sizes)?;
        }
        if let Some(key) = lookup(ENV_SORT_KEY) {
            let key = key.trim();
            if key.is_empty() {
                return Err(DashError::Config(format!("{} must not be empty", ENV_SORT_KEY)));
            }
            config.sort_key = key.to_string();
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DashError::Config(format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replace the base URL after checking it parses. Trailing slashes are dropped.
    pub fn with_api_base_url(mut self, url: &str) -> Result<Self, DashError> {
        let trimmed = url.trim().trim_end_matches('/');
        reqwest::Url::parse(trimmed)
            .map_err(|e| DashError::Config(format!("invalid API url '{}': {}", url, e)))?;
        self.api_base_url = trimmed.to_string();
        Ok(self)
    }
}

fn parse_page_sizes(raw: &str) -> Result<PageSizes, DashError> {
    let sizes = raw
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| DashError::Config(format!("invalid page size '{}'", part.trim())))
        })
        .collect::<Result<Vec<_>, _>>()?;
    PageSizes::new(sizes)
}
