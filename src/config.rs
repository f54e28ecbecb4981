// Runtime configuration: the API base URL and the category list. Built once
// in `main` and handed to every component by reference.

/// Base URL used when neither `--api` nor the environment provides one.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Environment variable overriding [`DEFAULT_API_URL`].
pub const API_URL_ENV: &str = "BACKOFFICE_API_URL";

const CATEGORIES: [&str; 2] = ["confectionery", "electronics"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.into(),
            categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Config {
    /// Configuration with the base URL taken from `BACKOFFICE_API_URL`
    /// when set and non-empty, otherwise the default.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }
        config
    }
}
