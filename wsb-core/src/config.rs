use crate::error::ConfigError;
use crate::types::CategoryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points at an optional TOML file overriding [`AnalysisConfig`] defaults.
pub const CONFIG_PATH_VAR: &str = "WSB_SENTIMENT_CONFIG";

const SUPPORTED_SORTS: &[&str] = &["new", "hot", "top", "rising"];

/// Script-app credentials for the Reddit password grant.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl RedditCredentials {
    pub const CLIENT_ID_VAR: &'static str = "REDDIT_CLIENT_ID";
    pub const CLIENT_SECRET_VAR: &'static str = "REDDIT_SECRET";
    pub const USERNAME_VAR: &'static str = "REDDIT_USERNAME";
    pub const PASSWORD_VAR: &'static str = "REDDIT_PASSWORD";
    pub const USER_AGENT_VAR: &'static str = "USER_AGENT";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from any key lookup; empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var_name: &str| {
            lookup(var_name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                    var_name: var_name.to_string(),
                })
        };

        Ok(Self {
            client_id: require(Self::CLIENT_ID_VAR)?,
            client_secret: require(Self::CLIENT_SECRET_VAR)?,
            username: require(Self::USERNAME_VAR)?,
            password: require(Self::PASSWORD_VAR)?,
            user_agent: require(Self::USER_AGENT_VAR)?,
        })
    }
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Uppercase every token and keep only `known_tickers` when set.
    pub case_insensitive: bool,
    pub known_tickers: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            known_tickers: Vec::new(),
            exclude: ["YOLO", "USA", "THE"].map(String::from).to_vec(),
        }
    }
}

impl ExtractorSettings {
    /// Vocabulary mode over the tickers tracked by the labelled dataset.
    pub fn vocabulary() -> Self {
        Self {
            case_insensitive: true,
            known_tickers: ["GME", "AMC", "BBBY", "RKT", "NVDA"]
                .map(String::from)
                .to_vec(),
            exclude: Vec::new(),
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        for ticker in self.known_tickers.iter().chain(self.exclude.iter()) {
            let well_formed = (1..=5).contains(&ticker.len())
                && ticker.chars().all(|c| c.is_ascii_uppercase());
            if !well_formed {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.known_tickers/exclude", section),
                    value: ticker.clone(),
                });
            }
        }
        if self.case_insensitive && self.known_tickers.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.known_tickers", section),
                value: "[] (vocabulary mode needs at least one ticker)".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub subreddit: String,
    pub sort: String,
    pub include_comments: bool,
    /// Caps the comment tree request; `None` lets Reddit pick.
    pub comment_limit: Option<u32>,
    pub extractor: ExtractorSettings,
    pub labelled_extractor: ExtractorSettings,
    pub category_policy: CategoryPolicy,
    /// Extra `word<TAB>valence` entries merged over the built-in lexicon.
    pub sentiment_lexicon: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub top_n: usize,
    pub render_charts: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            subreddit: "wallstreetbets".to_string(),
            sort: "new".to_string(),
            include_comments: true,
            comment_limit: None,
            extractor: ExtractorSettings::default(),
            labelled_extractor: ExtractorSettings::vocabulary(),
            category_policy: CategoryPolicy::default(),
            sentiment_lexicon: None,
            output_dir: PathBuf::from("."),
            top_n: 10,
            render_charts: true,
        }
    }
}

impl AnalysisConfig {
    /// Reads the file named by `WSB_SENTIMENT_CONFIG`, or falls back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => {
                debug!("{} not set, using default analysis config", CONFIG_PATH_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subreddit.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "subreddit".to_string(),
                value: self.subreddit.clone(),
            });
        }
        if !SUPPORTED_SORTS.contains(&self.sort.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "sort".to_string(),
                value: self.sort.clone(),
            });
        }
        if self.top_n == 0 {
            return Err(ConfigError::InvalidValue {
                field: "top_n".to_string(),
                value: "0".to_string(),
            });
        }
        if let CategoryPolicy::ThreeWay { neutral_band } = self.category_policy {
            if !(0.0..1.0).contains(&neutral_band) {
                return Err(ConfigError::InvalidValue {
                    field: "category_policy.neutral_band".to_string(),
                    value: neutral_band.to_string(),
                });
            }
        }
        self.extractor.validate("extractor")?;
        self.labelled_extractor.validate("labelled_extractor")?;
        Ok(())
    }
}
