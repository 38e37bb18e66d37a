use serde::Deserialize;
use std::path::PathBuf;

/// Root application configuration. Loaded from an optional `helios.toml`
/// and environment variables with the prefix `HELIOS__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub attribution: AttributionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_influencers_file")]
    pub influencers_file: String,
    #[serde(default = "default_posts_file")]
    pub posts_file: String,
    #[serde(default = "default_tracking_file")]
    pub tracking_file: String,
    #[serde(default = "default_payouts_file")]
    pub payouts_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Age after which a cached dataset is re-read on the next `load()`.
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    /// Tracking `source` value that marks campaign-attributed revenue.
    #[serde(default = "default_campaign_source")]
    pub campaign_source: String,
    /// How many influencers to show at each end of the ROAS ranking.
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_currency_code")]
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

// Default functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_influencers_file() -> String {
    "influencers.csv".to_string()
}
fn default_posts_file() -> String {
    "posts.csv".to_string()
}
fn default_tracking_file() -> String {
    "tracking_data.csv".to_string()
}
fn default_payouts_file() -> String {
    "payouts.csv".to_string()
}
fn default_staleness_secs() -> u64 {
    3600
}
fn default_campaign_source() -> String {
    "influencer_campaign".to_string()
}
fn default_ranking_size() -> usize {
    5
}
fn default_currency_symbol() -> String {
    "₹".to_string()
}
fn default_currency_code() -> String {
    "INR".to_string()
}
fn default_export_file_name() -> String {
    "influencer_performance_data.csv".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            influencers_file: default_influencers_file(),
            posts_file: default_posts_file(),
            tracking_file: default_tracking_file(),
            payouts_file: default_payouts_file(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            staleness_secs: default_staleness_secs(),
        }
    }
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            campaign_source: default_campaign_source(),
            ranking_size: default_ranking_size(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            currency_code: default_currency_code(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
    }
}

impl CacheConfig {
    pub fn staleness(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.staleness_secs.min(i64::MAX as u64) as i64)
    }
}

impl AppConfig {
    /// Load configuration from an optional `helios.toml` in the working
    /// directory, overridden by environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Like [`AppConfig::load`] but reading the given file (which must exist)
    /// instead of the optional default.
    pub fn load_from(path: Option<&std::path::Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p.to_path_buf()).required(true),
            None => config::File::with_name("helios").required(false),
        };
        let builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix("HELIOS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
