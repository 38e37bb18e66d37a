pub mod config;
pub mod error;
pub mod selection;
pub mod types;
pub mod warning;

pub use config::AppConfig;
pub use error::{HeliosError, HeliosResult};
pub use selection::{DateRange, FilterSelection};
pub use types::{Dataset, Influencer, InfluencerId, Payout, Post, TrackingEvent};
pub use warning::PipelineWarning;
