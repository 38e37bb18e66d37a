//! Campaign attribution and reporting: filtering, organic baseline
//! estimation, incremental attribution per influencer, and the KPI roll-ups
//! every dashboard view consumes.

pub mod attribution;
pub mod baseline;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod summary;

pub use attribution::{aggregate, Attribution, InfluencerPerformance};
pub use baseline::{estimate, BaselineEstimate};
pub use filter::{apply, FilteredView};
pub use pipeline::{compute, AttributionPipeline, PipelineOutput};
pub use summary::{KpiSet, PersonaPerformance, PlatformBreakdown, Rankings, RevenuePoint};
