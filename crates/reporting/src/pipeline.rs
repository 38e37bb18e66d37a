//! The full recomputation pass run on every selection change:
//! filter → baseline → attribution → summary. Pure: the same base load and
//! selection always give the same output.

use crate::attribution::{aggregate, InfluencerPerformance};
use crate::baseline::{estimate, BaselineEstimate};
use crate::filter::apply;
use crate::summary::{
    persona_performance, platform_breakdown, rank, revenue_by_date, summarize, KpiSet,
    PersonaPerformance, PlatformBreakdown, Rankings, RevenuePoint,
};
use helios_core::config::{AppConfig, AttributionConfig, DisplayConfig};
use helios_core::selection::FilterSelection;
use helios_core::types::Dataset;
use helios_core::warning::PipelineWarning;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub selection: FilterSelection,
    pub kpis: KpiSet,
    pub baseline: BaselineEstimate,
    pub performance: Vec<InfluencerPerformance>,
    pub revenue_by_date: Vec<RevenuePoint>,
    pub rankings: Rankings,
    pub persona_performance: Vec<PersonaPerformance>,
    pub platform_breakdown: Vec<PlatformBreakdown>,
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineOutput {
    /// Explicit "no data" result: zero KPIs, empty tables.
    pub fn empty(
        selection: FilterSelection,
        display: &DisplayConfig,
        warnings: Vec<PipelineWarning>,
    ) -> Self {
        Self {
            selection,
            kpis: KpiSet::zero(display),
            baseline: BaselineEstimate::default(),
            performance: Vec::new(),
            revenue_by_date: Vec::new(),
            rankings: Rankings::default(),
            persona_performance: Vec::new(),
            platform_breakdown: Vec::new(),
            warnings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.iter().any(PipelineWarning::is_empty_result)
    }
}

/// Shared entry point for every view; holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct AttributionPipeline {
    attribution: AttributionConfig,
    display: DisplayConfig,
}

impl AttributionPipeline {
    pub fn new(attribution: AttributionConfig, display: DisplayConfig) -> Self {
        Self {
            attribution,
            display,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.attribution.clone(), config.display.clone())
    }

    pub fn run(&self, dataset: &Dataset, selection: &FilterSelection) -> PipelineOutput {
        let campaign_source = self.attribution.campaign_source.as_str();
        let view = apply(selection, dataset, campaign_source);
        let mut warnings = view.warnings.clone();

        if let Some(reason) = view.empty_reason() {
            metrics::counter!("helios.empty_result").increment(1);
            let warning = PipelineWarning::EmptyResult {
                reason: reason.to_string(),
            };
            warn!(%warning, "Empty selection");
            warnings.push(warning);
            return PipelineOutput::empty(selection.clone(), &self.display, warnings);
        }

        let baseline = estimate(&view.tracking, &selection.date_range, campaign_source);
        let attribution = aggregate(
            &view.payouts,
            &view.influencers,
            &view.attributed_tracking,
            baseline.expected_baseline_revenue,
        );
        warnings.extend(attribution.warnings);
        let performance = attribution.rows;

        let kpis = summarize(
            &performance,
            &view.attributed_tracking,
            &view.payouts,
            &baseline,
            &self.display,
        );

        info!(
            influencers = performance.len(),
            total_spend = kpis.total_spend,
            attributed_revenue = kpis.attributed_revenue,
            incremental_roas = kpis.incremental_roas,
            warnings = warnings.len(),
            "Attribution computed"
        );

        PipelineOutput {
            selection: selection.clone(),
            revenue_by_date: revenue_by_date(&view.attributed_tracking),
            rankings: rank(&performance, self.attribution.ranking_size),
            persona_performance: persona_performance(&performance),
            platform_breakdown: platform_breakdown(&performance),
            kpis,
            baseline,
            performance,
            warnings,
        }
    }
}

/// Run the pipeline with default attribution and display settings.
pub fn compute(dataset: &Dataset, selection: &FilterSelection) -> PipelineOutput {
    AttributionPipeline::default().run(dataset, selection)
}
