//! Incremental revenue attribution: joins payouts to influencer metadata and
//! attributed revenue, then charges each influencer a share of the organic
//! baseline proportional to their share of spend.

use helios_core::types::{Influencer, InfluencerId, Payout, TrackingEvent};
use helios_core::warning::PipelineWarning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Per-influencer result row. Also the CSV export schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerPerformance {
    pub influencer_id: InfluencerId,
    pub name: String,
    pub platform: String,
    pub persona: String,
    pub total_payout: f64,
    pub attributed_revenue: f64,
    pub baseline_share: f64,
    pub incremental_revenue: f64,
    pub incremental_roas: f64,
}

impl InfluencerPerformance {
    /// Revenue over payout, ignoring the baseline.
    pub fn simple_roas(&self) -> f64 {
        if self.total_payout > 0.0 {
            self.attributed_revenue / self.total_payout
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Attribution {
    /// One row per paid influencer, in payout order. No ranking implied.
    pub rows: Vec<InfluencerPerformance>,
    pub total_campaign_spend: f64,
    pub warnings: Vec<PipelineWarning>,
}

/// Sum of attributed revenue per influencer id.
pub fn revenue_by_influencer<'a>(
    attributed: &[&'a TrackingEvent],
) -> HashMap<&'a InfluencerId, f64> {
    let mut revenue: HashMap<&InfluencerId, f64> = HashMap::new();
    for event in attributed {
        if let Some(id) = &event.influencer_id {
            *revenue.entry(id).or_insert(0.0) += event.revenue;
        }
    }
    revenue
}

/// Build the per-influencer performance table.
///
/// Payouts without a matching influencer are dropped with a warning; repeated
/// payout rows for one influencer are summed into a single row. Influencers
/// without attributed events get zero revenue.
pub fn aggregate(
    payouts: &[&Payout],
    influencers: &[&Influencer],
    attributed: &[&TrackingEvent],
    expected_baseline_revenue: f64,
) -> Attribution {
    let mut warnings = Vec::new();
    let revenue = revenue_by_influencer(attributed);
    let by_id: HashMap<&InfluencerId, &Influencer> =
        influencers.iter().map(|i| (&i.influencer_id, *i)).collect();

    // Merge duplicates while keeping first-seen order.
    let mut order: Vec<&InfluencerId> = Vec::new();
    let mut spend: HashMap<&InfluencerId, (f64, usize)> = HashMap::new();
    for payout in payouts {
        let slot = spend.entry(&payout.influencer_id).or_insert_with(|| {
            order.push(&payout.influencer_id);
            (0.0, 0)
        });
        slot.0 += payout.total_payout;
        slot.1 += 1;
    }

    let mut rows = Vec::with_capacity(order.len());
    for id in order {
        let (total_payout, count) = spend[id];
        if count > 1 {
            let warning = PipelineWarning::DuplicatePayout {
                influencer_id: id.to_string(),
                rows: count,
            };
            warn!(%warning, "Duplicate payout rows merged");
            warnings.push(warning);
        }
        let Some(influencer) = by_id.get(id) else {
            metrics::counter!("helios.join_mismatch", "table" => "payouts")
                .increment(count as u64);
            let warning = PipelineWarning::JoinMismatch {
                table: "payouts".to_string(),
                influencer_id: Some(id.to_string()),
                rows: count,
            };
            warn!(%warning, "Payout dropped from attribution");
            warnings.push(warning);
            continue;
        };
        rows.push(InfluencerPerformance {
            influencer_id: id.clone(),
            name: influencer.name.clone(),
            platform: influencer.platform.clone(),
            persona: influencer.persona.clone(),
            total_payout,
            attributed_revenue: revenue.get(id).copied().unwrap_or(0.0),
            baseline_share: 0.0,
            incremental_revenue: 0.0,
            incremental_roas: 0.0,
        });
    }

    let total_campaign_spend: f64 = rows.iter().map(|r| r.total_payout).sum();
    if total_campaign_spend > 0.0 {
        for row in &mut rows {
            row.baseline_share = row.total_payout / total_campaign_spend * expected_baseline_revenue;
            row.incremental_revenue = row.attributed_revenue - row.baseline_share;
            row.incremental_roas = if row.total_payout > 0.0 {
                row.incremental_revenue / row.total_payout
            } else {
                0.0
            };
        }
    }

    debug!(
        rows = rows.len(),
        total_campaign_spend,
        expected_baseline_revenue,
        "Attribution aggregated"
    );

    Attribution {
        rows,
        total_campaign_spend,
        warnings,
    }
}
