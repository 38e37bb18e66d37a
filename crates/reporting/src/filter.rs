//! Filter engine: derives the per-selection subsets every downstream stage
//! works on. Rows are borrowed from the base load, never copied or mutated.

use helios_core::selection::FilterSelection;
use helios_core::types::{Dataset, Influencer, InfluencerId, Payout, TrackingEvent};
use helios_core::warning::PipelineWarning;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    /// Influencers matching the platform and persona selection, in reference
    /// table order.
    pub influencers: Vec<&'a Influencer>,
    /// Payouts of the selected influencers.
    pub payouts: Vec<&'a Payout>,
    /// Every tracking event inside the date range, campaign or not. Feeds
    /// the baseline.
    pub tracking: Vec<&'a TrackingEvent>,
    /// `tracking` restricted to selected influencers with at least one payout
    /// row. Revenue of unpaid influencers is reported, not attributed.
    pub attributed_tracking: Vec<&'a TrackingEvent>,
    pub warnings: Vec<PipelineWarning>,
    ids: HashSet<&'a InfluencerId>,
}

impl<'a> FilteredView<'a> {
    pub fn influencer_ids(&self) -> Vec<&'a InfluencerId> {
        self.influencers.iter().map(|i| &i.influencer_id).collect()
    }

    pub fn contains(&self, id: &InfluencerId) -> bool {
        self.ids.contains(id)
    }

    /// Nothing to attribute: no selected influencers, or none of them was
    /// paid. Downstream stages short-circuit to an explicit empty result.
    pub fn empty_reason(&self) -> Option<&'static str> {
        if self.influencers.is_empty() {
            Some("no influencers match the selected platforms and personas")
        } else if self.payouts.is_empty() {
            Some("no payouts recorded for the selected influencers")
        } else {
            None
        }
    }
}

/// Apply a selection to the base load. `campaign_source` marks tracking rows
/// that must join to an influencer; those that cannot are reported.
pub fn apply<'a>(
    selection: &FilterSelection,
    dataset: &'a Dataset,
    campaign_source: &str,
) -> FilteredView<'a> {
    let influencers: Vec<&Influencer> = dataset
        .influencers
        .iter()
        .filter(|i| selection.matches(&i.platform, &i.persona))
        .collect();
    let ids: HashSet<&InfluencerId> = influencers.iter().map(|i| &i.influencer_id).collect();

    let payouts: Vec<&Payout> = dataset
        .payouts
        .iter()
        .filter(|p| ids.contains(&p.influencer_id))
        .collect();

    let range = selection.date_range;
    let tracking: Vec<&TrackingEvent> = dataset
        .tracking
        .iter()
        .filter(|t| range.contains(t.date))
        .collect();

    let paid: HashSet<&InfluencerId> = payouts.iter().map(|p| &p.influencer_id).collect();
    let mut unpaid: BTreeMap<&InfluencerId, (usize, f64)> = BTreeMap::new();
    let mut attributed_tracking: Vec<&TrackingEvent> = Vec::new();
    for event in &tracking {
        let Some(id) = event.influencer_id.as_ref().filter(|id| ids.contains(id)) else {
            continue;
        };
        if paid.contains(id) {
            attributed_tracking.push(event);
        } else {
            let slot = unpaid.entry(id).or_default();
            slot.0 += 1;
            slot.1 += event.revenue;
        }
    }

    let mut warnings = join_mismatches(dataset, &tracking, campaign_source);
    warnings.extend(unpaid.into_iter().map(|(id, (rows, revenue))| {
        metrics::counter!("helios.unpaid_revenue").increment(rows as u64);
        let warning = PipelineWarning::UnpaidRevenue {
            influencer_id: id.to_string(),
            rows,
            revenue,
        };
        warn!(%warning, "Revenue excluded from attribution");
        warning
    }));

    debug!(
        influencers = influencers.len(),
        payouts = payouts.len(),
        tracking = tracking.len(),
        attributed = attributed_tracking.len(),
        start = %range.start(),
        end = %range.end(),
        "Selection applied"
    );

    FilteredView {
        influencers,
        payouts,
        tracking,
        attributed_tracking,
        warnings,
        ids,
    }
}

/// Payout rows and in-window campaign tracking rows whose influencer id is
/// missing from the reference table.
fn join_mismatches(
    dataset: &Dataset,
    tracking: &[&TrackingEvent],
    campaign_source: &str,
) -> Vec<PipelineWarning> {
    let known: HashSet<&InfluencerId> = dataset
        .influencers
        .iter()
        .map(|i| &i.influencer_id)
        .collect();

    let mut unknown_payouts: BTreeMap<&InfluencerId, usize> = BTreeMap::new();
    for payout in &dataset.payouts {
        if !known.contains(&payout.influencer_id) {
            *unknown_payouts.entry(&payout.influencer_id).or_default() += 1;
        }
    }

    let mut unknown_tracking: BTreeMap<Option<&InfluencerId>, usize> = BTreeMap::new();
    for event in tracking.iter().filter(|t| t.is_from_source(campaign_source)) {
        match &event.influencer_id {
            Some(id) if known.contains(id) => {}
            other => *unknown_tracking.entry(other.as_ref()).or_default() += 1,
        }
    }

    let payouts = unknown_payouts
        .into_iter()
        .map(|(id, rows)| ("payouts", Some(id), rows));
    let events = unknown_tracking
        .into_iter()
        .map(|(id, rows)| ("tracking", id, rows));

    payouts
        .chain(events)
        .map(|(table, id, rows)| {
            metrics::counter!("helios.join_mismatch", "table" => table).increment(rows as u64);
            let warning = PipelineWarning::JoinMismatch {
                table: table.to_string(),
                influencer_id: id.map(|i| i.to_string()),
                rows,
            };
            warn!(%warning, "Rows excluded from attribution");
            warning
        })
        .collect()
}
