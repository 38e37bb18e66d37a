//! Top-line KPIs and the groupings behind the dashboard charts.

use crate::attribution::InfluencerPerformance;
use crate::baseline::BaselineEstimate;
use chrono::NaiveDate;
use helios_core::config::DisplayConfig;
use helios_core::types::{Payout, TrackingEvent};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub total_spend: f64,
    pub attributed_revenue: f64,
    pub simple_roas: f64,
    /// Selection-level figure: `(attributed - expected baseline) / spend`.
    pub incremental_roas: f64,
    pub incremental_revenue: f64,
    pub expected_baseline_revenue: f64,
    pub influencer_count: usize,
    pub currency_symbol: String,
    pub currency_code: String,
}

impl KpiSet {
    /// All-zero KPIs for a selection with nothing to attribute.
    pub fn zero(display: &DisplayConfig) -> Self {
        Self {
            total_spend: 0.0,
            attributed_revenue: 0.0,
            simple_roas: 0.0,
            incremental_roas: 0.0,
            incremental_revenue: 0.0,
            expected_baseline_revenue: 0.0,
            influencer_count: 0,
            currency_symbol: display.currency_symbol.clone(),
            currency_code: display.currency_code.clone(),
        }
    }

    pub fn formatted(&self) -> FormattedKpis {
        FormattedKpis {
            total_spend: format_currency(self.total_spend, &self.currency_symbol),
            attributed_revenue: format_currency(self.attributed_revenue, &self.currency_symbol),
            simple_roas: format_roas(self.simple_roas),
            incremental_roas: format_roas(self.incremental_roas),
        }
    }
}

/// Display strings for KPI cards. Never used for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedKpis {
    pub total_spend: String,
    pub attributed_revenue: String,
    pub simple_roas: String,
    pub incremental_roas: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub top: Vec<InfluencerPerformance>,
    pub bottom: Vec<InfluencerPerformance>,
    /// Top and bottom merged for a single chart, best first, each influencer
    /// once.
    pub combined: Vec<InfluencerPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaPerformance {
    pub persona: String,
    pub influencers: usize,
    pub mean_incremental_roas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub platform: String,
    pub influencers: usize,
    pub total_spend: f64,
    pub attributed_revenue: f64,
    pub incremental_revenue: f64,
    pub incremental_roas: f64,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Roll filtered payouts and attributed tracking into top-line KPIs.
///
/// Computed from the filtered tables directly, independent of the
/// per-influencer apportionment.
pub fn summarize(
    performance: &[InfluencerPerformance],
    attributed: &[&TrackingEvent],
    payouts: &[&Payout],
    baseline: &BaselineEstimate,
    display: &DisplayConfig,
) -> KpiSet {
    let total_spend: f64 = payouts.iter().map(|p| p.total_payout).sum();
    let attributed_revenue: f64 = attributed.iter().map(|t| t.revenue).sum();
    let incremental_revenue = attributed_revenue - baseline.expected_baseline_revenue;

    KpiSet {
        total_spend,
        attributed_revenue,
        simple_roas: ratio(attributed_revenue, total_spend),
        incremental_roas: ratio(incremental_revenue, total_spend),
        incremental_revenue,
        expected_baseline_revenue: baseline.expected_baseline_revenue,
        influencer_count: performance.len(),
        currency_symbol: display.currency_symbol.clone(),
        currency_code: display.currency_code.clone(),
    }
}

/// Daily attributed revenue, oldest first.
pub fn revenue_by_date(attributed: &[&TrackingEvent]) -> Vec<RevenuePoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for event in attributed {
        *by_date.entry(event.date).or_insert(0.0) += event.revenue;
    }
    by_date
        .into_iter()
        .map(|(date, revenue)| RevenuePoint { date, revenue })
        .collect()
}

fn by_roas_desc(a: &InfluencerPerformance, b: &InfluencerPerformance) -> Ordering {
    b.incremental_roas
        .total_cmp(&a.incremental_roas)
        .then_with(|| a.influencer_id.cmp(&b.influencer_id))
}

/// Best and worst `n` influencers by incremental ROAS. Ties break on
/// influencer id so the result is stable across recomputations.
pub fn rank(performance: &[InfluencerPerformance], n: usize) -> Rankings {
    let mut sorted: Vec<InfluencerPerformance> = performance.to_vec();
    sorted.sort_by(by_roas_desc);

    let top: Vec<_> = sorted.iter().take(n).cloned().collect();
    let mut bottom: Vec<_> = sorted.iter().rev().take(n).cloned().collect();
    bottom.sort_by(|a, b| by_roas_desc(b, a));

    let mut seen = HashSet::new();
    let mut combined: Vec<_> = top
        .iter()
        .chain(bottom.iter())
        .filter(|p| seen.insert(p.influencer_id.clone()))
        .cloned()
        .collect();
    combined.sort_by(by_roas_desc);

    Rankings {
        top,
        bottom,
        combined,
    }
}

/// Mean incremental ROAS per persona, best first.
pub fn persona_performance(performance: &[InfluencerPerformance]) -> Vec<PersonaPerformance> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in performance {
        let slot = groups.entry(row.persona.as_str()).or_insert((0.0, 0));
        slot.0 += row.incremental_roas;
        slot.1 += 1;
    }
    let mut out: Vec<PersonaPerformance> = groups
        .into_iter()
        .map(|(persona, (sum, count))| PersonaPerformance {
            persona: persona.to_string(),
            influencers: count,
            mean_incremental_roas: sum / count as f64,
        })
        .collect();
    out.sort_by(|a, b| {
        b.mean_incremental_roas
            .total_cmp(&a.mean_incremental_roas)
            .then_with(|| a.persona.cmp(&b.persona))
    });
    out
}

/// Spend and revenue per platform, alphabetical.
pub fn platform_breakdown(performance: &[InfluencerPerformance]) -> Vec<PlatformBreakdown> {
    let mut groups: BTreeMap<&str, PlatformBreakdown> = BTreeMap::new();
    for row in performance {
        let entry = groups
            .entry(row.platform.as_str())
            .or_insert_with(|| PlatformBreakdown {
                platform: row.platform.clone(),
                influencers: 0,
                total_spend: 0.0,
                attributed_revenue: 0.0,
                incremental_revenue: 0.0,
                incremental_roas: 0.0,
            });
        entry.influencers += 1;
        entry.total_spend += row.total_payout;
        entry.attributed_revenue += row.attributed_revenue;
        entry.incremental_revenue += row.incremental_revenue;
    }
    groups
        .into_values()
        .map(|mut b| {
            b.incremental_roas = ratio(b.incremental_revenue, b.total_spend);
            b
        })
        .collect()
}

/// `₹1,234.50` style amount for display.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{frac}")
}

pub fn format_roas(roas: f64) -> String {
    format!("{roas:.2}x")
}
