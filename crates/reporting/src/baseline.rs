//! Organic baseline: revenue the window would have produced without the
//! campaign, estimated from non-campaign tracking events.

use helios_core::selection::DateRange;
use helios_core::types::TrackingEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineEstimate {
    /// Inclusive day count of the selected window.
    pub total_days: i64,
    pub non_campaign_events: usize,
    pub non_campaign_revenue: f64,
    pub baseline_daily_revenue: f64,
    /// Baseline over the whole window. Not per influencer.
    pub expected_baseline_revenue: f64,
}

/// Estimate the baseline from the date-filtered (not influencer-filtered)
/// tracking subset.
///
/// `expected = daily * total_days` equals the plain non-campaign sum for a
/// single contiguous window; the daily rate is kept as its own figure.
pub fn estimate(
    tracking: &[&TrackingEvent],
    range: &DateRange,
    campaign_source: &str,
) -> BaselineEstimate {
    let non_campaign: Vec<&TrackingEvent> = tracking
        .iter()
        .copied()
        .filter(|t| !t.is_from_source(campaign_source))
        .collect();
    let total_days = range.total_days();
    let non_campaign_revenue: f64 = non_campaign.iter().map(|t| t.revenue).sum();

    let baseline_daily_revenue = if !non_campaign.is_empty() && total_days > 0 {
        non_campaign_revenue / total_days as f64
    } else {
        0.0
    };

    BaselineEstimate {
        total_days,
        non_campaign_events: non_campaign.len(),
        non_campaign_revenue,
        baseline_daily_revenue,
        expected_baseline_revenue: baseline_daily_revenue * total_days as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use helios_core::types::InfluencerId;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn event(day: u32, source: &str, revenue: f64) -> TrackingEvent {
        TrackingEvent {
            date: d(day),
            influencer_id: (source == "influencer_campaign").then(|| InfluencerId::from("1")),
            source: source.to_string(),
            revenue,
        }
    }

    #[test]
    fn test_daily_rate_over_window() {
        let events = [
            event(1, "organic", 300.0),
            event(2, "paid_search", 100.0),
            event(4, "organic", 200.0),
            event(2, "influencer_campaign", 5000.0),
        ];
        let refs: Vec<&TrackingEvent> = events.iter().collect();
        let est = estimate(&refs, &DateRange::new(d(1), d(4)).unwrap(), "influencer_campaign");

        assert_eq!(est.total_days, 4);
        assert_eq!(est.non_campaign_events, 3);
        assert!((est.baseline_daily_revenue - 150.0).abs() < 1e-9);
        assert!((est.expected_baseline_revenue - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_organic_rows_means_zero_baseline() {
        let events = [event(1, "influencer_campaign", 900.0)];
        let refs: Vec<&TrackingEvent> = events.iter().collect();
        let est = estimate(&refs, &DateRange::single_day(d(1)), "influencer_campaign");
        assert_eq!(est.total_days, 1);
        assert_eq!(est.baseline_daily_revenue, 0.0);
        assert_eq!(est.expected_baseline_revenue, 0.0);
    }

    #[test]
    fn test_expected_matches_organic_sum() {
        let events: Vec<TrackingEvent> = (1..=30)
            .map(|day| event(day, "organic", 10.0 + day as f64 * 0.37))
            .collect();
        let refs: Vec<&TrackingEvent> = events.iter().collect();
        let est = estimate(&refs, &DateRange::new(d(1), d(30)).unwrap(), "influencer_campaign");
        assert!((est.expected_baseline_revenue - est.non_campaign_revenue).abs() < 1e-9);
    }
}
