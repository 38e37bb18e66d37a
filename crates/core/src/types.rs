use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Join key shared by influencers, posts, payouts and tracking events.
///
/// Stored in canonical text form so that `"7"`, `" 7 "` and `"7.0"` (the
/// latter is what warehouses return for nullable integer columns) compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfluencerId(String);

impl InfluencerId {
    /// Canonicalise a raw cell. Returns `None` for empty / null-like cells.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return None;
        }
        if let Some(integral) = trimmed.strip_suffix(".0") {
            if !integral.is_empty() && integral.bytes().all(|b| b.is_ascii_digit()) {
                return Some(Self(integral.to_string()));
            }
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InfluencerId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<u64> for InfluencerId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for InfluencerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference row for one influencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
    pub influencer_id: InfluencerId,
    pub name: String,
    pub platform: String,
    pub persona: String,
}

/// A piece of content published by an influencer. Loaded with the dataset but
/// not consumed by the attribution math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub influencer_id: Option<InfluencerId>,
    pub date: NaiveDate,
    pub platform: Option<String>,
    /// Remaining numeric columns (likes, comments, reach, ...).
    pub engagement: BTreeMap<String, f64>,
}

/// One attributed transaction. `influencer_id` is absent for non-campaign
/// channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub date: NaiveDate,
    pub influencer_id: Option<InfluencerId>,
    pub source: String,
    pub revenue: f64,
}

impl TrackingEvent {
    pub fn is_from_source(&self, source: &str) -> bool {
        self.source == source
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub influencer_id: InfluencerId,
    pub total_payout: f64,
}

/// The immutable base load. Shared read-only between sessions; every view is
/// derived from it without mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub influencers: Vec<Influencer>,
    pub posts: Vec<Post>,
    pub tracking: Vec<TrackingEvent>,
    pub payouts: Vec<Payout>,
}

impl Dataset {
    /// Distinct platforms in first-seen order.
    pub fn platforms(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.influencers
            .iter()
            .filter(|i| seen.insert(i.platform.as_str()))
            .map(|i| i.platform.clone())
            .collect()
    }

    /// Distinct personas, sorted.
    pub fn personas(&self) -> Vec<String> {
        self.influencers
            .iter()
            .map(|i| i.persona.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest tracking dates, if any events exist.
    pub fn tracking_date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.tracking.iter().map(|t| t.date).min()?;
        let max = self.tracking.iter().map(|t| t.date).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn influencer(id: &str, platform: &str, persona: &str) -> Influencer {
        Influencer {
            influencer_id: InfluencerId::from(id),
            name: format!("Creator {id}"),
            platform: platform.to_string(),
            persona: persona.to_string(),
        }
    }

    #[test]
    fn test_influencer_id_canonical_forms() {
        assert_eq!(InfluencerId::parse(" 7 "), Some(InfluencerId::from("7")));
        assert_eq!(InfluencerId::parse("7.0"), Some(InfluencerId::from("7")));
        assert_eq!(InfluencerId::parse("INF-7"), Some(InfluencerId::from("INF-7")));
        assert_eq!(InfluencerId::parse(""), None);
        assert_eq!(InfluencerId::parse("NaN"), None);
        assert_eq!(InfluencerId::parse(".0"), Some(InfluencerId::from(".0")));
    }

    #[test]
    fn test_option_lists() {
        let ds = Dataset {
            influencers: vec![
                influencer("1", "Instagram", "Fitness"),
                influencer("2", "YouTube", "Bodybuilding"),
                influencer("3", "Instagram", "Fitness"),
            ],
            ..Default::default()
        };
        assert_eq!(ds.platforms(), vec!["Instagram", "YouTube"]);
        assert_eq!(ds.personas(), vec!["Bodybuilding", "Fitness"]);
        assert!(ds.tracking_date_bounds().is_none());
    }
}
