//! Typed load of the four campaign tables. All-or-nothing: any unreadable
//! table or malformed required cell fails the whole load.

use crate::normalize::{parse_amount, parse_date, parse_metric};
use crate::source::{RawTable, TableKind, TableSource};
use helios_core::error::{HeliosError, HeliosResult};
use helios_core::types::{Dataset, Influencer, InfluencerId, Payout, Post, TrackingEvent};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

pub struct DataLoader<S> {
    source: S,
}

impl<S: TableSource> DataLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn load(&self) -> HeliosResult<Dataset> {
        let influencers = parse_influencers(&self.source.read_table(TableKind::Influencers)?)?;
        let posts = parse_posts(&self.source.read_table(TableKind::Posts)?)?;
        let tracking = parse_tracking(&self.source.read_table(TableKind::Tracking)?)?;
        let payouts = parse_payouts(&self.source.read_table(TableKind::Payouts)?)?;

        info!(
            source = %self.source.describe(),
            influencers = influencers.len(),
            posts = posts.len(),
            tracking = tracking.len(),
            payouts = payouts.len(),
            "Dataset loaded"
        );

        Ok(Dataset {
            influencers,
            posts,
            tracking,
            payouts,
        })
    }
}

fn row_error(kind: TableKind, line: usize, reason: impl std::fmt::Display) -> HeliosError {
    // +2: one for the header row, one for 1-based numbering.
    HeliosError::data_unavailable(kind.name(), format!("row {}: {reason}", line + 2))
}

/// Required cells must be present; a truncated row is malformed, not zero.
fn check_width(kind: TableKind, line: usize, row: &[String], cols: &[usize]) -> HeliosResult<()> {
    let needed = cols.iter().max().map_or(0, |idx| idx + 1);
    if row.len() < needed {
        return Err(row_error(
            kind,
            line,
            format!("{} field(s), expected at least {needed}", row.len()),
        ));
    }
    Ok(())
}

fn required_id(kind: TableKind, line: usize, raw: &str) -> HeliosResult<InfluencerId> {
    InfluencerId::parse(raw).ok_or_else(|| row_error(kind, line, "missing influencer_id"))
}

fn required_date(kind: TableKind, line: usize, raw: &str) -> HeliosResult<chrono::NaiveDate> {
    parse_date(raw).ok_or_else(|| row_error(kind, line, format!("unparsable date '{raw}'")))
}

pub(crate) fn parse_influencers(table: &RawTable) -> HeliosResult<Vec<Influencer>> {
    let kind = TableKind::Influencers;
    let cols = table.require(kind)?;
    let mut seen = HashSet::new();
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(line, row)| {
            check_width(kind, line, row, &cols)?;
            let influencer_id = required_id(kind, line, RawTable::cell(row, cols[0]))?;
            if !seen.insert(influencer_id.clone()) {
                return Err(row_error(
                    kind,
                    line,
                    format!("duplicate influencer_id '{influencer_id}'"),
                ));
            }
            Ok(Influencer {
                influencer_id,
                name: RawTable::cell(row, cols[1]).to_string(),
                platform: RawTable::cell(row, cols[2]).to_string(),
                persona: RawTable::cell(row, cols[3]).to_string(),
            })
        })
        .collect()
}

pub(crate) fn parse_posts(table: &RawTable) -> HeliosResult<Vec<Post>> {
    let kind = TableKind::Posts;
    let cols = table.require(kind)?;
    let platform_col = table.column("platform");
    let metric_cols: Vec<(usize, &String)> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(idx, _)| !cols.contains(idx) && Some(*idx) != platform_col)
        .collect();

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(line, row)| {
            check_width(kind, line, row, &cols)?;
            let post_id = RawTable::cell(row, cols[0]);
            if post_id.is_empty() {
                return Err(row_error(kind, line, "missing post_id"));
            }
            let engagement: BTreeMap<String, f64> = metric_cols
                .iter()
                .filter_map(|(idx, name)| {
                    parse_metric(RawTable::cell(row, *idx)).map(|v| (name.to_string(), v))
                })
                .collect();
            Ok(Post {
                post_id: post_id.to_string(),
                influencer_id: InfluencerId::parse(RawTable::cell(row, cols[1])),
                date: required_date(kind, line, RawTable::cell(row, cols[2]))?,
                platform: platform_col
                    .map(|idx| RawTable::cell(row, idx))
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
                engagement,
            })
        })
        .collect()
}

pub(crate) fn parse_tracking(table: &RawTable) -> HeliosResult<Vec<TrackingEvent>> {
    let kind = TableKind::Tracking;
    let cols = table.require(kind)?;
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(line, row)| {
            check_width(kind, line, row, &cols)?;
            Ok(TrackingEvent {
                date: required_date(kind, line, RawTable::cell(row, cols[0]))?,
                influencer_id: InfluencerId::parse(RawTable::cell(row, cols[1])),
                source: RawTable::cell(row, cols[2]).to_string(),
                revenue: parse_amount(RawTable::cell(row, cols[3]))
                    .map_err(|e| row_error(kind, line, format!("revenue {e}")))?,
            })
        })
        .collect()
}

pub(crate) fn parse_payouts(table: &RawTable) -> HeliosResult<Vec<Payout>> {
    let kind = TableKind::Payouts;
    let cols = table.require(kind)?;
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(line, row)| {
            check_width(kind, line, row, &cols)?;
            Ok(Payout {
                influencer_id: required_id(kind, line, RawTable::cell(row, cols[0]))?,
                total_payout: parse_amount(RawTable::cell(row, cols[1]))
                    .map_err(|e| row_error(kind, line, format!("total_payout {e}")))?,
            })
        })
        .collect()
}
