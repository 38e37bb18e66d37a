//! Non-fatal conditions raised while computing a view. They travel with the
//! result instead of aborting it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// The active selection leaves no influencers or no payouts to attribute.
    EmptyResult { reason: String },
    /// Rows referencing an influencer id absent from the reference table.
    /// `influencer_id` is `None` for campaign rows that carry no id at all.
    JoinMismatch {
        table: String,
        influencer_id: Option<String>,
        rows: usize,
    },
    /// Several payout rows for one influencer, summed into one.
    DuplicatePayout { influencer_id: String, rows: usize },
    /// Tracking revenue of a selected influencer with no payout row. Left out
    /// of every revenue figure, per-influencer and aggregate alike.
    UnpaidRevenue {
        influencer_id: String,
        rows: usize,
        revenue: f64,
    },
}

impl PipelineWarning {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyResult { reason } => write!(f, "No data for the selected filters: {reason}"),
            Self::JoinMismatch {
                table,
                influencer_id: Some(id),
                rows,
            } => write!(
                f,
                "{rows} {table} row(s) reference unknown influencer '{id}' and were excluded"
            ),
            Self::JoinMismatch {
                table,
                influencer_id: None,
                rows,
            } => write!(
                f,
                "{rows} campaign {table} row(s) carry no influencer id and were excluded"
            ),
            Self::DuplicatePayout { influencer_id, rows } => write!(
                f,
                "{rows} payout rows found for influencer '{influencer_id}'; amounts were summed"
            ),
            Self::UnpaidRevenue {
                influencer_id,
                rows,
                revenue,
            } => write!(
                f,
                "{rows} tracking row(s) worth {revenue:.2} belong to influencer '{influencer_id}' who has no payout and were excluded"
            ),
        }
    }
}
