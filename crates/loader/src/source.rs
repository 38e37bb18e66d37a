//! Table sources. A source only hands back raw text cells with normalised
//! headers; typing happens in [`crate::loader`].

use crate::normalize::normalize_header;
use csv::{ReaderBuilder, Trim};
use helios_core::config::DataConfig;
use helios_core::error::{HeliosError, HeliosResult};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Influencers,
    Posts,
    Tracking,
    Payouts,
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Influencers => "influencers",
            Self::Posts => "posts",
            Self::Tracking => "tracking",
            Self::Payouts => "payouts",
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Influencers => &["influencer_id", "name", "platform", "persona"],
            Self::Posts => &["post_id", "influencer_id", "date"],
            Self::Tracking => &["date", "influencer_id", "source", "revenue"],
            Self::Payouts => &["influencer_id", "total_payout"],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Untyped table: normalised headers plus text rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<H, R>(headers: H, rows: Vec<Vec<R>>) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| normalize_header(h.as_ref()))
                .collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve the table's required columns or fail the load.
    pub fn require(&self, kind: TableKind) -> HeliosResult<Vec<usize>> {
        kind.required_columns()
            .iter()
            .map(|col| {
                self.column(col).ok_or_else(|| {
                    HeliosError::data_unavailable(
                        kind.name(),
                        format!("missing required column '{col}'"),
                    )
                })
            })
            .collect()
    }

    /// Cell accessor tolerant of short (ragged) rows. Callers check that
    /// required columns are present first.
    pub fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
        row.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Anything that can hand over the four campaign tables.
pub trait TableSource: Send + Sync {
    fn read_table(&self, kind: TableKind) -> HeliosResult<RawTable>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Delimited files with a header row, one file per table.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
    files: HashMap<TableKind, String>,
}

impl CsvDirectorySource {
    pub fn new(config: &DataConfig) -> Self {
        let files = HashMap::from([
            (TableKind::Influencers, config.influencers_file.clone()),
            (TableKind::Posts, config.posts_file.clone()),
            (TableKind::Tracking, config.tracking_file.clone()),
            (TableKind::Payouts, config.payouts_file.clone()),
        ]);
        Self {
            root: config.dir.clone(),
            files,
        }
    }

    /// Directory with the default file names.
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let config = DataConfig {
            dir: root.as_ref().to_path_buf(),
            ..DataConfig::default()
        };
        Self::new(&config)
    }

    pub fn path_for(&self, kind: TableKind) -> PathBuf {
        let file = self
            .files
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| format!("{}.csv", kind.name()));
        self.root.join(file)
    }
}

impl TableSource for CsvDirectorySource {
    fn read_table(&self, kind: TableKind) -> HeliosResult<RawTable> {
        let path = self.path_for(kind);
        let unavailable =
            |reason: String| HeliosError::data_unavailable(kind.name(), format!("{}: {reason}", path.display()));

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&path)
            .map_err(|e| unavailable(e.to_string()))?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| unavailable(format!("failed to read header row: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(unavailable("file has no header row".into()));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| unavailable(format!("failed to read record: {e}")))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        debug!(table = kind.name(), path = %path.display(), rows = rows.len(), "CSV table read");
        Ok(RawTable::new(headers, rows))
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.root.display())
    }
}

/// Result sets already fetched from a warehouse by the data-access layer.
/// Connection handling and credentials live outside this crate.
#[derive(Debug, Clone, Default)]
pub struct WarehouseSnapshot {
    label: String,
    tables: HashMap<TableKind, RawTable>,
}

impl WarehouseSnapshot {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tables: HashMap::new(),
        }
    }

    pub fn with_table(mut self, kind: TableKind, table: RawTable) -> Self {
        self.tables.insert(kind, table);
        self
    }

    pub fn insert(&mut self, kind: TableKind, table: RawTable) {
        self.tables.insert(kind, table);
    }
}

impl TableSource for WarehouseSnapshot {
    fn read_table(&self, kind: TableKind) -> HeliosResult<RawTable> {
        self.tables.get(&kind).cloned().ok_or_else(|| {
            HeliosError::data_unavailable(kind.name(), format!("not present in {}", self.label))
        })
    }

    fn describe(&self) -> String {
        format!("warehouse:{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_table_normalises_headers() {
        let table = RawTable::new(["INFLUENCER_ID", "Total Payout"], vec![vec!["1", "100"]]);
        assert_eq!(table.column("influencer_id"), Some(0));
        assert_eq!(table.column("total_payout"), Some(1));
        assert!(table.require(TableKind::Payouts).is_ok());
    }

    #[test]
    fn test_missing_column_is_data_unavailable() {
        let table = RawTable::new(["influencer_id"], Vec::<Vec<String>>::new());
        let err = table.require(TableKind::Payouts).unwrap_err();
        assert!(matches!(err, HeliosError::DataUnavailable { ref table, .. } if table == "payouts"));
    }

    #[test]
    fn test_snapshot_missing_table() {
        let snapshot = WarehouseSnapshot::new("HELIOS.RAW");
        let err = snapshot.read_table(TableKind::Posts).unwrap_err();
        assert!(err.to_string().contains("posts"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvDirectorySource::in_dir(dir.path());
        let err = source.read_table(TableKind::Influencers).unwrap_err();
        assert!(matches!(err, HeliosError::DataUnavailable { .. }));
        assert!(source.path_for(TableKind::Tracking).ends_with("tracking_data.csv"));
    }
}
