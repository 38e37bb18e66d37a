//! CSV export of the influencer performance table. Amounts are written as
//! plain decimals (no grouping, no exponent) so the file re-imports exactly.

use crate::attribution::InfluencerPerformance;
use helios_core::error::{HeliosError, HeliosResult};
use std::io::{Read, Write};

pub const HEADER: [&str; 9] = [
    "influencer_id",
    "name",
    "platform",
    "persona",
    "total_payout",
    "attributed_revenue",
    "baseline_share",
    "incremental_revenue",
    "incremental_roas",
];

/// `Display` for f64 is the shortest exact decimal and never uses exponent
/// notation.
fn decimal(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0".
        "0".to_string()
    } else {
        value.to_string()
    }
}

pub fn write_csv<W: Write>(rows: &[InfluencerPerformance], writer: W) -> HeliosResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record([
            row.influencer_id.to_string(),
            row.name.clone(),
            row.platform.clone(),
            row.persona.clone(),
            decimal(row.total_payout),
            decimal(row.attributed_revenue),
            decimal(row.baseline_share),
            decimal(row.incremental_revenue),
            decimal(row.incremental_roas),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(rows: &[InfluencerPerformance]) -> HeliosResult<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| HeliosError::Export(e.to_string()))
}

/// Parse a file produced by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> HeliosResult<Vec<InfluencerPerformance>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(HeliosError::Export(format!(
            "unexpected header row: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }
    rdr.deserialize::<InfluencerPerformance>()
        .map(|r| r.map_err(HeliosError::from))
        .collect()
}
