use super::{Aggregate, ReportRow};
use std::path::Path;

/// One record per compressed file, then a `TOTAL` record.
pub fn write(aggregate: &Aggregate, path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in &aggregate.rows {
        writer.serialize(row)?;
    }
    writer.serialize(ReportRow {
        name: "TOTAL".to_string(),
        original_size: aggregate.totals.original_bytes,
        compressed_size: aggregate.totals.compressed_bytes,
        ratio: aggregate.totals.ratio,
        path: String::new(),
    })?;
    writer.flush()?;
    Ok(())
}
