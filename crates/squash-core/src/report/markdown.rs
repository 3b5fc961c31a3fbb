use super::{format_ratio, format_size, Aggregate};
use chrono::Local;
use std::fmt::Write;

pub fn render(aggregate: &Aggregate) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, aggregate);
    out
}

fn write_document(out: &mut String, aggregate: &Aggregate) -> std::fmt::Result {
    writeln!(out, "# Image compression report")?;
    writeln!(out)?;
    writeln!(out, "Generated {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;
    writeln!(out, "## Files")?;
    writeln!(out)?;
    writeln!(out, "| name | original size | compressed size | ratio | path |")?;
    writeln!(out, "| -- | -- | -- | -- | -- |")?;
    for row in &aggregate.rows {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            row.name,
            format_size(row.original_size),
            format_size(row.compressed_size),
            format_ratio(row.ratio),
            row.path
        )?;
    }
    writeln!(out)?;
    writeln!(out, "## Totals")?;
    writeln!(out)?;
    writeln!(out, "| original size | compressed size | ratio |")?;
    writeln!(out, "| -- | -- | -- |")?;
    writeln!(
        out,
        "| {} | {} | {} |",
        format_size(aggregate.totals.original_bytes),
        format_size(aggregate.totals.compressed_bytes),
        format_ratio(aggregate.totals.ratio)
    )?;

    if !aggregate.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Failed ({})", aggregate.failures.len())?;
        writeln!(out)?;
        for failure in &aggregate.failures {
            writeln!(out, "- {}: {}", failure.path.display(), failure.error)?;
        }
    }
    Ok(())
}
