use gocompare_common::{ComparisonOutcome, ComparisonResult, GoCompareError, RelativePath};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a finished comparison as a plain-text report.
///
/// The output depends only on `result`.
pub fn format_text(result: &ComparisonResult) -> String {
    let source = result.source_root.display();
    let target = result.target_root.display();
    let partition = &result.partition;
    let mut out = String::new();

    let _ = writeln!(out, "Comparison of {} against {}", source, target);
    let _ = writeln!(out, "{}", "=".repeat(80));
    let _ = writeln!(out, "Started:    {}", result.started.format(TIME_FORMAT));
    let _ = writeln!(out, "Finished:   {}", result.finished.format(TIME_FORMAT));
    let _ = writeln!(out, "Elapsed:    {}", format_elapsed(result.elapsed()));
    let _ = writeln!(out, "Checksum:   {}", result.algorithm);
    let _ = writeln!(out, "Sort order: {}", result.sort_order);
    let _ = writeln!(out);

    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Only in {}: {}", source, partition.only_in_source.len());
    let _ = writeln!(out, "  Only in {}: {}", target, partition.only_in_target.len());
    let _ = writeln!(out, "  Common files: {}", partition.common.len());
    let _ = writeln!(out, "    OK:         {}", result.passed());
    let _ = writeln!(out, "    FAILED:     {}", result.failed());
    let _ = writeln!(out, "    UNREADABLE: {}", result.unreadable());
    let _ = writeln!(
        out,
        "  Result: {}",
        if result.is_success() { "PASSED" } else { "FAILED" }
    );
    let _ = writeln!(out);

    write_listing(&mut out, &format!("Files only in {}", source), &partition.only_in_source);
    write_listing(&mut out, &format!("Files only in {}", target), &partition.only_in_target);

    let _ = writeln!(out, "Common files ({}):", result.outcomes.len());
    for comparison in &result.outcomes {
        let label = comparison.outcome.label();
        match &comparison.outcome {
            ComparisonOutcome::Match => {
                let _ = writeln!(out, "\t{}\t{}", comparison.path, label);
            }
            ComparisonOutcome::Mismatch { source, target } => {
                let _ = writeln!(
                    out,
                    "\t{}\t{}\t{}\t{}",
                    comparison.path, label, source, target
                );
            }
            ComparisonOutcome::Unreadable { side, reason } => {
                let _ = writeln!(
                    out,
                    "\t{}\t{}\t({}: {})",
                    comparison.path, label, side, reason
                );
            }
        }
    }

    out
}

fn write_listing(out: &mut String, title: &str, paths: &[RelativePath]) {
    let _ = writeln!(out, "{} ({}):", title, paths.len());
    for path in paths {
        let _ = writeln!(out, "\t{}", path);
    }
}

/// One-line status, e.g. `Finished: 9/10 OK, 1 failed, 0 bad files, 2 extra files`
pub fn summary_line(result: &ComparisonResult) -> String {
    format!(
        "Finished: {}/{} OK, {} failed, {} bad files, {} extra files",
        result.passed(),
        result.partition.common.len(),
        result.failed(),
        result.unreadable(),
        result.extra()
    )
}

/// Render the result as pretty-printed JSON
pub fn format_json(result: &ComparisonResult) -> Result<String, GoCompareError> {
    serde_json::to_string_pretty(result).map_err(|e| GoCompareError::Serialization(e.to_string()))
}

/// Write the text report to `path`, replacing any existing file.
///
/// On failure the result is untouched and can be written elsewhere.
pub fn write_report(result: &ComparisonResult, path: &Path) -> Result<(), GoCompareError> {
    fs::write(path, format_text(result)).map_err(|source| GoCompareError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote report to {}", path.display());
    Ok(())
}

/// Human readable duration: days, hours and minutes, with seconds shown
/// only for runs shorter than an hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{} days", days));
    }
    if hours > 0 {
        parts.push(format!("{} hrs", hours));
    }
    if minutes > 0 {
        parts.push(format!("{} mins", minutes));
    }
    if days == 0 && hours == 0 {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}
