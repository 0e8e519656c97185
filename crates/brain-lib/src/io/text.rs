use anyhow::{Context, Result};
use std::path::Path;

/// Parse newline-delimited timestamps (ms), ignoring blank/comment lines.
/// Timestamps must be non-decreasing.
pub fn parse_timestamps(text: &str) -> Result<Vec<f64>> {
    let mut out: Vec<f64> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not a timestamp: {}", idx + 1, trimmed))?;
        if let Some(&prev) = out.last() {
            if val < prev {
                anyhow::bail!("line {}: timestamp {} is before {}", idx + 1, val, prev);
            }
        }
        out.push(val);
    }
    Ok(out)
}

pub fn read_timestamps(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_timestamps(&text)
}
