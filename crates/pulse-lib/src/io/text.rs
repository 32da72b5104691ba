use anyhow::{Context, Result};
use std::path::Path;

/// Parse newline-delimited RR intervals in milliseconds, ignoring blank and
/// comment lines.
pub fn parse_rr_millis(text: &str) -> Result<Vec<u32>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let rr: u32 = trimmed
            .parse()
            .with_context(|| format!("line {} is not an RR interval in ms: {}", idx + 1, trimmed))?;
        out.push(rr);
    }
    if out.is_empty() {
        anyhow::bail!("no RR intervals found");
    }
    Ok(out)
}

/// Read a newline-delimited RR series (ms) from disk.
pub fn read_rr_millis(path: &Path) -> Result<Vec<u32>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_rr_millis(&text)
}
