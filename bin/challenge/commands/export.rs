//! Export command - write every stored submission to a zip archive

use crate::style::*;
use anyhow::{Context, Result};
use std::path::Path;
use weekly_challenge::Competition;

pub fn run(competition: &Competition, out: &Path) -> Result<()> {
    let archive = competition
        .export_archive()
        .context("Failed to read stored submissions")?;
    std::fs::write(out, &archive).with_context(|| format!("Failed to write {}", out.display()))?;

    print_success(&format!(
        "Wrote {} ({} bytes)",
        out.display(),
        archive.len()
    ));
    Ok(())
}
