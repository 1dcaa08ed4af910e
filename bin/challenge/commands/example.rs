//! Example command - write a submission template

use crate::style::*;
use anyhow::{Context, Result};
use std::path::Path;
use weekly_challenge::Competition;

pub fn run(competition: &Competition, out: &Path) -> Result<()> {
    let template = competition.example_submission();
    std::fs::write(out, &template)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    print_success(&format!(
        "Wrote {} rows to {}",
        competition.info().required_length,
        out.display()
    ));
    println!(
        "  {} Replace the zeros in the {} column with your predictions",
        icon_arrow(),
        style_bold("target")
    );
    Ok(())
}
