//! Validate command - check a prediction file without storing it

use crate::print_banner;
use crate::style::*;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use weekly_challenge::Competition;

pub fn run(competition: &Competition, file: &Path) -> Result<()> {
    print_banner();
    print_header("Submission Check");

    let blob = std::fs::read(file).with_context(|| format!("File not found: {}", file.display()))?;
    let info = competition.info();

    print_key_value("File", &file.display().to_string());
    print_key_value("Size", &format!("{} bytes", blob.len()));
    print_key_value("Expected rows", &info.required_length.to_string());
    println!();

    print_step(1, 2, "Checking columns, row count and labels...");
    let evaluation = competition.evaluate(&blob);

    print_step(2, 2, "Summarizing...");
    println!();
    match evaluation {
        Ok(eval) => {
            print_success(&format!(
                "{} predictions look good. Ready to submit!",
                eval.predictions.len()
            ));
            println!();
            Ok(())
        }
        Err(e) => {
            print_box("Validation failed", &[e.to_string().as_str()]);
            println!();
            Err(anyhow!("{} is not a valid submission", file.display()))
        }
    }
}
