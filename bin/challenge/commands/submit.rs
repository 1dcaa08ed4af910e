//! Submit command - validate, score and store a prediction file

use crate::print_banner;
use crate::style::*;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use weekly_challenge::{Competition, SubmissionError};

pub fn run(competition: &Competition, name: &str, file: &Path) -> Result<()> {
    print_banner();
    print_header("Submit Predictions");

    let blob = std::fs::read(file).with_context(|| format!("File not found: {}", file.display()))?;
    print_key_value("Name", name.trim());
    print_key_value("File", &file.display().to_string());
    println!();

    let strategy = competition.strategy();
    let record = match competition.submit(name, &blob) {
        Ok(record) => record,
        Err(e @ SubmissionError::Store(_)) => {
            return Err(anyhow!(e).context("Your file was valid but could not be saved"));
        }
        Err(e) => {
            print_box("Submission rejected", &[e.to_string().as_str()]);
            println!();
            return Err(anyhow!("Submission rejected"));
        }
    };

    print_success("Submission accepted");
    print_key_value_colored(strategy.label(), &strategy.format_score(record.score), GREEN);
    print_key_value(
        "Submitted at",
        &record.submitted_at.format("%Y-%m-%d %H:%M:%S %:z").to_string(),
    );

    let view = competition.leaderboard();
    if let Some(rank) = view.leaderboard.rank(&record.name) {
        print_key_value(
            "Leaderboard rank",
            &format!("{} of {}", rank, view.leaderboard.len()),
        );
    }
    println!();
    Ok(())
}
