//! Info command - describe the current round

use crate::print_banner;
use crate::style::*;
use anyhow::Result;
use weekly_challenge::Competition;

pub fn run(competition: &Competition) -> Result<()> {
    print_banner();
    let info = competition.info();
    print_header(&format!("Round {}", info.name));

    print_key_value("Metric", info.metric_label.as_str());
    print_key_value(
        "Score range",
        &format!("0 to {}", info.metric.format_score(info.max_score)),
    );
    print_key_value("Required rows", &info.required_length.to_string());
    print_key_value("Columns", &info.columns.join(", "));

    print_section("Datasets");
    match (&info.links.train, &info.links.test) {
        (None, None) => println!("    {} No dataset links published", style_dim("─")),
        (train, test) => {
            if let Some(url) = train {
                println!("    {} Train: {}", icon_bullet(), style_cyan(url));
            }
            if let Some(url) = test {
                println!("    {} Test:  {}", icon_bullet(), style_cyan(url));
            }
        }
    }

    print_section("How to submit");
    println!("    1. Predict one integer label per test row, in test-set order");
    println!(
        "    2. Save a CSV with exactly the columns {} and {} rows",
        style_bold(&info.columns.join(",")),
        info.required_length
    );
    println!("    3. Run {}", style_cyan("challenge validate --file <csv>"));
    println!(
        "    4. Run {}",
        style_cyan("challenge submit --name <you> --file <csv>")
    );
    println!();

    Ok(())
}
