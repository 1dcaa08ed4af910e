//! Leaderboard command - ranked participants by best score

use crate::print_banner;
use crate::style::*;
use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use weekly_challenge::{Competition, LeaderboardEntry, ScoringStrategy};

pub fn run(competition: &Competition, top: Option<usize>, json: bool) -> Result<()> {
    let strategy = competition.strategy();
    let view = competition.leaderboard();
    let board = &view.leaderboard;
    let entries = match top {
        Some(n) => board.top(n),
        None => board.entries(),
    };

    if json {
        let payload = serde_json::json!({
            "metric": strategy,
            "entries": entries,
            "top_scorer": board.top_scorer(),
            "summary": board.summary(),
            "notice": view.notice,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print_banner();
    print_header(&format!("Leaderboard - {}", competition.info().name));

    if let Some(notice) = &view.notice {
        print_warning(notice);
        println!();
    }

    if board.is_empty() {
        println!("  {} No submissions yet. Be the first!", icon_arrow());
        println!();
        return Ok(());
    }

    if let Some(leader) = board.top_scorer() {
        println!(
            "  {} Top scorer: {} with {}",
            medal(1),
            style_bold(&leader.name),
            style_green(&strategy.format_score(leader.best_score))
        );
        println!();
    }

    println!("{}", render_table(entries, strategy));

    let summary = board.summary();
    println!();
    print_key_value("Participants", &summary.participants.to_string());
    print_key_value("Submissions", &summary.submissions.to_string());
    if let Some(median) = summary.median_best_score {
        print_key_value("Median best score", &strategy.format_score(median));
    }
    println!();

    Ok(())
}

fn render_table(entries: &[LeaderboardEntry], strategy: ScoringStrategy) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Rank").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new(strategy.label()).add_attribute(Attribute::Bold),
            Cell::new("Entries").add_attribute(Attribute::Bold),
            Cell::new("Last submission").add_attribute(Attribute::Bold),
        ]);

    for entry in entries {
        let podium = entry.rank <= 3;
        let rank = format!("{} {}", entry.rank, medal(entry.rank));
        let mut score = Cell::new(strategy.format_score(entry.best_score));
        let mut name = Cell::new(&entry.name);
        if podium {
            score = score.fg(Color::Green).add_attribute(Attribute::Bold);
            name = name.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(rank.trim_end()),
            name,
            score,
            Cell::new(entry.entries),
            Cell::new(entry.latest_submitted_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    table
}
