//! Terminal styling for the challenge CLI

/// ANSI color codes
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

pub use colors::*;

pub fn style_bold(s: &str) -> String {
    format!("{}{}{}", BOLD, s, RESET)
}

pub fn style_dim(s: &str) -> String {
    format!("{}{}{}", DIM, s, RESET)
}

pub fn style_green(s: &str) -> String {
    format!("{}{}{}", GREEN, s, RESET)
}

pub fn style_cyan(s: &str) -> String {
    format!("{}{}{}", CYAN, s, RESET)
}

pub fn icon_success() -> String {
    format!("{}✓{}", GREEN, RESET)
}

pub fn icon_error() -> String {
    format!("{}✗{}", RED, RESET)
}

pub fn icon_warning() -> String {
    format!("{}⚠{}", YELLOW, RESET)
}

pub fn icon_arrow() -> String {
    format!("{}→{}", CYAN, RESET)
}

pub fn icon_bullet() -> String {
    format!("{}•{}", GRAY, RESET)
}

/// Medal for the podium places, blank otherwise
pub fn medal(rank: usize) -> &'static str {
    match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "",
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", icon_success(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}{}{}", icon_error(), RED, msg, RESET);
}

pub fn print_warning(msg: &str) {
    println!("{} {}{}{}", icon_warning(), YELLOW, msg, RESET);
}

pub fn print_step(step: u32, total: u32, msg: &str) {
    println!(
        "{} {}{}/{}{} {}",
        icon_arrow(),
        CYAN,
        step,
        total,
        RESET,
        msg
    );
}

/// Bold title followed by a rule padded to 50 columns
pub fn print_header(title: &str) {
    println!();
    println!(
        "{}{} {} {}{}",
        BOLD,
        CYAN,
        title,
        "─".repeat(50usize.saturating_sub(title.chars().count())),
        RESET
    );
    println!();
}

pub fn print_section(title: &str) {
    println!();
    println!("  {}{}{}", BOLD, title, RESET);
    println!("  {}", style_dim(&"─".repeat(40)));
}

pub fn print_key_value(key: &str, value: &str) {
    println!("  {}{}:{} {}", GRAY, key, RESET, value);
}

pub fn print_key_value_colored(key: &str, value: &str, color: &str) {
    println!("  {}{}:{} {}{}{}", GRAY, key, RESET, color, value, RESET);
}

/// Boxed message; widths are measured in characters
pub fn print_box(title: &str, content: &[&str]) {
    let max_len = content
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.chars().count());
    let width = max_len + 4;

    println!("  {}╭{}╮{}", GRAY, "─".repeat(width), RESET);
    println!(
        "  {}│{} {}{}{} {}{}│{}",
        GRAY,
        RESET,
        BOLD,
        title,
        RESET,
        " ".repeat(width - title.chars().count() - 1),
        GRAY,
        RESET
    );
    println!("  {}├{}┤{}", GRAY, "─".repeat(width), RESET);

    for line in content {
        println!(
            "  {}│{} {} {}{}│{}",
            GRAY,
            RESET,
            line,
            " ".repeat(width - line.chars().count() - 2),
            GRAY,
            RESET
        );
    }

    println!("  {}╰{}╯{}", GRAY, "─".repeat(width), RESET);
}
