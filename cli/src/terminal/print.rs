use colored::*;

pub const TOTAL_WIDTH: usize = 64;

pub fn header(msg: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let formatted = format!("⟦ {} ⟧", msg);
    let msg_len = formatted.chars().count();

    let dash_count = TOTAL_WIDTH.saturating_sub(msg_len);
    let left = dash_count / 2;
    let right = dash_count - left;

    println!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black()
    );
}

pub fn fat_separator() {
    println!("{}", "═".repeat(TOTAL_WIDTH).bright_black());
}

pub fn centerln(msg: &str) {
    let width = console::measure_text_width(msg);
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(width) / 2);
    println!("{space}{msg}");
}

pub fn tree_head(idx: usize, name: &str) {
    println!(
        "{}{}{} {}",
        "[".bright_black(),
        idx.to_string().cyan(),
        "]".bright_black(),
        name.bright_green()
    );
}

pub fn as_tree_one_level(details: Vec<(String, ColoredString)>) {
    let key_width = details.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);

    for (i, (key, value)) in details.iter().enumerate() {
        let last = i + 1 == details.len();
        let branch = if last { "└─" } else { "├─" };
        let dots = ".".repeat(key_width.saturating_sub(key.chars().count()) + 1);
        println!(
            " {} {}{}{} {}",
            branch.bright_black(),
            key,
            dots.bright_black(),
            ":".bright_black(),
            value
        );
    }
}

pub fn no_results() {
    println!("{}", "no hosts reported".red().bold());
}
