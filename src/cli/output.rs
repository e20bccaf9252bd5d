//! Output formatting for CLI

use crate::training::{MatchReport, TrainingReport};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Count with its share of `total` as a percentage
pub fn count_with_rate(count: usize, rate: f64) -> String {
    format!("{} ({:.1}%)", format_number(count), rate * 100.0)
}

pub fn print_training_report(report: &TrainingReport) {
    print_kv("Episodes", &format_number(report.episodes));
    print_kv("Wins", &count_with_rate(report.wins, report.win_rate()));
    print_kv("Draws", &count_with_rate(report.draws, report.draw_rate()));
    print_kv("Losses", &count_with_rate(report.losses, report.loss_rate()));
    if report.abandoned > 0 {
        print_kv("Abandoned", &format_number(report.abandoned));
    }
    print_kv("Table entries", &format_number(report.table_size));
}

pub fn print_match_report(report: &MatchReport, x_name: &str, o_name: &str) {
    print_kv("Games", &format_number(report.games));
    print_kv(
        &format!("X wins ({x_name})"),
        &count_with_rate(report.x_wins, report.x_win_rate()),
    );
    print_kv(
        &format!("O wins ({o_name})"),
        &count_with_rate(report.o_wins, report.o_win_rate()),
    );
    print_kv("Draws", &count_with_rate(report.draws, report.draw_rate()));
    if report.abandoned > 0 {
        print_kv("Abandoned", &format_number(report.abandoned));
    }
    print_kv("Distinct finals", &format_number(report.distinct_finals));
}
