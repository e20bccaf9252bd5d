//! Analyze command - Compare saved policies against exact play

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    analysis::{AnalysisReport, analyze},
    cli::{
        config::load_policy_table,
        output::{format_number, print_kv, print_section, print_subsection},
    },
    solver::Minimax,
    tictactoe::Board,
};

#[derive(Parser, Debug)]
#[command(about = "Compare saved Q-learning policies against minimax")]
pub struct AnalyzeArgs {
    /// Policy snapshot files to analyze
    #[arg(required = true)]
    pub policies: Vec<PathBuf>,

    /// Print up to N mismatched states with their boards
    #[arg(long, default_value_t = 0)]
    pub show_mismatches: usize,

    /// Export the full report as JSON (single policy only)
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Export per-state verdicts as CSV (single policy only)
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    if args.policies.len() > 1 && (args.json.is_some() || args.csv.is_some()) {
        bail!("--json and --csv need exactly one policy file");
    }

    let mut solver = Minimax::deterministic();
    for path in &args.policies {
        let table = match load_policy_table(path) {
            Ok(table) => table,
            Err(e) => {
                log::error!("{e:#}");
                continue;
            }
        };

        let report = analyze(&table, &mut solver);
        print_section(&format!("Policy: {}", path.display()));
        print_report(&report);
        print_mismatches(&report, args.show_mismatches);

        if let Some(json) = &args.json {
            report
                .write_json(json)
                .with_context(|| format!("Failed to write {}", json.display()))?;
            println!("\nReport exported to: {}", json.display());
        }
        if let Some(csv) = &args.csv {
            report
                .write_csv(csv)
                .with_context(|| format!("Failed to write {}", csv.display()))?;
            println!("Verdicts exported to: {}", csv.display());
        }
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    print_kv("Loaded entries", &format_number(report.loaded));
    print_kv("Skipped", &format_number(report.skipped));
    print_kv("States compared", &format_number(report.total));
    print_kv("Matches", &format_number(report.matches));
    print_kv("Mismatches", &format_number(report.mismatches));
    print_kv("Match rate", &format!("{:.2}%", report.match_rate() * 100.0));
    if report.mismatches > 0 {
        print_kv("Avg signed delta", &format!("{:.4}", report.avg_signed_delta));
        print_kv("Avg abs delta", &format!("{:.4}", report.avg_abs_delta));
    }
}

fn print_mismatches(report: &AnalysisReport, limit: usize) {
    if limit == 0 || report.mismatches == 0 {
        return;
    }
    print_subsection("Mismatched states");
    for verdict in report.mismatched().take(limit) {
        let optimal: Vec<String> = verdict.optimal_moves.iter().map(|mv| mv.to_string()).collect();
        println!(
            "\nState {} ({} to move): table plays {}, optimal {} (delta {:+.2})",
            verdict.state,
            verdict.mover,
            verdict.table_move,
            optimal.join(" "),
            verdict.delta
        );
        if let Ok(board) = Board::decode(&verdict.state) {
            println!("{board}");
        }
    }
}
