use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use cpm_network::render::format_number;
use cpm_network::{
    run_demo, run_from_csv, solve_csv, CalendarSchedule, RankDir, RenderConfig, SolverConfig,
    DEMO_OUTPUT,
};

/// CPM network - critical path scheduling and network diagrams
#[derive(Parser)]
#[command(name = "cpm-network")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an activity table and render its network diagram
    Run {
        /// CSV file with id, description, duration, predecessors columns
        input: PathBuf,

        /// Output file; the suffix selects the format (png, svg, pdf, dot, ...)
        output: PathBuf,

        /// Layout direction: LR or TB
        #[arg(long, default_value = "LR")]
        rankdir: RankDir,

        /// Draw critical activities in the same color as the rest
        #[arg(long)]
        no_highlight: bool,

        /// Font for node labels
        #[arg(long, default_value = "Helvetica")]
        font: String,

        /// Graphviz executable
        #[arg(long, default_value = "dot")]
        dot: String,

        /// Project start date (YYYY-MM-DD) to annotate nodes with dates
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Render the built-in five-activity sample project
    Demo {
        /// Output file; the suffix selects the format (png when absent)
        #[arg(default_value = DEMO_OUTPUT)]
        output: PathBuf,

        /// Project start date (YYYY-MM-DD) to annotate nodes with dates
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Solve an activity table and print the schedule
    Report {
        /// CSV file with id, description, duration, predecessors columns
        input: PathBuf,

        /// Project start date (YYYY-MM-DD) to add calendar dates
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let solver_config = SolverConfig {
        verbosity: cli.verbose,
        ..SolverConfig::default()
    };

    match cli.command {
        Commands::Run {
            input,
            output,
            rankdir,
            no_highlight,
            font,
            dot,
            start_date,
        } => {
            let render_config = RenderConfig {
                rankdir,
                highlight_critical: !no_highlight,
                fontname: font,
                dot_program: dot,
                ..RenderConfig::default()
            };
            let written = run_from_csv(&input, &output, start_date, &solver_config, &render_config)
                .with_context(|| format!("failed to process {}", input.display()))?;
            println!("Saved: {}", written.display());
        }
        Commands::Demo { output, start_date } => {
            let written = run_demo(
                &output,
                start_date,
                &solver_config,
                &RenderConfig::default(),
            )?;
            println!("Demo saved to: {}", written.display());
        }
        Commands::Report { input, start_date } => {
            report(&input, start_date, &solver_config)?;
        }
    }

    Ok(())
}

fn report(input: &Path, start_date: Option<NaiveDate>, config: &SolverConfig) -> Result<()> {
    let schedule =
        solve_csv(input, config).with_context(|| format!("failed to process {}", input.display()))?;
    let calendar = start_date
        .map(|start| CalendarSchedule::anchor(&schedule, start))
        .transpose()?;

    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}  {}",
        "ID", "DUR", "ES", "EF", "LS", "LF", "TF", "DESCRIPTION"
    );
    for activity in schedule.iter_ordered() {
        let t = activity.timing;
        let marker = if activity.critical { "*" } else { " " };
        let dates = calendar
            .as_ref()
            .and_then(|cal| cal.dates(activity.id()))
            .map(|d| format!("  [{} .. {}]", d.early_start, d.early_finish))
            .unwrap_or_default();
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>7}{}  {}{}",
            activity.id(),
            format_number(activity.activity.duration),
            format_number(t.earliest_start),
            format_number(t.earliest_finish),
            format_number(t.latest_start),
            format_number(t.latest_finish),
            format_number(t.total_float),
            marker,
            activity.activity.description,
            dates
        );
    }

    println!();
    println!(
        "Project duration: {}",
        format_number(schedule.project_duration())
    );
    if let Some(cal) = &calendar {
        println!("Project dates: {} .. {}", cal.project_start, cal.project_finish);
    }
    println!("Critical path: {}", schedule.critical_path().join(" -> "));
    Ok(())
}
