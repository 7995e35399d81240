//! Command-line parsing for the catastrophe-time fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{Family, RowFilter};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "mtc",
    version,
    about = "Fit waiting-time distributions to microtubule catastrophe times"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` applies otherwise.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit one family by maximum likelihood, optionally with bootstrap intervals.
    Fit(FitArgs),
    /// Fit several families and rank them by AIC.
    Compare(CompareArgs),
    /// Draw synthetic catastrophe times from a family.
    Simulate(SimulateArgs),
    /// Plot a previously exported model JSON.
    Plot(PlotArgs),
}

/// Where the observations come from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// CSV file with catastrophe times.
    #[arg(long, value_name = "PATH")]
    pub csv: PathBuf,

    /// Column holding the times (case-insensitive).
    #[arg(long)]
    pub column: String,

    /// Keep only rows where COL equals VAL (tidy layout).
    #[arg(long = "where", value_name = "COL=VAL", value_parser = parse_row_filter)]
    pub filter: Option<RowFilter>,
}

/// Terminal plot options.
#[derive(Debug, Args, Clone)]
pub struct PlotOpts {
    /// Render an ASCII plot of ECDF vs fitted CDF.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Family to fit.
    #[arg(short = 'f', long, value_enum, default_value_t = Family::TwoStep)]
    pub family: Family,

    /// Number of bootstrap resamples for confidence intervals (off when omitted).
    #[arg(long, value_name = "N")]
    pub bootstrap: Option<usize>,

    /// Confidence level of bootstrap intervals.
    #[arg(long, default_value_t = 0.95)]
    pub confidence: f64,

    /// Seed for bootstrap resampling.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Refit bootstrap replicates in parallel.
    #[arg(long)]
    pub parallel: bool,

    #[command(flatten)]
    pub plot: PlotOpts,

    /// Export the model (params + CDF grid + ECDF) to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,

    /// Export ECDF vs fitted CDF at each observed time to CSV.
    #[arg(long = "export-cdf", value_name = "CSV")]
    pub export_cdf: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Families to compare (comma-separated).
    #[arg(
        long = "families",
        value_enum,
        value_delimiter = ',',
        default_values_t = Family::ALL
    )]
    pub families: Vec<Family>,

    #[command(flatten)]
    pub plot: PlotOpts,

    /// Export the chosen model to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    #[arg(short = 'f', long, value_enum)]
    pub family: Family,

    /// Parameters in family order, comma-separated (e.g. `--params 0.003,0.008`).
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true, allow_hyphen_values = true)]
    pub params: Vec<f64>,

    /// Number of times to draw.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub size: usize,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Header of the written column.
    #[arg(long, default_value = "time")]
    pub column: String,

    /// Write CSV here instead of stdout.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Options for plotting a saved model.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Model JSON file produced by `mtc fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

fn parse_row_filter(s: &str) -> Result<RowFilter, String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COL=VAL, got '{s}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("empty column name in '{s}'"));
    }
    Ok(RowFilter {
        column: column.to_string(),
        value: value.trim().to_string(),
    })
}
