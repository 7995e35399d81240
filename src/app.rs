//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - runs the fit / compare pipeline
//! - prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, CompareArgs, FitArgs, PlotArgs, SimulateArgs};
use crate::domain::{BootstrapConfig, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mtc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(&fit_config_from_args(&args)),
        Command::Compare(args) => handle_fit(&compare_config_from_args(&args)),
        Command::Simulate(args) => handle_simulate(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log to stderr so stdout stays clean for reports and CSV output.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_fit(config: &FitConfig) -> Result<(), AppError> {
    let run = pipeline::run_fit(config)?;

    print!("{}", crate::report::format_sample_summary(&run.ingest));
    if let Some(cmp) = &run.comparison {
        print!("{}", crate::report::format_comparison(cmp));
    }
    print!("{}", crate::report::format_fit(&run.model, Some(run.ks)));
    if let Some(boot) = &run.bootstrap {
        print!("{}", crate::report::format_bootstrap(boot));
    }

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.residuals, &run.model, config.plot_width, config.plot_height);
        println!();
        print!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_cdf {
        crate::io::export::write_cdf_csv(path, &run.residuals, run.model.family)?;
        info!(path = %path.display(), "wrote CDF export");
    }
    if let Some(path) = &config.export_model {
        let file = crate::io::model_file::model_file(&run.model, &run.ingest.column, run.ingest.sample.values());
        crate::io::model_file::write_model_json(path, &file)?;
        info!(path = %path.display(), "wrote model JSON");
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let sample = crate::data::simulate(args.family, &args.params, args.size, args.seed)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
            crate::io::export::write_sample_csv(BufWriter::new(file), &args.column, &sample)?;
            info!(path = %path.display(), n = sample.len(), "wrote simulated sample");
        }
        None => {
            let stdout = std::io::stdout();
            crate::io::export::write_sample_csv(stdout.lock(), &args.column, &sample)?;
        }
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::model_file::read_model_json(&args.model)?;

    print!("{}", crate::report::format_fit(&file.model, None));
    println!();
    print!(
        "{}",
        crate::plot::render_ascii_plot_from_model_file(&file, args.width, args.height)
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let bootstrap = args.bootstrap.map(|n_resamples| BootstrapConfig {
        n_resamples,
        confidence_level: args.confidence,
        seed: args.seed,
        parallel: args.parallel,
    });

    FitConfig {
        csv_path: args.input.csv.clone(),
        column: args.input.column.clone(),
        filter: args.input.filter.clone(),
        families: vec![args.family],
        bootstrap,
        plot: args.plot.plot,
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        export_model: args.export_model.clone(),
        export_cdf: args.export_cdf.clone(),
    }
}

pub fn compare_config_from_args(args: &CompareArgs) -> FitConfig {
    let mut families = args.families.clone();
    families.sort();
    families.dedup();

    FitConfig {
        csv_path: args.input.csv.clone(),
        column: args.input.column.clone(),
        filter: args.input.filter.clone(),
        families,
        bootstrap: None,
        plot: args.plot.plot,
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        export_model: args.export_model.clone(),
        export_cdf: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Family;

    #[test]
    fn bootstrap_only_when_requested() {
        let cli = Cli::try_parse_from(["mtc", "fit", "--csv", "a.csv", "--column", "t"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = fit_config_from_args(&args);
        assert!(config.bootstrap.is_none());
        assert_eq!(config.families, vec![Family::TwoStep]);

        let cli = Cli::try_parse_from([
            "mtc", "fit", "--csv", "a.csv", "--column", "t", "--bootstrap", "200", "--confidence", "0.9",
            "--parallel",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let bcfg = fit_config_from_args(&args).bootstrap.unwrap();
        assert_eq!(bcfg.n_resamples, 200);
        assert_eq!(bcfg.confidence_level, 0.9);
        assert!(bcfg.parallel);
        assert_eq!(bcfg.seed, None);
    }

    #[test]
    fn compare_config_dedups_families() {
        let cli = Cli::try_parse_from([
            "mtc", "compare", "--csv", "a.csv", "--column", "t", "--families", "gamma,exponential,gamma",
        ])
        .unwrap();
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        let config = compare_config_from_args(&args);
        assert_eq!(config.families, vec![Family::Exponential, Family::Gamma]);
    }
}
