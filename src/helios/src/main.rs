//! Helios: influencer campaign attribution.
//!
//! Command-line front end: loads the campaign tables, applies the selection
//! given on the command line, and prints the requested view.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use helios_core::config::AppConfig;
use helios_core::error::HeliosError;
use helios_core::selection::{DateRange, FilterSelection};
use helios_core::types::Dataset;
use helios_loader::{CsvDirectorySource, DatasetCache};
use helios_reporting::{export, AttributionPipeline, PipelineOutput};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "helios")]
#[command(about = "Spend, attributed revenue and incremental ROAS for influencer campaigns")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./helios.toml when present)
    #[arg(long, env = "HELIOS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the campaign CSV files (overrides config)
    #[arg(long, env = "HELIOS__DATA__DIR")]
    data_dir: Option<PathBuf>,

    /// Platform to include; repeat for several (default: all)
    #[arg(long = "platform")]
    platforms: Vec<String>,

    /// Persona to include; repeat for several (default: all)
    #[arg(long = "persona")]
    personas: Vec<String>,

    /// First day of the window, inclusive (default: earliest event)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the window, inclusive (default: latest event)
    #[arg(long)]
    end: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Available platforms, personas and date bounds
    Options,
    /// Top-line KPIs
    Summary,
    /// Rankings, persona and platform groupings, revenue over time
    Insights,
    /// Full per-influencer performance table
    Explore,
    /// Write the performance table as CSV
    Export {
        /// Output path; `-` for stdout (default: configured file name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct OptionsView {
    platforms: Vec<String>,
    personas: Vec<String>,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct SummaryView<'a> {
    kpis: &'a helios_reporting::KpiSet,
    display: helios_reporting::summary::FormattedKpis,
    baseline: &'a helios_reporting::BaselineEstimate,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct InsightsView<'a> {
    rankings: &'a helios_reporting::Rankings,
    persona_performance: &'a [helios_reporting::PersonaPerformance],
    platform_breakdown: &'a [helios_reporting::PlatformBreakdown],
    revenue_by_date: &'a [helios_reporting::RevenuePoint],
    warnings: Vec<String>,
}

/// Build the selection from flags, falling back to "everything" for any
/// dimension left unset.
fn build_selection(cli: &Cli, dataset: &Dataset) -> Result<FilterSelection, HeliosError> {
    let platforms = if cli.platforms.is_empty() {
        dataset.platforms()
    } else {
        cli.platforms.clone()
    };
    let personas = if cli.personas.is_empty() {
        dataset.personas()
    } else {
        cli.personas.clone()
    };
    let bounds = dataset.tracking_date_bounds();
    let start = cli.start.or(bounds.map(|(min, _)| min));
    let end = cli.end.or(bounds.map(|(_, max)| max));
    let (Some(start), Some(end)) = (start, end) else {
        return Err(HeliosError::InvalidSelection(
            "no tracking events to derive a date range from; pass --start and --end".into(),
        ));
    };
    Ok(FilterSelection::new(
        platforms,
        personas,
        DateRange::new(start, end)?,
    ))
}

/// A config file named on the command line must load. Without one, an
/// unreadable default file or environment falls back to built-in defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(Some(path))
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AppConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        })),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

fn warning_messages(output: &PipelineOutput) -> Vec<String> {
    output.warnings.iter().map(ToString::to_string).collect()
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helios=info,helios_loader=info,helios_reporting=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(dir) = &cli.data_dir {
        config.data.dir = dir.clone();
    }

    info!(
        data_dir = %config.data.dir.display(),
        campaign_source = %config.attribution.campaign_source,
        "Configuration loaded"
    );

    let cache = DatasetCache::new(
        CsvDirectorySource::new(&config.data),
        config.cache.staleness(),
    );
    let dataset = cache.load().map_err(|e| {
        error!(error = %e, "Campaign data unavailable");
        e
    })?;

    if let Command::Options = cli.command {
        let bounds = dataset.tracking_date_bounds();
        return print_json(&OptionsView {
            platforms: dataset.platforms(),
            personas: dataset.personas(),
            first_date: bounds.map(|(min, _)| min),
            last_date: bounds.map(|(_, max)| max),
        });
    }

    let selection = match build_selection(&cli, &dataset) {
        Ok(selection) => selection,
        Err(e @ HeliosError::InvalidSelection(_)) => {
            warn!(error = %e, "Selection rejected");
            eprintln!("Please select a valid date range (start and end date): {e}");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    let pipeline = AttributionPipeline::from_config(&config);
    let output = pipeline.run(&dataset, &selection);
    for warning in &output.warnings {
        eprintln!("warning: {warning}");
    }

    match cli.command {
        Command::Options => Ok(()),
        Command::Summary => print_json(&SummaryView {
            kpis: &output.kpis,
            display: output.kpis.formatted(),
            baseline: &output.baseline,
            warnings: warning_messages(&output),
        }),
        Command::Insights => print_json(&InsightsView {
            rankings: &output.rankings,
            persona_performance: &output.persona_performance,
            platform_breakdown: &output.platform_breakdown,
            revenue_by_date: &output.revenue_by_date,
            warnings: warning_messages(&output),
        }),
        Command::Explore => print_json(&output.performance),
        Command::Export { output: target } => {
            let target = target.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            if target.as_os_str() == "-" {
                export::write_csv(&output.performance, std::io::stdout().lock())?;
            } else {
                let file = std::fs::File::create(&target)
                    .with_context(|| format!("creating {}", target.display()))?;
                export::write_csv(&output.performance, std::io::BufWriter::new(file))?;
                info!(
                    path = %target.display(),
                    rows = output.performance.len(),
                    "Performance table exported"
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_core::types::{Influencer, InfluencerId, TrackingEvent};

    fn dataset() -> Dataset {
        Dataset {
            influencers: vec![Influencer {
                influencer_id: InfluencerId::from("1"),
                name: "Asha".into(),
                platform: "Instagram".into(),
                persona: "Fitness".into(),
            }],
            tracking: vec![
                TrackingEvent {
                    date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                    influencer_id: None,
                    source: "organic".into(),
                    revenue: 10.0,
                },
                TrackingEvent {
                    date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
                    influencer_id: None,
                    source: "organic".into(),
                    revenue: 10.0,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_flags_default_to_everything() {
        let cli = Cli::parse_from(["helios", "summary"]);
        let selection = build_selection(&cli, &dataset()).unwrap();
        assert!(selection.platforms.contains("Instagram"));
        assert_eq!(selection.date_range.total_days(), 20);
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let cli = Cli::parse_from([
            "helios",
            "--start",
            "2025-06-10",
            "--end",
            "2025-06-01",
            "summary",
        ]);
        let err = build_selection(&cli, &dataset()).unwrap_err();
        assert!(matches!(err, HeliosError::InvalidSelection(_)));
    }

    #[test]
    fn test_named_config_must_load() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("helios.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("loading config"));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[attribution\nranking_size = ").unwrap();
        assert!(load_config(Some(&broken)).is_err());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[attribution]\nranking_size = 3\n").unwrap();
        assert_eq!(load_config(Some(&good)).unwrap().attribution.ranking_size, 3);
    }

    #[test]
    fn test_explicit_filters() {
        let cli = Cli::parse_from([
            "helios",
            "--platform",
            "YouTube",
            "--persona",
            "Nutrition",
            "--start",
            "2025-06-05",
            "export",
            "-o",
            "-",
        ]);
        let selection = build_selection(&cli, &dataset()).unwrap();
        assert_eq!(selection.platforms.len(), 1);
        assert!(selection.personas.contains("Nutrition"));
        assert_eq!(selection.date_range.total_days(), 16);
    }
}
