use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use workloadrs::config::{AppConfig, CONFIG_KEYS};
use workloadrs::error::ErrorSeverity;
use workloadrs::export::{self, ExportFormat};
use workloadrs::features::build_features;
use workloadrs::logging::{init_logging, LogLevel};
use workloadrs::report::{recent_table, CoachReport, ExpectedRiskPredictor, RECENT_WINDOW_DAYS};
use workloadrs::simulator::{parse_start_date, SimulationParams};
use workloadrs::squad::{simulate_squad, SquadConfig};
use workloadrs::{InjuryDataset, MlCsvExporter, WorkloadError, WorkloadSimulator};

/// WorkloadRS - Synthetic Training Load and Injury Data
///
/// Simulates an athlete's daily practice, gym and match load with a dependent
/// injury outcome, producing labelled data for injury-risk classifiers.
#[derive(Parser)]
#[command(name = "workloadrs")]
#[command(version)]
#[command(about = "Synthetic training-load and injury dataset generator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Simulation parameters shared by the commands that generate data
#[derive(clap::Args, Debug, Clone)]
struct SimulationArgs {
    /// Player name
    #[arg(short, long)]
    player: Option<String>,

    /// First simulated day (YYYY-MM-DD or MM-DD-YYYY)
    #[arg(short, long)]
    start: Option<String>,

    /// Number of days to simulate
    #[arg(short = 'd', long, allow_hyphen_values = true)]
    days: Option<i64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a player and write the full table
    Generate {
        #[command(flatten)]
        sim: SimulationArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (csv, json); inferred from the extension if omitted
        #[arg(short = 'f', long)]
        format: Option<String>,
    },

    /// Write the classifier feature columns, label and split
    Features {
        #[command(flatten)]
        sim: SimulationArgs,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the coach's report for the latest simulated day
    Report {
        #[command(flatten)]
        sim: SimulationArgs,

        /// Report on a previously generated CSV instead of simulating
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of recent days to tabulate
        #[arg(short, long, default_value_t = RECENT_WINDOW_DAYS)]
        recent: usize,
    },

    /// Print summary statistics of a simulation
    Summary {
        #[command(flatten)]
        sim: SimulationArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Simulate several players in parallel
    Squad {
        /// Comma-separated player names
        #[arg(short, long, value_delimiter = ',', required = true)]
        players: Vec<String>,

        /// First simulated day (YYYY-MM-DD or MM-DD-YYYY)
        #[arg(short, long)]
        start: Option<String>,

        /// Number of days to simulate
        #[arg(short = 'd', long, allow_hyphen_values = true)]
        days: Option<i64>,

        /// Seed of the first player
        #[arg(long)]
        seed: Option<u64>,

        /// Directory to write one CSV per player
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

fn main() {
    if let Err(err) = run() {
        match err.downcast_ref::<WorkloadError>() {
            Some(workload_err) => {
                match workload_err.severity() {
                    ErrorSeverity::Error => tracing::error!("{}", workload_err),
                    ErrorSeverity::Warning => tracing::warn!("{}", workload_err),
                }
                eprintln!("{} {}", "error:".red().bold(), workload_err.user_message());
            }
            None => eprintln!("{} {:#}", "error:".red().bold(), err),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // `config` may be creating the file named by --config
    let mut config = match (&cli.command, cli.config.as_deref()) {
        (Commands::Config { .. }, Some(path)) if !path.exists() => AppConfig::default(),
        (_, path) => AppConfig::load_or_default(path)?,
    };
    config.logging.level = LogLevel::from_verbosity(config.logging.level, cli.verbose);
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Generate {
            sim,
            output,
            format,
        } => {
            let format = resolve_format(format.as_deref(), &output)?;
            let dataset = simulate_one(&config, &sim)?;

            export::export_dataset(&dataset, &output, format)
                .map_err(WorkloadError::from)?;

            println!("{}", "✓ Dataset generated".green().bold());
            println!("  Player:      {}", dataset.player);
            println!("  Days:        {}", dataset.len());
            println!("  Injuries:    {}", dataset.injury_count());
            println!("  Output:      {}", output.display());
            println!("  Fingerprint: {}", dataset.fingerprint()?.dimmed());
        }

        Commands::Features { sim, output } => {
            let dataset = simulate_one(&config, &sim)?;
            let balance = build_features(&dataset).class_balance();

            MlCsvExporter::with_split(config.export.clone())
                .export_with_features(&dataset, &output)
                .map_err(WorkloadError::from)?;

            println!("{}", "✓ Feature table written".green().bold());
            println!("  Rows:      {}", dataset.len());
            println!(
                "  Positives: {} ({:.2}%)",
                balance.positive,
                balance.positive_rate() * 100.0
            );
            println!("  Output:    {}", output.display());
        }

        Commands::Report { sim, input, recent } => {
            let dataset = match input {
                Some(path) => export::csv::import_dataset_csv(&path, config.simulation.seed)
                    .map_err(WorkloadError::from)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => simulate_one(&config, &sim)?,
            };

            let predictor = ExpectedRiskPredictor::from_dataset(config.risk.clone(), &dataset);
            let report = CoachReport::from_latest(&dataset, &predictor)
                .ok_or(WorkloadError::Export(export::ExportError::EmptyDataset))?;

            print_report(&report);
            println!("{}", recent_table(&dataset, recent));
        }

        Commands::Summary { sim, json } => {
            let dataset = simulate_one(&config, &sim)?;
            let summary = dataset.summary();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", format!("Summary: {}", summary.player).cyan().bold());
                if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
                    println!("  Period:        {} to {}", first, last);
                }
                println!("  Days:          {}", summary.days);
                println!("  Active days:   {}", summary.active_days);
                println!("  Match days:    {}", summary.match_days);
                println!("  Rest days:     {}", summary.rest_days);
                println!(
                    "  Injuries:      {} ({:.2}%)",
                    summary.injuries,
                    summary.injury_rate * 100.0
                );
                println!("  Mean workload: {:.2}", summary.mean_workload);
                println!("  Mean ACWR:     {:.2}", summary.mean_acwr);
                println!("  Max ACWR:      {:.2}", summary.max_acwr);
                println!("  Mean fatigue:  {:.2}", summary.mean_fatigue);
                println!("  Fatigue p75:   {:.2}", summary.fatigue_p75);
            }
        }

        Commands::Squad {
            players,
            start,
            days,
            seed,
            output_dir,
        } => {
            let squad_config = SquadConfig {
                start_date: match start {
                    Some(s) => parse_start_date(&s)?,
                    None => config.simulation.start_date,
                },
                horizon_days: days.unwrap_or(config.simulation.horizon_days),
                base_seed: seed.unwrap_or(config.simulation.seed),
                risk_model: config.risk.clone(),
                show_progress: true,
            };

            let (datasets, summary) = simulate_squad(&players, &squad_config)?;

            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory: {}", output_dir.display())
            })?;
            for dataset in &datasets {
                let path = output_dir.join(format!("{}.csv", file_stem(&dataset.player)));
                export::export_dataset(dataset, &path, ExportFormat::Csv)
                    .map_err(WorkloadError::from)?;
            }

            println!("{}", "✓ Squad simulated".green().bold());
            println!("{}", summary.to_string_pretty());
            println!("  Output: {}", output_dir.display());
        }

        Commands::Config { list, set, get } => {
            let config_path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            if list {
                println!("{}", format!("Configuration ({})", config_path.display()).bold());
                for key in CONFIG_KEYS {
                    println!("  {} = {}", key, config.get_value(key)?);
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .with_context(|| format!("Expected key=value, got '{}'", key_value))?;
                config.set_value(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                println!("{}", config.get_value(&key)?);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Merge command-line overrides over configured defaults and run the simulator
fn simulate_one(config: &AppConfig, sim: &SimulationArgs) -> Result<InjuryDataset> {
    let defaults = &config.simulation;
    let params = SimulationParams::new(
        sim.player.clone().unwrap_or_else(|| defaults.player.clone()),
        match &sim.start {
            Some(s) => parse_start_date(s)?,
            None => defaults.start_date,
        },
        sim.days.unwrap_or(defaults.horizon_days),
        sim.seed.unwrap_or(defaults.seed),
    );

    let dataset = WorkloadSimulator::new(params)?
        .with_risk_model(config.risk.clone())?
        .run();
    Ok(dataset)
}

fn resolve_format(format: Option<&str>, output: &Path) -> Result<ExportFormat> {
    let format = match format {
        Some(f) => f.parse().map_err(WorkloadError::from)?,
        None => ExportFormat::from_path(output).unwrap_or(ExportFormat::Csv),
    };
    Ok(format)
}

fn file_stem(player: &str) -> String {
    player
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn print_report(report: &CoachReport) {
    let title = format!("COACH'S DAILY REPORT: {} ({})", report.player, report.date);
    println!("{}", title.bold());
    println!("{}", "-".repeat(40));

    let status = report.status.to_string();
    let status = if report.requires_action() {
        status.red().bold()
    } else {
        status.green()
    };
    println!("Current Status:     {}", status);
    println!("Injury Risk Score:  {:.2}%", report.risk_probability * 100.0);
    println!("Fatigue Level:      {:.2}", report.fatigue);
    println!("ACWR:               {:.2}", report.acwr);
    println!("{}", "-".repeat(40));

    if report.requires_action() {
        println!("{}", report.action.message().red().bold());
    } else {
        println!("{}", report.action.message().green());
    }
    println!("{}", "-".repeat(40));
}
