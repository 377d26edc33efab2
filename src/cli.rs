//! The command line interface for the simulation.
use crate::analysis::{RecommendationTarget, analyze_policy, compare_scenarios, recommend};
use crate::input::check_non_negative;
use crate::log;
use crate::model::Model;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir};
use crate::policy::{PolicyKind, list_policies};
use crate::settings::Settings;
use crate::simulation::PolicySimulator;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Options for the recommend command
#[derive(Args)]
pub struct RecommendOpts {
    /// The outcome to optimise for
    #[arg(short, long, value_enum, default_value_t = RecommendationTarget::Overall)]
    pub target: RecommendationTarget,
    /// Maximum annual government cost of a recommended policy
    #[arg(short, long)]
    pub budget: Option<f64>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the scenarios of a model and save the results.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example models.
    Example {
        /// The available subcommands for managing example models.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Recommend policies for a model's parameters.
    Recommend {
        /// The path to the model directory.
        model_dir: PathBuf,
        /// Other recommendation options
        #[command(flatten)]
        opts: RecommendOpts,
    },
    /// Simulate every scenario of a model and compare their results.
    Compare {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Compare a policy with the baseline for a model's parameters.
    Analyze {
        /// The path to the model directory.
        model_dir: PathBuf,
        /// The type of policy to analyse (e.g. `fuel_tax`), with default parameter values
        policy_type: PolicyKind,
    },
    /// List the available policies and their parameters.
    Policies,
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Recommend { model_dir, opts } => {
                handle_recommend_command(&model_dir, &opts, None)
            }
            Self::Compare { model_dir } => handle_compare_command(&model_dir, None),
            Self::Analyze {
                model_dir,
                policy_type,
            } => handle_analyze_command(&model_dir, policy_type, None),
            Self::Policies => handle_policies_command(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start PolicySim
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ policysim --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(model_path)?;
        &pathbuf
    };

    // Either the command-line flag or the setting allows overwriting
    let allow_overwrite = opts.overwrite || settings.overwrite;
    let overwrite = create_output_directory(output_path, allow_overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    // Initialise program logger
    log::init(Some(settings.log_level.as_str()), Some(output_path))
        .context("Failed to initialise logging.")?;

    // Load the model to run
    let model = Model::from_path(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    // Run the simulation
    crate::simulation::run(&model, output_path)?;
    write_metadata(output_path, &model).context("Failed to save metadata.")?;
    info!("Simulation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    // Load/validate the model
    Model::from_path(model_path).context("Failed to validate model.")?;
    info!("Model validation successful!");

    Ok(())
}

/// Handle the `recommend` command.
pub fn handle_recommend_command(
    model_path: &Path,
    opts: &RecommendOpts,
    settings: Option<Settings>,
) -> Result<()> {
    check_budget(opts.budget)?;
    let settings = load_settings(settings)?;
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    let model = Model::from_path(model_path).context("Failed to load model.")?;
    let simulator = PolicySimulator::new(model.parameters)?;
    let recommendations = recommend(&simulator, opts.target, opts.budget)?;

    info!(
        "Baseline overall score: {:.1}",
        recommendations.baseline_score
    );
    if recommendations.recommendations.is_empty() {
        warn!("No policies are within the budget");
        return Ok(());
    }

    let symbol = simulator.parameters().context.info().currency_symbol;
    info!("Top policies for target '{}':", recommendations.target);
    for (rank, option) in recommendations.recommendations.iter().enumerate() {
        info!(
            "{}. {} (score {:.1}, {:.0} kg CO2/day, {symbol}{:.2}/trip, \
            government cost {symbol}{:.0}/year, equity {:.3})",
            rank + 1,
            option.name,
            option.overall_score,
            option.emissions,
            option.user_cost,
            option.government_cost,
            option.equity
        );
    }

    Ok(())
}

/// Check that a budget given on the command line is a finite, non-negative amount
fn check_budget(budget: Option<f64>) -> Result<()> {
    if let Some(budget) = budget {
        check_non_negative(budget).with_context(|| format!("Invalid budget: {budget}"))?;
    }

    Ok(())
}

/// Handle the `compare` command.
pub fn handle_compare_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    let model = Model::from_path(model_path).context("Failed to load model.")?;
    let simulator = PolicySimulator::new(model.parameters)?;
    let comparison = compare_scenarios(&simulator, model.scenarios.values())?;

    let symbol = simulator.parameters().context.info().currency_symbol;
    for summary in comparison.scenarios.iter() {
        info!(
            "{}: score {:.1}, {:.0} kg CO2/day, {symbol}{:.2}/trip, equity {:.3}, {:.1} min/trip",
            summary.name,
            summary.overall_score,
            summary.emissions,
            summary.user_cost,
            summary.equity_score,
            summary.travel_time
        );
    }

    let best = comparison
        .best
        .context("Cannot compare a model with no scenarios.")?;
    for (metric, scenario) in best.iter() {
        info!("Best for {metric}: {scenario}");
    }

    Ok(())
}

/// Handle the `analyze` command.
pub fn handle_analyze_command(
    model_path: &Path,
    policy_type: PolicyKind,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    let model = Model::from_path(model_path).context("Failed to load model.")?;
    let simulator = PolicySimulator::new(model.parameters)?;
    let analysis = analyze_policy(&simulator, &policy_type.default_policy())?;

    info!(
        "Overall score: {:.1} -> {:.1} ({:+.1})",
        analysis.baseline.overall_score,
        analysis.with_policy.overall_score,
        analysis.improvement.score_change
    );
    info!(
        "Emissions: {:+.2}%, user cost per trip: {:+.2}%",
        analysis.improvement.emissions_change_percent, analysis.improvement.cost_change_percent
    );

    Ok(())
}

/// Describe every available policy and the range of each of its parameters
fn describe_policies() -> String {
    list_policies()
        .map(|policy| {
            let kind = policy.kind();
            let parameters = kind
                .parameter_definitions()
                .iter()
                .map(|def| {
                    format!(
                        "  * {} ({}): {} to {}, default {}",
                        def.name, def.unit, def.min, def.max, def.default
                    )
                })
                .join("\n");
            format!(
                "{kind}: {} [{}]\n  {}\n{parameters}\n",
                kind.name(),
                kind.category(),
                kind.description()
            )
        })
        .join("\n")
}

/// Handle the `policies` command.
pub fn handle_policies_command() -> Result<()> {
    print!("{}", describe_policies());

    Ok(())
}
