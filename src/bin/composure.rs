use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use composure::client::http::HttpOrchestrator;
use composure::client::{ComposeRequest, ConfirmRequest, Orchestrator, RemoteStatus};
use composure::config::{Settings, load_settings};
use composure::export::{load_alternatives, to_json};
use composure::graph::render::to_flow;
use composure::graph::{layout, to_graph, validate_layout_config};
use composure::lifecycle::trigger::{RecompositionTrigger, TriggerType};
use composure::model::validate;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings YAML file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Orchestrator base URL (overrides settings)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a blueprint file for malformed tasks and dependencies
    Validate {
        file: PathBuf,
    },

    /// Lay out a blueprint and print the positioned graph as JSON
    Layout {
        file: PathBuf,

        /// Which alternative to lay out when the file holds a set
        #[arg(long, short, default_value_t = 0)]
        alternative: usize,
    },

    /// Print a blueprint as pretty JSON
    Export {
        file: PathBuf,

        #[arg(long, short, default_value_t = 0)]
        alternative: usize,
    },

    /// Check that the orchestrator is reachable
    Health,

    /// Generate blueprints for natural-language requirements
    Compose {
        requirements: String,

        /// Constraints as a JSON object
        #[arg(long)]
        constraints: Option<String>,
    },

    /// Show the orchestrator's status for a composition
    Status {
        composition_id: String,
    },

    /// Confirm one alternative of a composition for deployment
    Confirm {
        composition_id: String,

        /// Blueprint (or alternatives set) that compose returned
        #[arg(long, short)]
        file: PathBuf,

        #[arg(long, short, default_value_t = 0)]
        alternative: usize,

        /// Deployment context as a JSON object
        #[arg(long)]
        context: Option<String>,

        #[arg(long, default_value = "")]
        requirements: String,
    },

    /// Ask for a replacement of a degrading deployed composition
    Recompose {
        composition_id: String,

        #[arg(long)]
        analysis: String,

        /// Failure evidence as a JSON object
        #[arg(long)]
        evidence: Option<String>,

        #[arg(long, value_enum, default_value_t = Trigger::PerformanceDegradation)]
        trigger: Trigger,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Trigger {
    PerformanceDegradation,
    ServiceFailure,
    Manual,
}

impl From<Trigger> for TriggerType {
    fn from(t: Trigger) -> Self {
        match t {
            Trigger::PerformanceDegradation => TriggerType::PerformanceDegradation,
            Trigger::ServiceFailure => TriggerType::ServiceFailure,
            Trigger::Manual => TriggerType::Manual,
        }
    }
}

fn parse_json_object(raw: Option<&str>, what: &str) -> Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(s) => match serde_json::from_str(s)? {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!("{} must be a JSON object", what)),
        },
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    if let Some(url) = cli.url {
        settings.orchestrator.base_url = url;
    }

    match cli.command {
        Commands::Validate { file } => {
            let set = load_alternatives(&file)?;
            let mut valid = true;
            for (i, blueprint) in set.alternatives.iter().enumerate() {
                let report = validate(blueprint);
                if report.is_valid() {
                    info!(alternative = i, tasks = blueprint.tasks.len(), "Blueprint is valid");
                } else {
                    valid = false;
                    for violation in &report.violations {
                        warn!(alternative = i, "{}", violation);
                    }
                }
            }
            if !valid {
                return Err(anyhow!("{} contains invalid blueprints", file.display()));
            }
        }

        Commands::Layout { file, alternative } => {
            let set = load_alternatives(&file)?;
            let blueprint = set
                .get(alternative)
                .ok_or_else(|| anyhow!("Alternative {} not found in {}", alternative, file.display()))?;

            validate_layout_config(&settings.layout);
            let (nodes, edges) = to_graph(blueprint);
            let positioned = layout(&nodes, &edges, &settings.layout);
            print_json(&to_flow(&positioned, &edges))?;
        }

        Commands::Export { file, alternative } => {
            let set = load_alternatives(&file)?;
            let blueprint = set
                .get(alternative)
                .ok_or_else(|| anyhow!("Alternative {} not found in {}", alternative, file.display()))?;
            println!("{}", to_json(blueprint)?);
        }

        Commands::Health => {
            let client = HttpOrchestrator::new(&settings.orchestrator)?;
            let health = client.health().await?;
            info!(url = client.base_url(), status = %health.status, "Orchestrator reachable");
            print_json(&health)?;
        }

        Commands::Compose { requirements, constraints } => {
            if requirements.trim().is_empty() {
                return Err(composure::StateError::EmptyRequirements.into());
            }
            let client = HttpOrchestrator::new(&settings.orchestrator)?;
            let request = ComposeRequest {
                requirements,
                constraints: parse_json_object(constraints.as_deref(), "constraints")?,
            };
            let response = client.compose(&request).await?;
            info!(
                composition_id = response.composition_id.as_deref().unwrap_or("<none>"),
                alternatives = response.blueprints.len(),
                "Composition generated"
            );
            print_json(&response)?;
        }

        Commands::Status { composition_id } => {
            let client = HttpOrchestrator::new(&settings.orchestrator)?;
            match client.status(&composition_id).await? {
                RemoteStatus::Found(status) => print_json(&status)?,
                RemoteStatus::NotFound => println!("{}: not_found", composition_id),
            }
        }

        Commands::Confirm { composition_id, file, alternative, context, requirements } => {
            let set = load_alternatives(&file)?;
            let blueprint = set
                .get(alternative)
                .cloned()
                .ok_or_else(|| anyhow!("Alternative {} not found in {}", alternative, file.display()))?;
            validate(&blueprint).into_result()?;

            let client = HttpOrchestrator::new(&settings.orchestrator)?;
            let request = ConfirmRequest {
                confirmed_blueprint: blueprint,
                deployment_context: Value::Object(parse_json_object(context.as_deref(), "context")?),
                original_requirements: requirements,
                selected_alternative: alternative,
                confirmed_at: chrono::Utc::now(),
            };
            let response = client.confirm(&composition_id, &request).await?;
            info!(composition_id = %response.composition_id, status = %response.status, "Composition confirmed");
            print_json(&response)?;
        }

        Commands::Recompose { composition_id, analysis, evidence, trigger } => {
            let client = HttpOrchestrator::new(&settings.orchestrator)?;
            let trigger = RecompositionTrigger::new(
                &composition_id,
                trigger.into(),
                Value::Object(parse_json_object(evidence.as_deref(), "evidence")?),
                &analysis,
            );
            let response = client.recompose(&trigger).await?;
            info!(
                original = %composition_id,
                new_composition_id = %response.new_composition_id,
                "Recomposition requested"
            );
            print_json(&response)?;
        }
    }

    Ok(())
}
