//! Tasktree CLI - inspect and validate YAML task trees

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use tasktree::ast::{load_task_file, InputConfig, TaskDef, TaskTreeBuilder};
use tasktree::config::TaskTreeConfig;
use tasktree::error::{FixSuggestion, TaskTreeError};
use tasktree::step::{Step, StepLoaderRegistry};

#[derive(Parser)]
#[command(name = "tasktree")]
#[command(about = "Tasktree - load and inspect YAML task definitions")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/tasktree/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a task file and report what it defines
    Validate {
        /// Path to the task YAML file
        file: PathBuf,

        /// Read the file as a plain name → body task map
        #[arg(long)]
        dynamic: bool,
    },

    /// Print the resolved task tree
    Tree {
        /// Path to the task YAML file
        file: PathBuf,

        /// Read the file as a plain name → body task map
        #[arg(long)]
        dynamic: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List step loaders in trial order
    Loaders,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    // Logs go to stderr so `tree --format json` stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = build_registry(cli.config.as_deref()).and_then(|registry| match cli.command {
        Commands::Validate { file, dynamic } => validate_tasks(&file, dynamic, &registry),
        Commands::Tree {
            file,
            dynamic,
            format,
        } => print_tree(&file, dynamic, format, &registry),
        Commands::Loaders => {
            list_loaders(&registry);
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn build_registry(config_path: Option<&Path>) -> Result<StepLoaderRegistry, TaskTreeError> {
    let config = match config_path {
        Some(path) => TaskTreeConfig::load_from(path)?,
        None => TaskTreeConfig::load()?,
    };
    StepLoaderRegistry::from_config(&config.with_env()?)
}

/// Resolve `file` into one root task
///
/// Dynamic maps have no root node of their own, so one named after the file
/// is created to hold the top-level tasks.
fn load_root(
    file: &Path,
    dynamic: bool,
    registry: &StepLoaderRegistry,
) -> Result<TaskDef, TaskTreeError> {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tasks".to_string());

    if dynamic {
        let tasks = TaskTreeBuilder::new(registry).build_from_file(file)?;
        Ok(TaskDef {
            name: stem,
            tasks,
            ..Default::default()
        })
    } else {
        Ok(load_task_file(file, registry)?.or_named(stem))
    }
}

fn validate_tasks(
    file: &Path,
    dynamic: bool,
    registry: &StepLoaderRegistry,
) -> Result<(), TaskTreeError> {
    let root = load_root(file, dynamic, registry)?;
    let task_count = if dynamic {
        root.task_count() - 1
    } else {
        root.task_count()
    };

    println!("{} Task file '{}' is valid", "✓".green(), file.display());
    println!("  Format: {}", if dynamic { "dynamic" } else { "versioned" });
    println!("  Tasks: {}", task_count);
    println!("  Steps: {}", root.step_count());

    Ok(())
}

fn print_tree(
    file: &Path,
    dynamic: bool,
    format: OutputFormat,
    registry: &StepLoaderRegistry,
) -> Result<(), TaskTreeError> {
    let root = load_root(file, dynamic, registry)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&TaskSummary::from(&root))
                .map_err(std::io::Error::from)?;
            println!("{}", json);
        }
        OutputFormat::Text => print_task(&root, 0),
    }
    Ok(())
}

fn list_loaders(registry: &StepLoaderRegistry) {
    if registry.is_empty() {
        println!("{} No step loaders enabled", "!".yellow());
        return;
    }
    println!("Step loaders (trial order):");
    for (i, name) in registry.loader_names().iter().enumerate() {
        println!("  {}. {}", i + 1, name.cyan());
    }
}

// ============================================================================
// TEXT OUTPUT
// ============================================================================

fn print_task(task: &TaskDef, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if task.is_composite() {
        task.name.bold().to_string()
    } else {
        task.name.cyan().to_string()
    };

    let mut line = format!("{}{}", indent, name);
    for input in &task.inputs {
        line.push(' ');
        line.push_str(&input_label(input).dimmed().to_string());
    }
    if !task.description.is_empty() {
        line.push_str(&format!("  # {}", task.description).dimmed().to_string());
    }
    println!("{}", line);

    for step in &task.steps {
        print_step(step.as_ref(), depth + 1);
    }
    for child in &task.tasks {
        print_task(child, depth + 1);
    }
}

fn print_step(step: &dyn Step, depth: usize) {
    println!(
        "{}{} {} [{}]",
        "  ".repeat(depth),
        "→".dimmed(),
        step.name(),
        step.kind().yellow()
    );
    for nested in step.steps() {
        print_step(nested.as_ref(), depth + 1);
    }
}

/// `<target>` for positional inputs, `[--verbose]` for named ones
fn input_label(input: &InputConfig) -> String {
    let dots = if input.remainings { "..." } else { "" };
    if input.is_positional() {
        format!("<{}{}>", input.name, dots)
    } else {
        format!("[--{}{}]", input.name, dots)
    }
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

#[derive(Serialize)]
struct TaskSummary<'a> {
    name: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    inputs: &'a [InputConfig],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: Vec<StepSummary<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tasks: Vec<TaskSummary<'a>>,
}

impl<'a> From<&'a TaskDef> for TaskSummary<'a> {
    fn from(task: &'a TaskDef) -> Self {
        TaskSummary {
            name: &task.name,
            kind: if task.is_composite() { "composite" } else { "leaf" },
            description: Some(task.description.as_str()).filter(|d| !d.is_empty()),
            inputs: &task.inputs,
            steps: task.steps.iter().map(|s| StepSummary::from(s.as_ref())).collect(),
            tasks: task.tasks.iter().map(TaskSummary::from).collect(),
        }
    }
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

#[derive(Serialize)]
struct StepSummary<'a> {
    name: &'a str,
    kind: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: Vec<StepSummary<'a>>,
}

impl<'a> From<&'a dyn Step> for StepSummary<'a> {
    fn from(step: &'a dyn Step) -> Self {
        StepSummary {
            name: step.name(),
            kind: step.kind(),
            steps: step.steps().iter().map(|s| StepSummary::from(s.as_ref())).collect(),
        }
    }
}
