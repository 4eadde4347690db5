use std::{error::Error, fs, path::Path, process::ExitCode};

use anstream::{eprintln, println};
use clap::Parser as _;
use indexmap::IndexMap;
use metamod_model::{ParameterTypeId, StaticRegistry};
use metamod_project::{GenerateMode, ProjectState};
use owo_colors::OwoColorize as _;

use crate::command::{CliCommand, Commands};

mod command;

fn main() -> ExitCode {
    env_logger::init();
    let cli = CliCommand::parse();

    let result = match cli.command {
        Commands::Status { root, types } => run_status(&root, types.as_deref()),
        Commands::Rescan { root, types, prune } => run_rescan(&root, types.as_deref(), prune),
        Commands::Generate {
            root,
            types,
            fail_fast,
        } => run_generate(&root, types.as_deref(), fail_fast),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{} {message}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run_status(root: &Path, types: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let registry = load_registry(types)?;
    let state = ProjectState::open(root, &registry)?;

    for (path, record) in state.files() {
        let total = record.parameters().len();
        let filled = record
            .parameters()
            .values()
            .filter(|parameter| parameter.is_complete())
            .count();

        if record.is_complete() {
            println!("{} {} ({filled}/{total})", path.display(), "complete".green());
        } else {
            println!(
                "{} {} ({filled}/{total})",
                path.display(),
                "incomplete".yellow()
            );
        }

        for (key, parameter) in record.parameters() {
            match (parameter.value(), parameter.unit()) {
                (Some(value), Some(unit)) => {
                    println!("  {key} = {value} {unit}");
                }
                _ => println!("  {key} {}", "unset".red()),
            }
        }
    }

    for missing in state.missing_files() {
        println!("{} {}", missing.display(), "missing on disk".red());
    }

    if state.is_complete() {
        println!("{}", "project complete".green().bold());
    } else {
        println!("{}", "project incomplete".yellow().bold());
    }

    Ok(())
}

fn run_rescan(root: &Path, types: Option<&Path>, prune: bool) -> Result<(), Box<dyn Error>> {
    let registry = load_registry(types)?;
    let mut state = ProjectState::open(root, &registry)?;
    let report = state.rescan_all(&registry)?;

    for path in &report.new_files {
        println!("{} {}", path.display(), "registered".green());
    }

    for (path, summary) in &report.rescanned {
        if summary.added.is_empty() && summary.dropped.is_empty() {
            continue;
        }
        println!(
            "{}: {} carried, {} added, {} dropped",
            path.display(),
            summary.carried,
            summary.added.len(),
            summary.dropped.len()
        );
        for key in &summary.added {
            println!("  {} {key}", "+".green());
        }
        for key in &summary.dropped {
            println!("  {} {key}", "-".red());
        }
    }

    if prune {
        let pruned = state.prune_missing();
        for path in &pruned {
            println!("{} {}", path.display(), "pruned".red());
        }
        if !pruned.is_empty() {
            state.persist()?;
        }
    } else {
        for missing in state.missing_files() {
            println!(
                "{} {} (rerun with --prune to drop it)",
                missing.display(),
                "missing on disk".red()
            );
        }
    }

    println!(
        "{} file(s) tracked, {} new",
        state.files().len(),
        report.new_files.len()
    );

    Ok(())
}

fn run_generate(root: &Path, types: Option<&Path>, fail_fast: bool) -> Result<(), Box<dyn Error>> {
    let registry = load_registry(types)?;
    let state = ProjectState::open(root, &registry)?;

    let mode = if fail_fast {
        GenerateMode::FailFast
    } else {
        GenerateMode::ContinueOnError
    };

    let report = state.generate_all(mode)?;

    for path in &report.written {
        println!("{} {}", path.display(), "written".green());
    }
    for failure in &report.failures {
        println!("{} {failure}", "failed:".red());
    }

    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} file(s) failed to generate", report.failures.len()).into())
    }
}

fn load_registry(types: Option<&Path>) -> Result<StaticRegistry, Box<dyn Error>> {
    let Some(path) = types else {
        return Ok(StaticRegistry::new());
    };

    let text = fs::read_to_string(path)?;
    let bindings: IndexMap<String, String> = serde_json::from_str(&text)?;

    let mut registry = StaticRegistry::new();
    for (name, id) in bindings {
        registry.insert(name, ParameterTypeId::new(id));
    }

    Ok(registry)
}
