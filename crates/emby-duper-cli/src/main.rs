mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use emby_duper_core::analysis::PlanStatus;
use emby_duper_core::catalog::Catalog;
use emby_duper_core::executor::{execute_api_deletions, script::describe_collisions, write_script};
use emby_duper_core::report::{format_size, write_report};
use emby_duper_core::{AppConfig, EmbyClient, ScanEngine, ScanResult};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();
    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    let config = match emby_duper_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let outcome = match command {
        Commands::TestConnection => run_test_connection(&config),
        Commands::Libraries => run_libraries(&config),
        Commands::Scan { report } => run_scan(&config, report),
        Commands::Script { output } => run_script(&config, &output),
        Commands::Delete { yes } => run_delete(&config, yes),
        Commands::PrintConfig => run_print_config(&config),
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn build_engine(config: &AppConfig) -> Result<ScanEngine<EmbyClient>> {
    let client = EmbyClient::new(config).context("building HTTP client")?;
    Ok(ScanEngine::new(client)
        .with_policy(config.keep_policy)
        .with_library_filter(config.libraries.clone()))
}

fn scan(engine: &ScanEngine<EmbyClient>) -> Result<ScanResult> {
    let reporter = CliReporter::new();
    let result = engine.scan(&reporter).context("scanning libraries")?;
    print_summary(&result);
    Ok(result)
}

fn run_test_connection(config: &AppConfig) -> Result<()> {
    let client = EmbyClient::new(config)?;
    let info = client
        .system_info()
        .with_context(|| format!("connecting to {}", config.server_url))?;
    println!(
        "{} connected to {} (Emby {})",
        "✓".green(),
        info.server_name.cyan(),
        info.version
    );
    Ok(())
}

fn run_libraries(config: &AppConfig) -> Result<()> {
    let client = EmbyClient::new(config)?;
    let libraries = client.libraries()?;
    if libraries.is_empty() {
        warn!("No libraries found on {}", config.server_url);
    }
    for library in libraries {
        println!(
            "  {} {} ({})",
            library.id.dimmed(),
            library.name.bold(),
            library.kind
        );
    }
    Ok(())
}

fn run_scan(config: &AppConfig, report: bool) -> Result<()> {
    let engine = build_engine(config)?;
    let result = scan(&engine)?;
    if report {
        let path = write_report(&result, &config.server_url, Path::new(&config.report_dir))
            .context("writing report")?;
        println!("Report written to {}", path.display().to_string().cyan());
    }
    Ok(())
}

fn run_script(config: &AppConfig, output: &Path) -> Result<()> {
    let engine = build_engine(config)?;
    let result = scan(&engine)?;
    let header = format!(
        "Duplicate removal script for {}\nReview before running. Unsafe groups are listed as comments only.",
        config.server_url
    );
    let commands = write_script(result.plans(), &header, output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "{} removal commands written to {}",
        commands.to_string().red(),
        output.display().to_string().cyan()
    );
    Ok(())
}

fn run_delete(config: &AppConfig, yes: bool) -> Result<()> {
    let engine = build_engine(config)?;
    let result = scan(&engine)?;
    let summary = result.summary();

    if summary.candidates == 0 {
        info!("Nothing to delete");
        return Ok(());
    }

    if !yes {
        let prompt = format!(
            "Delete {} items ({}) from {}? This cannot be undone.",
            summary.candidates,
            format_size(summary.reclaimable_bytes),
            config.server_url
        );
        if !prompt_confirm(&prompt, Some(false))? {
            info!("Aborted, nothing deleted");
            return Ok(());
        }
    }

    let reporter = CliReporter::new();
    let (deleted, failed) = execute_api_deletions(engine.catalog(), result.plans(), &reporter);
    println!(
        "{} deleted, {} failed",
        deleted.to_string().green(),
        failed.to_string().red()
    );
    if failed > 0 {
        anyhow::bail!("{} deletions failed, see log for details", failed);
    }
    Ok(())
}

fn run_print_config(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(&config.redacted()).context("rendering configuration")?;
    println!("{}", rendered);
    Ok(())
}

fn print_summary(result: &ScanResult) {
    for plan in result.plans() {
        if let PlanStatus::Unsafe(collisions) = plan.status() {
            println!(
                "{} {} keep {}: {}",
                "UNSAFE".red().bold(),
                plan.key(),
                plan.keep().path,
                describe_collisions(collisions)
            );
        }
    }

    let summary = result.summary();
    info!("{}", scan_log_line(result));
    println!();
    println!(
        "Scan: {}, {} records",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        result.total_records()
    );
    println!(
        "{} duplicate groups ({} safe, {} unsafe), {} removal candidates, {} reclaimable",
        summary.duplicate_groups.to_string().red(),
        summary.safe_groups.to_string().green(),
        summary.unsafe_groups.to_string().yellow(),
        summary.candidates.to_string().red(),
        format_size(summary.reclaimable_bytes).red()
    );
    for name in &result.failed_libraries {
        warn!("Library '{}' could not be fetched and was not scanned", name);
    }
}

/// Uncoloured summary for the log file.
fn scan_log_line(result: &ScanResult) -> String {
    let summary = result.summary();
    format!(
        "Scan finished in {:.2}s: {} records, {} duplicate groups ({} safe, {} unsafe), {} removal candidates, {} reclaimable",
        result.scan_duration.as_secs_f64(),
        result.total_records(),
        summary.duplicate_groups,
        summary.safe_groups,
        summary.unsafe_groups,
        summary.candidates,
        format_size(summary.reclaimable_bytes),
    )
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
