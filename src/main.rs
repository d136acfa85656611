//! CLI entry point for hypr-bind-engine
//!
//! Provides command-line interface for listing and checking keybindings,
//! replaying scripted input through the engine, and watching a config
//! for changes.

use clap::{Parser, Subcommand};
use colored::*;
use hypr_bind_engine::config::{ConfigManager, FileWatcher};
use hypr_bind_engine::core::format_mod_mask;
use hypr_bind_engine::core::validator::validate_binding;
use hypr_bind_engine::engine::KeybindEngine;
use hypr_bind_engine::replay::{parse_script, ConsoleHost, Record, Replay, ReplayLog};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hypr-bind-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine decisions (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all keybindings
    List {
        /// Path to Hyprland config file
        #[arg(short, long, default_value = "~/.config/hypr/hyprland.conf")]
        config: PathBuf,

        /// Print bindings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check bindings for unknown handlers and unresolvable keys
    Check {
        /// Path to Hyprland config file
        #[arg(short, long, default_value = "~/.config/hypr/hyprland.conf")]
        config: PathBuf,
    },

    /// Feed a scripted event sequence through the engine
    Replay {
        /// Path to Hyprland config file
        #[arg(short, long, default_value = "~/.config/hypr/hyprland.conf")]
        config: PathBuf,

        /// Replay script, one step per line
        #[arg(short, long)]
        script: PathBuf,

        /// Print records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Reload the bindings whenever the config changes
    Watch {
        /// Path to Hyprland config file
        #[arg(short, long, default_value = "~/.config/hypr/hyprland.conf")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List { config, json } => list_keybindings(config, json)?,
        Commands::Check { config } => check_bindings(config)?,
        Commands::Replay { config, script, json } => replay_script(config, script, json)?,
        Commands::Watch { config } => watch_config(config)?,
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays clean
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// List all keybindings in the config
fn list_keybindings(config_path: PathBuf, json: bool) -> anyhow::Result<()> {
    let manager = ConfigManager::new(config_path)?;
    let loaded = manager.load()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&loaded.bindings)?);
        return Ok(());
    }

    println!("{}", format!("Keybindings from: {}\n", manager.path().display()).bold());

    let total = loaded.bindings.len();
    let mut submap = String::new();

    for binding in &loaded.bindings {
        if binding.submap != submap {
            submap = binding.submap.clone();
            let title = if submap.is_empty() { "default" } else { submap.as_str() };
            println!("\n{}", format!("[{}]", title).magenta().bold());
        }

        let mods = format_mod_mask(binding.modmask);
        let combo = if mods.is_empty() {
            binding.key.to_string()
        } else {
            format!("{} + {}", mods, binding.key)
        };

        println!(
            "{} {} → {} {}",
            format!("bind{:<3}", binding.flags.letters()).dimmed(),
            combo.cyan().bold(),
            binding.handler.green(),
            binding.arg
        );
    }

    println!("\n{} Total: {} bindings", "✓".green(), total);

    Ok(())
}

/// Report bindings that can never work as written
fn check_bindings(config_path: PathBuf) -> anyhow::Result<()> {
    let manager = ConfigManager::new(config_path)?;
    println!("{} Parsing config: {}", "→".cyan(), manager.path().display());

    let loaded = manager.load()?;
    println!("{} Found {} keybindings\n", "✓".green(), loaded.bindings.len());

    let issues: Vec<_> = loaded
        .bindings
        .iter()
        .filter_map(|binding| validate_binding(binding).err().map(|e| (binding, e)))
        .collect();

    if issues.is_empty() {
        println!("{} {}", "✓".green().bold(), "No problems found!".bold());
        return Ok(());
    }

    println!(
        "{} Found {} problem{}:\n",
        "✗".red().bold(),
        issues.len(),
        if issues.len() == 1 { "" } else { "s" }
    );

    for (i, (binding, issue)) in issues.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), binding.to_string().cyan());
        println!("     {}", issue.to_string().yellow());
    }

    std::process::exit(1);
}

/// Run a replay script and print what the engine did
fn replay_script(config_path: PathBuf, script_path: PathBuf, json: bool) -> anyhow::Result<()> {
    let loaded = ConfigManager::new(config_path)?.load()?;

    let content = fs::read_to_string(&script_path)
        .map_err(|e| anyhow::anyhow!("Failed to read script {}: {}", script_path.display(), e))?;
    let script = parse_script(&content)?;

    let records = Replay::new(loaded).run(&script)?;

    for (i, record) in records.iter().enumerate() {
        if json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            if i > 0 && matches!(record, Record::Step { .. }) {
                println!();
            }
            println!("{}", record);
        }
    }

    Ok(())
}

/// Keep an engine loaded and reload it on every config change
fn watch_config(config_path: PathBuf) -> anyhow::Result<()> {
    let manager = ConfigManager::new(config_path)?;
    let loaded = manager.load()?;

    // Collects layout errors the engine reports
    let log = ReplayLog::default();
    let mut host = ConsoleHost::new(log.clone());

    let mut engine = KeybindEngine::with_system_clock(loaded.config);
    engine.reload(loaded.bindings);

    let watcher = FileWatcher::new(manager.path())?;
    println!(
        "{} Watching {} ({} bindings)",
        "→".cyan(),
        manager.path().display(),
        engine.bindings().len()
    );

    loop {
        if !watcher.wait_for_change(Duration::from_millis(500)) {
            continue;
        }

        match manager.load() {
            Ok(loaded) => {
                engine.apply_config(&mut host, loaded.config);
                engine.reload(loaded.bindings);
                println!(
                    "{} Reloaded {} bindings",
                    "✓".green(),
                    engine.bindings().len()
                );

                for record in log.borrow_mut().drain(..) {
                    println!("{}", record);
                }
            }
            Err(e) => {
                warn!("Reload failed: {}", e);
                println!("{} {}", "✗".red(), e.to_string().red());
            }
        }
    }
}
