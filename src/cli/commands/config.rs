//! `mpt config` command - Configuration management
//!
//! Reads and edits the workspace (`.mpt/config.yaml`) and global config files.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::VALID_KEYS;
use crate::core::i18n::Locale;
use crate::core::{Config, Workspace};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Show only workspace-level config
    #[arg(long = "workspace-only", conflicts_with = "global_only")]
    pub workspace_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `mpt config keys`)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only workspace config path
    #[arg(long = "workspace-only", conflicts_with = "global_only")]
    pub workspace_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path(args) => run_path(args, global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::locate(global.workspace.as_deref()).ok();
    let config = Config::load(workspace.as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match config.get(key) {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    if args.workspace_only {
        return show_file("Workspace config:", &workspace_config_path(global)?);
    }
    if args.global_only {
        return show_file("Global config:", &global_config_path()?);
    }

    if global.format == OutputFormat::Json {
        let values: serde_json::Map<String, serde_json::Value> = VALID_KEYS
            .iter()
            .map(|(key, _)| {
                let value = config
                    .get(key)
                    .map(serde_json::Value::String)
                    .unwrap_or(serde_json::Value::Null);
                (key.to_string(), value)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values).into_diagnostic()?);
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        match config.get(key) {
            Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
            None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (MPT_LOCALE, MPT_FORMAT)");
    println!("  2. Workspace config (.mpt/config.yaml)");
    println!("  3. Global config (~/.config/mpt/config.yaml)");
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let value = parse_value(&args.key, &args.value)?;

    let config_path = if args.global {
        global_config_path()?
    } else {
        workspace_config_path(global)?
    };

    let mut config_map = read_mapping(&config_path)?;
    config_map.insert(serde_yml::Value::String(args.key.clone()), value);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "workspace" };
        println!(
            "{} Set {} {} {} in {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            style("→").dim(),
            style(&args.value).yellow(),
            scope
        );
    }
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let config_path = if args.global {
        global_config_path()?
    } else {
        workspace_config_path(global)?
    };

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    if config_map
        .remove(&serde_yml::Value::String(args.key.clone()))
        .is_none()
    {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "workspace" };
        println!(
            "{} Removed {} from {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            scope
        );
    }
    Ok(())
}

fn run_path(args: PathArgs, global: &GlobalOpts) -> Result<()> {
    if args.workspace_only {
        println!("{}", workspace_config_path(global)?.display());
        return Ok(());
    }
    if args.global_only {
        println!("{}", global_config_path()?.display());
        return Ok(());
    }

    let global_path = global_config_path()?;
    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    println!("          {}", existence(&global_path));

    println!();
    match workspace_config_path(global) {
        Ok(path) => {
            println!("  {} {}", style("Workspace:").cyan(), path.display());
            println!("          {}", existence(&path));
        }
        Err(_) => println!(
            "  {} {}",
            style("Workspace:").cyan(),
            style("(not in an MPT workspace)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<22} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style("Use 'mpt config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn workspace_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    let workspace =
        Workspace::locate(global.workspace.as_deref()).map_err(|e| miette::miette!("{}", e))?;
    Ok(workspace.config_path())
}

fn existence(path: &Path) -> console::StyledObject<&'static str> {
    if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    }
}

fn show_file(title: &str, path: &Path) -> Result<()> {
    println!("{} {}", style(title).bold(), style(path.display()).dim());
    println!();
    if path.exists() {
        print!("{}", fs::read_to_string(path).into_diagnostic()?);
    } else {
        println!("{}", style("(not created)").dim());
    }
    Ok(())
}

/// Existing YAML mapping at `path`, or an empty one
fn read_mapping(path: &Path) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<serde_yml::Value>(&content).into_diagnostic()? {
        serde_yml::Value::Mapping(map) => Ok(map),
        serde_yml::Value::Null => Ok(serde_yml::Mapping::new()),
        _ => Err(miette::miette!(
            "{} does not contain a YAML mapping",
            path.display()
        )),
    }
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            "Unknown config key '{}'. Run 'mpt config keys' for the list",
            key
        ))
    }
}

/// Validate a value for `key` and convert it to its YAML type
fn parse_value(key: &str, value: &str) -> Result<serde_yml::Value> {
    match key {
        "locale" => {
            let locale: Locale = value.parse().map_err(|e| miette::miette!("{}", e))?;
            Ok(serde_yml::Value::String(locale.code().to_string()))
        }
        "default_format" => {
            value
                .parse::<OutputFormat>()
                .map_err(|e| miette::miette!("Invalid format '{}': {}", value, e))?;
            Ok(serde_yml::Value::String(value.to_lowercase()))
        }
        "deadline_window_days" | "deadline_limit" | "notification_limit" => {
            let n: u32 = value
                .parse()
                .map_err(|_| miette::miette!("{} must be a non-negative integer", key))?;
            Ok(serde_yml::Value::Number(n.into()))
        }
        _ => Err(miette::miette!("Unknown config key '{}'", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_types() {
        assert_eq!(
            parse_value("locale", "EN").unwrap(),
            serde_yml::Value::String("en".to_string())
        );
        assert_eq!(
            parse_value("deadline_limit", "3").unwrap(),
            serde_yml::Value::Number(3.into())
        );
        assert!(parse_value("locale", "fr").is_err());
        assert!(parse_value("deadline_window_days", "-1").is_err());
        assert!(parse_value("default_format", "yaml").is_err());
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("notification_limit").is_ok());
        assert!(check_key("author").is_err());
    }

    #[test]
    fn test_read_mapping_round_trip_into_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        assert!(read_mapping(&path).unwrap().is_empty());

        let mut map = read_mapping(&path).unwrap();
        map.insert(
            serde_yml::Value::String("deadline_window_days".to_string()),
            parse_value("deadline_window_days", "14").unwrap(),
        );
        fs::write(&path, serde_yml::to_string(&map).unwrap()).unwrap();

        let config: Config = serde_yml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.deadline_window_days(), 14);
    }
}
