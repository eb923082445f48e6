use std::io::Write;

use anyhow::{anyhow, Context};
use colored::Colorize;
use prefs_core::{PreferencesService, StorePreferencesService};
use prefs_store::{StoreBackend, StoreConfig};
use serde_json::Value;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    debug!(?config, "opening preferences store");
    let service = StorePreferencesService::from_config(&config)
        .with_context(|| format!("opening store at {}", config.root.display()))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&service, cli.command, cli.format, &mut out)
}

/// Configuration file first, then `--root` on top of it.
fn resolve_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.backend = StoreBackend::Directory;
        config.root = root.clone();
    }
    Ok(config)
}

fn execute(
    service: &StorePreferencesService,
    command: Command,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Get(args) => cmd_get(service, args, format, out),
        Command::Set(args) => cmd_set(service, args, out),
        Command::Clear(args) => cmd_clear(service, args, out),
        Command::Show(args) => cmd_show(service, args, format, out),
        Command::Delete(args) => cmd_delete(service, args, out),
        Command::Keys => cmd_keys(service, format, out),
    }
}

fn cmd_get(
    service: &StorePreferencesService,
    args: GetArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let prefs = service.get_preferences(&args.key, true)?;
    let value = match prefs.get::<Value>(&args.path)? {
        Some(value) => value,
        None => match &args.default {
            Some(raw) => parse_value(raw, false),
            None => return Err(anyhow!("no value at '{}' in {:?}", args.path, args.key)),
        },
    };
    writeln!(out, "{}", render(&value, format))?;
    Ok(())
}

fn cmd_set(service: &StorePreferencesService, args: SetArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let value = parse_value(&args.value, args.string);
    let prefs = service.get_or_create(&args.key)?;
    prefs.edit().set(&args.path, &value)?.save()?;
    writeln!(out, "{} {}:{} = {}", "✓".green().bold(), args.key.bold(), args.path.yellow(), value)?;
    Ok(())
}

fn cmd_clear(service: &StorePreferencesService, args: ClearArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let prefs = service.get_preferences(&args.key, true)?;
    let mut editor = prefs.edit();
    match &args.path {
        Some(path) => {
            editor.clear(path)?;
        }
        None => {
            editor.clear_all();
        }
    }
    editor.save()?;
    let target = args.path.as_deref().unwrap_or("*");
    writeln!(out, "{} Cleared {}:{}", "✓".green().bold(), args.key.bold(), target.yellow())?;
    Ok(())
}

fn cmd_show(
    service: &StorePreferencesService,
    args: ShowArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let prefs = service.get_preferences(&args.key, true)?;
    match format {
        OutputFormat::Json => writeln!(out, "{}", prefs.to_json_string()?)?,
        OutputFormat::Text => {
            writeln!(out, "{}", args.key.bold())?;
            writeln!(out, "{}", prefs.to_json_pretty()?)?;
        }
    }
    Ok(())
}

fn cmd_delete(service: &StorePreferencesService, args: DeleteArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let store = service.store();
    if !store.contains(&args.key)? {
        writeln!(out, "{} {}", "No preferences stored for".dimmed(), args.key.bold())?;
        return Ok(());
    }
    store.remove(&args.key)?;
    writeln!(out, "{} Deleted {}", "✓".green().bold(), args.key.bold())?;
    Ok(())
}

fn cmd_keys(service: &StorePreferencesService, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let keys = service.store().keys()?;
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&keys)?)?,
        OutputFormat::Text if keys.is_empty() => writeln!(out, "No preferences stored.")?,
        OutputFormat::Text => {
            for key in keys {
                writeln!(out, "{key}")?;
            }
        }
    }
    Ok(())
}

/// Interpret a command-line value as JSON, or as a plain string.
fn parse_value(raw: &str, force_string: bool) -> Value {
    if force_string {
        return Value::String(raw.to_string());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Strings print bare in text mode; everything else prints as JSON.
fn render(value: &Value, format: OutputFormat) -> String {
    match (format, value) {
        (OutputFormat::Text, Value::String(s)) => s.clone(),
        (OutputFormat::Text, other) => other.to_string(),
        (OutputFormat::Json, other) => other.to_string(),
    }
}
