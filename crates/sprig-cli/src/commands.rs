use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use sprig_sdk::{
    split_key, ConfigError, ConfigFile, FileStatus, ReconcileReport, Repository, Signature,
    WorkdirStatus,
};
use tracing::warn;

use crate::cli::*;

const FALLBACK_NAME: &str = "sprig";
const FALLBACK_EMAIL: &str = "sprig@localhost";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot read the current directory")?;
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(args, &cwd, format),
        Command::Add(args) => cmd_add(args, &cwd, format),
        Command::Commit(args) => cmd_commit(args, &cwd, format),
        Command::Status(_) => cmd_status(&cwd, format),
        Command::Log(args) => cmd_log(args, &cwd, format),
        Command::CatFile(args) => cmd_cat_file(args, &cwd, format),
        Command::Config(args) => cmd_config(args, &cwd, format),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(args: InitArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let path = args.path.map_or_else(|| cwd.to_path_buf(), |p| cwd.join(p));
    let repo = Repository::init(&path)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "root": repo.root(),
            "control_dir": repo.control_dir(),
        })),
        OutputFormat::Text => {
            println!(
                "{} Initialized empty sprig repository in {}",
                "✓".green().bold(),
                repo.control_dir().display().to_string().bold()
            );
            Ok(())
        }
    }
}

fn cmd_add(args: AddArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = Repository::discover(cwd)?;
    let report = repo.add(&args.paths, cwd)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "added": report.added,
            "updated": report.updated,
            "refreshed": report.refreshed,
            "removed": report.removed,
        })),
        OutputFormat::Text => {
            print_report(&report);
            Ok(())
        }
    }
}

fn print_report(report: &ReconcileReport) {
    for path in &report.added {
        println!("  {} {}", "staged: ".green(), path);
    }
    for path in &report.updated {
        println!("  {} {}", "updated:".green(), path);
    }
    for path in &report.removed {
        println!("  {} {}", "removed:".red(), path);
    }
    if report.added.is_empty() && report.updated.is_empty() && report.removed.is_empty() {
        println!("{}", "Nothing new to stage.".dimmed());
    }
}

/// Author identity from `user.name` / `user.email`, with a placeholder for
/// whatever is missing.
fn identity(config: &ConfigFile) -> (String, String) {
    let name = config.get("user", "name");
    let email = config.get("user", "email");
    if name.is_none() || email.is_none() {
        warn!("user.name or user.email not configured; using a placeholder identity");
    }
    (
        name.unwrap_or(FALLBACK_NAME).to_string(),
        email.unwrap_or(FALLBACK_EMAIL).to_string(),
    )
}

fn cmd_commit(args: CommitArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = Repository::discover(cwd)?;
    let (name, email) = identity(&repo.config()?);
    let outcome = repo.commit(&args.message, Signature::now(name, email))?;
    match format {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            let label = if outcome.parent.is_none() {
                format!("root-commit {}", outcome.id.short_hex())
            } else {
                outcome.id.short_hex()
            };
            println!("[{}] {}", label.yellow(), outcome.summary);
            let noun = if outcome.changes == 1 { "file" } else { "files" };
            println!(" {} {noun} changed", outcome.changes);
            Ok(())
        }
    }
}

fn cmd_status(cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = Repository::discover(cwd)?;
    let status = repo.status()?;
    match format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Text => {
            print_status(&status);
            Ok(())
        }
    }
}

fn print_status(status: &WorkdirStatus) {
    if status.is_clean() {
        println!("nothing to commit, working tree clean");
        return;
    }

    if !status.staged.is_empty() {
        println!("Changes to be committed:");
        for entry in &status.staged {
            let label = match entry.status {
                FileStatus::New => "new file:",
                FileStatus::Modified => "modified:",
                FileStatus::Deleted => "deleted:",
            };
            println!("\t{}", format!("{label:<12}{}", entry.path).green());
        }
        println!();
    }

    if !status.modified.is_empty() || !status.deleted.is_empty() {
        println!("Changes not staged for commit:");
        for path in &status.modified {
            println!("\t{}", format!("{:<12}{path}", "modified:").red());
        }
        for path in &status.deleted {
            println!("\t{}", format!("{:<12}{path}", "deleted:").red());
        }
        println!();
    }

    if !status.untracked.is_empty() {
        println!("Untracked files:");
        for path in &status.untracked {
            println!("\t{}", path.red());
        }
        println!();
    }
}

fn format_date(sig: &Signature) -> String {
    sig.datetime()
        .map(|d| d.format("%a %b %e %H:%M:%S %Y %z").to_string())
        .unwrap_or_else(|| format!("{} {}", sig.timestamp, sig.timezone))
}

fn cmd_log(args: LogArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = Repository::discover(cwd)?;
    let log = repo.log(args.limit)?;
    if format == OutputFormat::Json {
        return print_json(&log);
    }
    if log.is_empty() {
        println!("{}", "No commits yet.".dimmed());
    }
    for entry in &log {
        let author = &entry.commit.author;
        println!("{}", format!("commit {}", entry.id).yellow());
        println!("Author: {} <{}>", author.name, author.email);
        println!("Date:   {}", format_date(author));
        println!();
        for line in entry.commit.message.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}

fn cmd_cat_file(args: CatFileArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = Repository::discover(cwd)?;
    let object = repo.cat_object(&args.hash)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "id": object.id,
            "kind": object.kind,
            "size": object.data.len(),
            "content": object.text(),
        })),
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&object.data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// What a `config` invocation produced.
#[derive(Debug, PartialEq, Eq)]
enum ConfigReply {
    /// `--list`: every `section.key` / value pair.
    Listing(Vec<(String, String)>),
    /// Values of a single key.
    Values(Vec<String>),
    /// The file was edited and must be saved.
    Updated,
}

fn apply_config(config: &mut ConfigFile, args: &ConfigArgs) -> anyhow::Result<ConfigReply> {
    if args.list {
        return Ok(ConfigReply::Listing(config.entries()));
    }
    let Some(full) = args.key.as_deref() else {
        bail!("missing key; expected section.name");
    };
    let (section, key) = split_key(full)?;
    let value = args.value.as_deref();
    let required = || value.with_context(|| format!("missing value for {full}"));

    if args.get_all {
        let values = config.get_all(section, key);
        if values.is_empty() {
            bail!(ConfigError::KeyNotFound { key: full.to_string() });
        }
        return Ok(ConfigReply::Values(values.into_iter().map(String::from).collect()));
    }
    if args.add {
        config.add(section, key, required()?);
        return Ok(ConfigReply::Updated);
    }
    if args.replace_all {
        config.replace_all(section, key, required()?);
        return Ok(ConfigReply::Updated);
    }
    if args.unset {
        config.unset(section, key)?;
        return Ok(ConfigReply::Updated);
    }
    if args.unset_all {
        config.unset_all(section, key)?;
        return Ok(ConfigReply::Updated);
    }

    match value {
        None => {
            let value = config
                .get(section, key)
                .ok_or_else(|| ConfigError::KeyNotFound { key: full.to_string() })?;
            Ok(ConfigReply::Values(vec![value.to_string()]))
        }
        Some(value) => match config.set(section, key, value) {
            Ok(_) => Ok(ConfigReply::Updated),
            Err(ConfigError::KeyNotFound { .. }) => {
                config.add(section, key, value);
                Ok(ConfigReply::Updated)
            }
            Err(e) => Err(e.into()),
        },
    }
}

fn cmd_config(args: ConfigArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = Repository::discover(cwd)?;
    let mut config = repo.config()?;
    match apply_config(&mut config, &args)? {
        ConfigReply::Updated => repo.save_config(&config)?,
        ConfigReply::Listing(entries) => match format {
            OutputFormat::Json => {
                let pairs: Vec<_> = entries
                    .iter()
                    .map(|(k, v)| serde_json::json!({ "key": k, "value": v }))
                    .collect();
                print_json(&pairs)?;
            }
            OutputFormat::Text => {
                for (key, value) in entries {
                    println!("{key}={value}");
                }
            }
        },
        ConfigReply::Values(values) => match format {
            OutputFormat::Json => print_json(&values)?,
            OutputFormat::Text => {
                for value in values {
                    println!("{value}");
                }
            }
        },
    }
    Ok(())
}
