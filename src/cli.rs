use crate::{
    backup::{self, RestoreOutcome},
    config::AppConfig,
    conflict::Conflict,
    game,
    install::{self, InstallOutcome},
    patch,
    prompt::Prompter,
    quarantine::{self, ToggleOutcome},
    registry::Registry,
    repo,
};
use anyhow::{bail, Result};
use serde::Serialize;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

struct GlobalOptions {
    format: OutputFormat,
    game_root: Option<PathBuf>,
}

enum CliCommand {
    Install { source: String },
    Uninstall { name: String },
    Enable { name: String },
    Disable { name: String },
    List,
    RepoList,
    RepoInstall { query: String },
    Patch,
    Unpatch,
    Restore,
    Help,
    Version,
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (global, command) = parse_args(&args)?;
    match command {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            println!("cogwright v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => run_command(command, global),
    }
}

fn parse_args(args: &[String]) -> Result<(GlobalOptions, CliCommand)> {
    let (global, tokens) = parse_global_options(args);

    let Some(head) = tokens.first() else {
        return Ok((global, CliCommand::Help));
    };
    if matches!(head.as_str(), "--help" | "-h" | "help") {
        return Ok((global, CliCommand::Help));
    }
    if matches!(head.as_str(), "--version" | "-V" | "version") {
        return Ok((global, CliCommand::Version));
    }

    let command = match head.as_str() {
        "install" => CliCommand::Install {
            source: required_arg(&tokens, 1, "install requires a zip path or URL")?,
        },
        "uninstall" => CliCommand::Uninstall {
            name: required_name(&tokens, "uninstall requires a mod name")?,
        },
        "enable" => CliCommand::Enable {
            name: required_name(&tokens, "enable requires a mod name")?,
        },
        "disable" => CliCommand::Disable {
            name: required_name(&tokens, "disable requires a mod name")?,
        },
        "list" => CliCommand::List,
        "repo" => match tokens.get(1).map(|value| value.as_str()) {
            None | Some("list") => CliCommand::RepoList,
            Some("install") => CliCommand::RepoInstall {
                query: required_tail(&tokens, 2, "repo install requires a mod or file name")?,
            },
            Some(other) => bail!("Unknown repo command: {other} (use 'list' or 'install')"),
        },
        "patch" => CliCommand::Patch,
        "unpatch" => CliCommand::Unpatch,
        "restore" => CliCommand::Restore,
        other => bail!("Unknown command: {other} (try 'cogwright help')"),
    };
    Ok((global, command))
}

fn required_arg(tokens: &[String], index: usize, message: &str) -> Result<String> {
    match tokens.get(index) {
        Some(value) => Ok(value.clone()),
        None => bail!("{message}"),
    }
}

// Mod names can carry spaces, so everything after the command is the name.
fn required_name(tokens: &[String], message: &str) -> Result<String> {
    required_tail(tokens, 1, message)
}

fn required_tail(tokens: &[String], start: usize, message: &str) -> Result<String> {
    let value = tokens.get(start..).unwrap_or(&[]).join(" ");
    if value.is_empty() {
        bail!("{message}");
    }
    Ok(value)
}

fn parse_global_options(args: &[String]) -> (GlobalOptions, Vec<String>) {
    let mut format = OutputFormat::Text;
    let mut game_root = None;
    let mut tokens = Vec::new();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--format=") {
            if let Some(parsed) = OutputFormat::parse(value) {
                format = parsed;
            }
            continue;
        }
        if arg == "--format" {
            if let Some(value) = iter.next() {
                if let Some(parsed) = OutputFormat::parse(value) {
                    format = parsed;
                }
            }
            continue;
        }
        if let Some(value) = arg.strip_prefix("--game-root=") {
            game_root = Some(PathBuf::from(value));
            continue;
        }
        if arg == "--game-root" {
            if let Some(value) = iter.next() {
                game_root = Some(PathBuf::from(value));
            }
            continue;
        }
        tokens.push(arg.to_string());
    }

    (GlobalOptions { format, game_root }, tokens)
}

fn run_command(command: CliCommand, global: GlobalOptions) -> Result<()> {
    let mut config = AppConfig::load_or_create()?;
    let override_root = global.game_root.filter(|root| *root != config.game_root);
    if let Some(root) = &override_root {
        config.game_root = root.clone();
    }
    let paths = game::resolve_paths(&config.game_root)?;
    // Remember an override only once it validated as a real game dir.
    if override_root.is_some() {
        config.save()?;
    }
    if backup::ensure_backup(&config, &paths)? {
        println!("First run: backed up the game directory.");
    }
    let mut registry = Registry::load_or_default(&config.game_root)?;
    let mut prompter = ConsolePrompter;

    match command {
        CliCommand::Install { source } => {
            let archive_path = resolve_archive_source(&config, &source)?;
            run_install(&config, &mut registry, &archive_path, &mut prompter)
        }
        CliCommand::Uninstall { name } => {
            let report = install::uninstall(&config, &mut registry, &name)?;
            println!("Uninstalled '{}' ({} files removed).", report.name, report.files_removed);
            if report.files_missing > 0 {
                println!("  {} owned file(s) were already gone.", report.files_missing);
            }
            Ok(())
        }
        CliCommand::Enable { name } => {
            match quarantine::enable(&config, &mut registry, &name)? {
                ToggleOutcome::Moved(count) => {
                    println!("Enabled '{name}' ({count} files moved back).");
                }
                _ => println!("'{name}' is already enabled."),
            }
            Ok(())
        }
        CliCommand::Disable { name } => {
            match quarantine::disable(&config, &mut registry, &name)? {
                ToggleOutcome::Moved(count) => {
                    println!("Disabled '{name}' ({count} files quarantined).");
                }
                _ => println!("'{name}' is already disabled."),
            }
            Ok(())
        }
        CliCommand::List => list_installed(&registry, global.format),
        CliCommand::RepoList => list_repository(&config, global.format),
        CliCommand::RepoInstall { query } => {
            let listing = repo::fetch_listing(&config)?;
            let file_name = repo::resolve_file_name(&listing, &query);
            println!("Downloading {file_name}...");
            let archive_path = repo::fetch_repo_archive(&config, &file_name)?;
            run_install(&config, &mut registry, &archive_path, &mut prompter)
        }
        CliCommand::Patch => {
            let written = patch::apply(&paths)?;
            println!("Patch applied ({written} files).");
            Ok(())
        }
        CliCommand::Unpatch => {
            let removed = patch::remove(&paths)?;
            println!("Patch removed ({removed} files).");
            Ok(())
        }
        CliCommand::Restore => {
            match backup::restore(&config, &paths, &mut prompter)? {
                RestoreOutcome::Restored(count) => {
                    println!("Restored {count} files from the backup.");
                }
                RestoreOutcome::DeclinedDrift => println!("Restore cancelled."),
            }
            Ok(())
        }
        CliCommand::Help | CliCommand::Version => Ok(()),
    }
}

fn resolve_archive_source(config: &AppConfig, source: &str) -> Result<PathBuf> {
    if repo::is_http_url(source) {
        println!("Downloading {source}...");
        return repo::fetch_archive_url(config, source);
    }
    let path = PathBuf::from(source);
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }
    Ok(path)
}

fn run_install(
    config: &AppConfig,
    registry: &mut Registry,
    archive_path: &Path,
    prompter: &mut ConsolePrompter,
) -> Result<()> {
    match install::install(config, registry, archive_path, prompter)? {
        InstallOutcome::Installed(report) => {
            println!(
                "Installed '{}' v{} ({} files).",
                report.name, report.version, report.files_written
            );
            for component in &report.components_accepted {
                println!("  + component '{component}'");
            }
            if let Some(replaced) = &report.replaced_version {
                println!("  replaced v{replaced}");
            }
        }
        InstallOutcome::DeclinedReinstall => println!("Kept the installed version."),
        InstallOutcome::DeclinedConflicts(conflicts) => {
            println!("Install cancelled; {} conflicting file(s) untouched.", conflicts.len());
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ModListItem {
    name: String,
    author: String,
    version: String,
    files: usize,
    components: Vec<String>,
    disabled: bool,
}

fn list_installed(registry: &Registry, format: OutputFormat) -> Result<()> {
    let items: Vec<ModListItem> = registry
        .iter()
        .map(|record| ModListItem {
            name: record.name.clone(),
            author: record.author.clone(),
            version: record.version.clone(),
            files: record.owned_paths.len(),
            components: record
                .optional_components
                .iter()
                .map(|component| component.component_name.clone())
                .collect(),
            disabled: record.disabled,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No mods installed.");
                return Ok(());
            }
            for item in items {
                let mark = if item.disabled { " " } else { "x" };
                println!(
                    "[{mark}] {:<28} {:<10} by {:<20} {} files",
                    item.name, item.version, item.author, item.files
                );
                for component in item.components {
                    println!("      + {component}");
                }
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct RepoListItem {
    file_name: String,
    mod_name: String,
    mod_description: String,
}

fn list_repository(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let listing = repo::fetch_listing(config)?;
    let items: Vec<RepoListItem> = listing
        .repository_mods
        .into_iter()
        .map(|entry| RepoListItem {
            file_name: entry.file_name,
            mod_name: entry.mod_name,
            mod_description: entry.mod_description,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No mods found in the repository.");
                return Ok(());
            }
            for (index, item) in items.iter().enumerate() {
                println!("{}. {} - {}", index + 1, item.mod_name, item.mod_description);
                println!("   install with: cogwright repo install {}", item.file_name);
            }
        }
    }

    Ok(())
}

struct ConsolePrompter;

impl ConsolePrompter {
    fn ask(&self, question: &str) -> bool {
        print!("{question} [y/N] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        line.trim().eq_ignore_ascii_case("y")
    }
}

impl Prompter for ConsolePrompter {
    fn confirm_reinstall(&mut self, name: &str, version: &str) -> bool {
        self.ask(&format!("'{name}' v{version} is already installed. Reinstall?"))
    }

    fn confirm_conflicts(&mut self, conflicts: &[Conflict]) -> bool {
        println!("These files are already owned by other mods:");
        for conflict in conflicts {
            println!("  {} ('{}')", conflict.path.display(), conflict.mod_name);
        }
        self.ask("Install anyway and overwrite them?")
    }

    fn accept_component(&mut self, name: &str, directory: &str) -> bool {
        self.ask(&format!("Optional component '{name}' ({directory}). Install?"))
    }

    fn confirm_drifted_restore(&mut self) -> bool {
        self.ask("The game executable changed since the backup was taken. Restore anyway?")
    }
}

fn print_help() {
    println!("cogwright v{}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  cogwright install <zip|url>     Install a mod archive");
    println!("  cogwright uninstall <name>      Remove an installed mod");
    println!("  cogwright disable <name>        Quarantine a mod's files");
    println!("  cogwright enable <name>         Move quarantined files back");
    println!("  cogwright list                  List installed mods");
    println!("  cogwright repo [list]           List mods from the online repository");
    println!("  cogwright repo install <name>   Download a listed mod and install it");
    println!("  cogwright patch                 Apply the bundled mod-unlocker patch");
    println!("  cogwright unpatch               Remove the bundled patch files");
    println!("  cogwright restore               Reset the game directory from the backup");
    println!();
    println!("Global options:");
    println!("  --format <json|text>            Output format for list commands");
    println!("  --game-root <path>              Override the configured game directory");
    println!("  -h, --help                      Show help");
    println!("  -V, --version                   Show version");
}
