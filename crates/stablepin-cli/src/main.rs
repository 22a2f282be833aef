use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stablepin_core::{Catalog, ChangeRecord, InstalledRegistry, PinEntry, RepositoryEntry};
use stablepin_installer::{
    default_user_prefix, read_installed_registry, read_pins, PrefixHost, PrefixLayout,
};
use stablepin_reconciler::{
    reconcile_command, refresh_hook, ChannelPatterns, ChannelRoles, PlannedReplacement, Reconciler,
};
use stablepin_registry::{CatalogStore, RepositoryConfig, RepositoryStore};
use tracing_subscriber::EnvFilter;

mod completion;
mod render;

use completion::{write_completions_script, CliCompletionShell};
use render::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "stablepin")]
#[command(about = "Move packages from the unstable channel back to stable", long_about = None)]
struct Cli {
    /// State root; defaults to STABLEPIN_PREFIX or ~/.stablepin.
    #[arg(long, global = true)]
    prefix: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// List installed packages.
    List,
    /// Show resolved channel roles and pending work.
    Status,
    /// Pin packages offered by both channels to the stable one.
    RefreshHook,
    Pins,
    /// Replace unstable installs with their stable equivalents.
    Reconcile {
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

#[derive(Subcommand, Debug)]
enum RepoCommands {
    Add { name: String, url: String },
    Remove { name: String },
    List,
}

#[derive(Subcommand, Debug)]
enum CatalogCommands {
    /// Store a catalog snapshot file for a repository.
    Import { repository: String, path: PathBuf },
}

/// Everything read from the prefix for one command invocation.
struct HostState {
    config: RepositoryConfig,
    catalog: Catalog,
    installed: InstalledRegistry,
    patterns: ChannelPatterns,
}

impl HostState {
    fn load(layout: &PrefixLayout) -> Result<Self> {
        let config = RepositoryStore::new(layout.state_dir()).load_config()?;
        let catalog = CatalogStore::new(layout.state_dir()).load_catalog(&config.repositories)?;
        let installed = read_installed_registry(layout)?;
        let patterns = ChannelPatterns::with_overrides(
            config.roles.stable.as_deref(),
            config.roles.unstable.as_deref(),
        )
        .context("failed loading role patterns from repositories.toml")?;
        Ok(Self {
            config,
            catalog,
            installed,
            patterns,
        })
    }

    fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(
            &self.config.repositories,
            &self.catalog,
            &self.installed,
            self.patterns.clone(),
        )
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_layout(prefix: Option<&Path>) -> Result<PrefixLayout> {
    let prefix = match prefix {
        Some(prefix) => prefix.to_path_buf(),
        None => default_user_prefix()?,
    };
    Ok(PrefixLayout::new(prefix))
}

fn run_cli(cli: Cli) -> Result<()> {
    let layout = resolve_layout(cli.prefix.as_deref())?;
    let renderer = TerminalRenderer::current();
    tracing::debug!(prefix = %layout.prefix().display(), "using state prefix");

    match cli.command {
        Commands::Repo { command } => {
            let store = RepositoryStore::new(layout.state_dir());
            match command {
                RepoCommands::Add { name, url } => {
                    store.add_repository(RepositoryEntry::new(&name, &url))?;
                    renderer.print_status("ok", &format!("added repository {name} ({url})"));
                }
                RepoCommands::Remove { name } => {
                    store.remove_repository(&name)?;
                    renderer.print_status("ok", &format!("removed repository {name}"));
                }
                RepoCommands::List => {
                    let repositories = store.list_repositories()?;
                    renderer.print_lines(&format_repository_lines(&repositories));
                }
            }
        }
        Commands::Catalog { command } => match command {
            CatalogCommands::Import { repository, path } => {
                let imported =
                    CatalogStore::new(layout.state_dir()).import_snapshot(&repository, &path)?;
                renderer.print_status(
                    "ok",
                    &format!("imported {imported} packages into {repository}"),
                );
            }
        },
        Commands::List => {
            let installed = read_installed_registry(&layout)?;
            renderer.print_lines(&format_installed_lines(&installed));
        }
        Commands::Status => {
            let state = HostState::load(&layout)?;
            let reconciler = state.reconciler();
            renderer.print_lines(&format_status_lines(
                &reconciler.roles(),
                reconciler.build_pin_list().len(),
                reconciler.find_unstable_installed().len(),
                reconciler.plan().len(),
            ));
        }
        Commands::RefreshHook => {
            layout.ensure_base_dirs()?;
            let state = HostState::load(&layout)?;
            let mut host = PrefixHost::new(layout.clone());
            let added = refresh_hook(&state.reconciler(), &mut host)?;
            renderer.print_status("ok", &format_pin_summary(added));
        }
        Commands::Pins => {
            let pins = read_pins(&layout)?;
            renderer.print_lines(&format_pin_lines(&pins));
        }
        Commands::Reconcile { dry_run, json } => {
            let state = HostState::load(&layout)?;
            let reconciler = state.reconciler();
            if dry_run {
                let plan = reconciler.plan();
                if json {
                    let changes = plan
                        .iter()
                        .map(PlannedReplacement::change_record)
                        .collect::<Vec<_>>();
                    println!("{}", format_changes_json(&changes)?);
                } else if plan.is_empty() {
                    renderer.print_status("ok", "nothing to reconcile");
                } else {
                    renderer.print_report("planned replacements", &format_plan_lines(&plan));
                }
                return Ok(());
            }

            layout.ensure_base_dirs()?;
            let mut host = PrefixHost::new(layout.clone());
            if json {
                let changes = reconciler.reconcile(&mut host)?;
                println!("{}", format_changes_json(&changes)?);
            } else {
                let mut sink = renderer;
                reconcile_command(&reconciler, &mut host, &mut sink)?;
            }
        }
        Commands::Completions { shell } => {
            let mut stdout = std::io::stdout().lock();
            write_completions_script(shell, &mut stdout)?;
        }
    }

    Ok(())
}

fn format_repository_lines(repositories: &[RepositoryEntry]) -> Vec<String> {
    if repositories.is_empty() {
        return vec!["no repositories configured".to_string()];
    }
    repositories
        .iter()
        .map(|repository| format!("{} url={}", repository.name, repository.url))
        .collect()
}

fn format_installed_lines(installed: &InstalledRegistry) -> Vec<String> {
    if installed.is_empty() {
        return vec!["no packages installed".to_string()];
    }
    installed
        .records()
        .map(|record| {
            let marker = if record.version.is_synthetic() {
                " (unstable build)"
            } else {
                ""
            };
            format!(
                "{} {} from {}{marker}",
                record.package_name, record.version, record.source_repository_name
            )
        })
        .collect()
}

fn format_status_lines(
    roles: &ChannelRoles,
    pinnable: usize,
    unstable_installed: usize,
    replaceable: usize,
) -> Vec<String> {
    let describe = |role: &Option<String>| role.as_deref().unwrap_or("(not configured)").to_string();
    vec![
        format!("stable: {}", describe(&roles.stable)),
        format!("unstable: {}", describe(&roles.unstable)),
        format!("pinnable: {pinnable}"),
        format!("unstable installed: {unstable_installed}"),
        format!("replaceable: {replaceable}"),
    ]
}

fn format_pin_summary(added: usize) -> String {
    match added {
        0 => "pins already up to date".to_string(),
        1 => "pinned 1 package to the stable repository".to_string(),
        n => format!("pinned {n} packages to the stable repository"),
    }
}

fn format_pin_lines(pins: &[PinEntry]) -> Vec<String> {
    if pins.is_empty() {
        return vec!["no pins recorded".to_string()];
    }
    pins.iter()
        .map(|pin| format!("{} -> {}", pin.package_name, pin.repository_name))
        .collect()
}

fn format_plan_lines(plan: &[PlannedReplacement<'_>]) -> Vec<String> {
    plan.iter()
        .map(|step| {
            format!(
                "{} (from {})",
                step.change_record().summary(),
                step.candidate.source_repository_name
            )
        })
        .collect()
}

fn format_changes_json(changes: &[ChangeRecord]) -> Result<String> {
    serde_json::to_string_pretty(changes).context("failed serializing change records")
}
