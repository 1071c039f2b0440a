use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand, ValueEnum};

use zh::cache::{CacheKey, CacheLayer, CacheStorage, FileStorage, NoopStorage};
use zh::zenhub::cache::{RESOURCES, SPRINT_ACCESSORS};
use zh::zenhub::GraphQlClient;
use zh::{Config, Resolver, Result};

#[derive(Parser, Debug)]
#[command(name = "zh")]
#[command(about = "Resolve ZenHub identifiers through a local cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/zh/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// ZenHub workspace ID (overrides ZH_WORKSPACE and the config file)
  #[arg(short, long, global = true)]
  workspace: Option<String>,

  /// Log debug output for this crate (ZH_LOG takes precedence)
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Write logs to this file instead of stderr
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Resolve identifiers and print `id<TAB>name` for each
  Resolve {
    #[arg(value_enum)]
    kind: Kind,

    #[arg(required = true)]
    identifiers: Vec<String>,

    /// Repository for bare issue numbers and branch names
    #[arg(long)]
    repo: Option<String>,
  },

  /// Inspect or clear the local cache
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
  /// Delete cached listings for the current workspace
  Clear {
    /// Delete every cached listing for every workspace
    #[arg(long, conflicts_with = "resource")]
    all: bool,

    /// Delete only this listing
    #[arg(long, value_parser = PossibleValuesParser::new(RESOURCES.iter().copied()))]
    resource: Option<String>,
  },

  /// Print the cache directory
  Path,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
  Pipeline,
  Epic,
  Issue,
  Label,
  Priority,
  Sprint,
  User,
  ZenhubLabel,
  Repo,
}

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = zh::logging::init(args.verbose, args.log_file.as_deref())?;

  match run(args).await {
    Ok(()) => Ok(ExitCode::SUCCESS),
    Err(e) => {
      eprintln!("zh: {e}");
      Ok(ExitCode::from(e.kind().exit_code()))
    }
  }
}

async fn run(args: Args) -> Result<()> {
  let config = Config::load(args.config.as_deref())?;

  match args.command {
    Command::Resolve {
      kind,
      identifiers,
      repo,
    } => {
      let workspace = config.workspace_id(args.workspace.as_deref())?;
      let identifiers: Vec<&str> = identifiers.iter().map(String::as_str).collect();
      let rows = if config.cache.enabled {
        let resolver = build_resolver(&config, FileStorage::open()?, workspace)?;
        resolve(&resolver, kind, &identifiers, repo.as_deref()).await?
      } else {
        let resolver = build_resolver(&config, NoopStorage, workspace)?;
        resolve(&resolver, kind, &identifiers, repo.as_deref()).await?
      };
      for (id, name) in rows {
        println!("{id}\t{name}");
      }
      Ok(())
    }
    Command::Cache { action } => cache_command(&config, args.workspace.as_deref(), action),
  }
}

fn build_resolver<S: CacheStorage>(config: &Config, storage: S, workspace: String) -> Result<Resolver<S>> {
  let zenhub = GraphQlClient::zenhub(config)?;
  let cache = CacheLayer::new(storage).with_strict_writes(config.cache.strict_writes);

  let mut resolver = Resolver::new(Arc::new(zenhub), cache, workspace)
    .with_aliases(config.aliases.clone())
    .with_default_repo(config.default_repo.clone());
  if let Some(github) = GraphQlClient::github(config)? {
    resolver = resolver.with_github(Arc::new(github));
  }
  Ok(resolver)
}

async fn resolve<S: CacheStorage>(
  resolver: &Resolver<S>,
  kind: Kind,
  identifiers: &[&str],
  repo: Option<&str>,
) -> Result<Vec<(String, String)>> {
  let mut rows = Vec::with_capacity(identifiers.len());

  match kind {
    Kind::Pipeline => {
      for identifier in identifiers {
        let p = resolver.pipeline(identifier).await?;
        rows.push((p.id, p.name));
      }
    }
    Kind::Epic => {
      for identifier in identifiers {
        let e = resolver.epic(identifier).await?;
        rows.push((e.id, e.title));
      }
    }
    Kind::Issue => {
      for identifier in identifiers {
        let i = resolver.issue(identifier, repo).await?;
        let name = format!("{} {}", i.reference(), i.title);
        rows.push((i.id, name));
      }
    }
    Kind::Priority => {
      for identifier in identifiers {
        let p = resolver.priority(identifier).await?;
        rows.push((p.id, p.name));
      }
    }
    Kind::Sprint => {
      for identifier in identifiers {
        let s = resolver.sprint(identifier).await?;
        rows.push((s.id, s.name));
      }
    }
    Kind::Repo => {
      for identifier in identifiers {
        let r = resolver.repository(identifier).await?;
        let name = r.full_name();
        rows.push((r.id, name));
      }
    }
    // Batch kinds resolve against one listing in one pass
    Kind::Label => {
      let labels = resolver.labels(identifiers).await?;
      rows.extend(labels.into_iter().map(|l| (l.id, l.name)));
    }
    Kind::ZenhubLabel => {
      let labels = resolver.zenhub_labels(identifiers).await?;
      rows.extend(labels.into_iter().map(|l| (l.id, l.name)));
    }
    Kind::User => {
      let users = resolver.users(identifiers).await?;
      rows.extend(users.into_iter().map(|u| (u.id, u.name)));
    }
  }

  Ok(rows)
}

fn cache_command(config: &Config, workspace: Option<&str>, action: CacheAction) -> Result<()> {
  let storage = FileStorage::open()?;

  match action {
    CacheAction::Path => println!("{}", storage.root().display()),
    CacheAction::Clear { all: true, .. } => storage.clear_all()?,
    CacheAction::Clear {
      resource: Some(resource),
      ..
    } => {
      let workspace = config.workspace_id(workspace)?;
      storage.clear(&CacheKey::new(resource.as_str(), workspace.as_str()))?;
      // Sprint accessors are stored beside the sprint list
      if resource == "sprints" {
        storage.clear(&CacheKey::new(SPRINT_ACCESSORS, workspace.as_str()))?;
      }
    }
    CacheAction::Clear { .. } => {
      let workspace = config.workspace_id(workspace)?;
      storage.clear_scope(&workspace)?;
    }
  }

  Ok(())
}
