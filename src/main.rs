use anyhow::{bail, Context, Result};
use block_store::config::Config;
use block_store::error::format_error;
use block_store::resource::{
    get_all_resource_keys, get_resource, PathScope, ResourceDef, ResourceStream,
};
use block_store::v2::{Snapshot, Volume};
use block_store::{BlockStore, Query, Session};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use futures::TryStreamExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command line client for EVS / Cinder v2 block storage
#[derive(Parser, Debug)]
#[command(name = "bsctl", version = block_store::VERSION, about, long_about = None)]
struct Args {
    /// Block storage endpoint (without /v2/{project})
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Project (tenant) the calls are scoped to
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Auth token sent as X-Auth-Token
    #[arg(long, global = true)]
    token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "json")]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, global = true, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List volumes
    Volumes {
        /// Use /volumes/detail
        #[arg(long)]
        detail: bool,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        all_tenants: bool,
    },
    /// Show one volume
    Volume { id: String },
    /// Create a volume
    CreateVolume {
        /// Size in GB
        #[arg(long)]
        size: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        volume_type: Option<String>,
        #[arg(long)]
        availability_zone: Option<String>,
        #[arg(long)]
        snapshot_id: Option<String>,
        #[arg(long)]
        source_volume_id: Option<String>,
        #[arg(long)]
        image_id: Option<String>,
    },
    /// Delete a volume
    DeleteVolume {
        id: String,
        /// Succeed when the volume does not exist
        #[arg(long)]
        ignore_missing: bool,
    },
    /// List snapshots
    Snapshots {
        #[arg(long)]
        detail: bool,
        #[arg(long)]
        volume_id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one snapshot
    Snapshot { id: String },
    /// Snapshot a volume
    CreateSnapshot {
        volume_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Snapshot even if the volume is attached
        #[arg(long)]
        force: bool,
    },
    /// Delete a snapshot
    DeleteSnapshot {
        id: String,
        #[arg(long)]
        ignore_missing: bool,
    },
    /// Roll a volume back to a snapshot
    Rollback {
        snapshot_id: String,
        #[arg(long)]
        volume_id: String,
        /// New name for the rolled back volume
        #[arg(long)]
        name: Option<String>,
    },
    /// List volume types
    Types,
    /// Show quotas and usage (defaults to the current project)
    Quota { tenant_id: Option<String> },
    /// Volume or snapshot metadata
    Metadata {
        #[command(subcommand)]
        action: MetadataAction,
    },
    /// Mark a volume bootable or not
    Bootable {
        id: String,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
    /// Set or clear the read-only flag of a volume
    Readonly {
        id: String,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
    /// List API extensions
    Extensions,
    /// List API versions
    Versions {
        /// Query /v2 instead of the service root
        #[arg(long)]
        v2: bool,
    },
    /// Show the known resource kinds, their paths and list filters
    Resources {
        /// Only this resource kind
        name: Option<String>,
    },
    /// Save endpoint, project and transport settings
    Configure {
        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(long)]
        user_agent: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum MetadataAction {
    /// Show the whole map, or one key
    Get {
        #[arg(value_enum)]
        target: Target,
        id: String,
        key: Option<String>,
    },
    /// Add entries; with --key update one entry, with --replace the whole map
    Set {
        #[arg(value_enum)]
        target: Target,
        id: String,
        /// KEY=VALUE pairs
        #[arg(required = true)]
        entries: Vec<String>,
        #[arg(long, conflicts_with = "replace")]
        key: Option<String>,
        #[arg(long)]
        replace: bool,
    },
    /// Delete one key
    Delete {
        #[arg(value_enum)]
        target: Target,
        id: String,
        key: String,
    },
}

/// One line of `bsctl resources`
#[derive(Debug, Serialize)]
struct ResourceRow {
    name: &'static str,
    display_name: &'static str,
    path: &'static str,
    scope: &'static str,
    paginated: bool,
    filters: Vec<&'static str>,
}

impl From<&ResourceDef> for ResourceRow {
    fn from(def: &ResourceDef) -> Self {
        Self {
            name: def.name,
            display_name: def.display_name,
            path: def.base_path,
            scope: match def.scope {
                PathScope::Project => "project",
                PathScope::Root => "root",
            },
            paginated: def.paginated,
            filters: def.accepted_query_params(),
        }
    }
}

/// Registry rows, all of them or only `name`
fn resource_rows(name: Option<&str>) -> Result<Vec<ResourceRow>> {
    match name {
        Some(name) => match get_resource(name) {
            Some(def) => Ok(vec![ResourceRow::from(def)]),
            None => bail!(
                "unknown resource '{}' (known: {})",
                name,
                get_all_resource_keys().join(", ")
            ),
        },
        None => Ok(get_all_resource_keys()
            .into_iter()
            .filter_map(get_resource)
            .map(ResourceRow::from)
            .collect()),
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    Volume,
    Snapshot,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, err);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("bsctl {} started with log level: {:?}", block_store::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("bsctl").join("bsctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".bsctl").join("bsctl.log");
    }
    PathBuf::from("bsctl.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        tracing::error!("{:#}", err);
        match err.downcast_ref::<block_store::Error>() {
            Some(sdk_err) => eprintln!("Error: {}", format_error(sdk_err)),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();

    if let Command::Configure {
        timeout_secs,
        user_agent,
    } = &args.command
    {
        if let Some(endpoint) = &args.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(project) = &args.project {
            config.project_id = Some(project.clone());
        }
        if timeout_secs.is_some() {
            config.timeout_secs = *timeout_secs;
        }
        if user_agent.is_some() {
            config.user_agent = user_agent.clone();
        }
        config.save().context("saving configuration")?;
        return print(&config, args.output);
    }

    if let Command::Resources { name } = &args.command {
        return print(&resource_rows(name.as_deref())?, args.output);
    }

    let store = connect(&config, &args)?;
    let output = args.output;

    match args.command {
        Command::Volumes {
            detail,
            name,
            status,
            limit,
            all_tenants,
        } => {
            let mut query = Query::new();
            if let Some(name) = name {
                query.insert("name", name);
            }
            if let Some(status) = status {
                query.insert("status", status);
            }
            if let Some(limit) = limit {
                query.insert("limit", limit);
            }
            if all_tenants {
                query.insert("all_tenants", 1);
            }
            print(&collect(store.volumes(detail, query)?).await?, output)
        }
        Command::Volume { id } => print(&store.get_volume(&id).await?, output),
        Command::CreateVolume {
            size,
            name,
            description,
            volume_type,
            availability_zone,
            snapshot_id,
            source_volume_id,
            image_id,
        } => {
            let volume = Volume {
                size: Some(size),
                name,
                description,
                volume_type,
                availability_zone,
                snapshot_id,
                source_volume_id,
                image_id,
                ..Default::default()
            };
            print(&store.create_volume(&volume).await?, output)
        }
        Command::DeleteVolume { id, ignore_missing } => {
            store.delete_volume(&id, ignore_missing).await?;
            eprintln!("Deleted volume {}", id);
            Ok(())
        }
        Command::Snapshots {
            detail,
            volume_id,
            name,
            status,
            limit,
        } => {
            let mut query = Query::new();
            if let Some(volume_id) = volume_id {
                query.insert("volume_id", volume_id);
            }
            if let Some(name) = name {
                query.insert("name", name);
            }
            if let Some(status) = status {
                query.insert("status", status);
            }
            if let Some(limit) = limit {
                query.insert("limit", limit);
            }
            print(&collect(store.snapshots(detail, query)?).await?, output)
        }
        Command::Snapshot { id } => print(&store.get_snapshot(&id).await?, output),
        Command::CreateSnapshot {
            volume_id,
            name,
            description,
            force,
        } => {
            let snapshot = Snapshot {
                volume_id: Some(volume_id),
                name,
                description,
                force: Some(force),
                ..Default::default()
            };
            print(&store.create_snapshot(&snapshot).await?, output)
        }
        Command::DeleteSnapshot { id, ignore_missing } => {
            store.delete_snapshot(&id, ignore_missing).await?;
            eprintln!("Deleted snapshot {}", id);
            Ok(())
        }
        Command::Rollback {
            snapshot_id,
            volume_id,
            name,
        } => {
            let rollback = store
                .rollback_snapshot(&volume_id, name.as_deref(), &snapshot_id)
                .await?;
            print(&rollback, output)
        }
        Command::Types => print(&collect(store.types()?).await?, output),
        Command::Quota { tenant_id } => {
            let tenant_id = tenant_id.unwrap_or_else(|| store.session().project_id().to_string());
            print(&store.get_quota_set(&tenant_id).await?, output)
        }
        Command::Metadata { action } => run_metadata(&store, action, output).await,
        Command::Bootable { id, value } => {
            store.set_volume_bootable(&id, value).await?;
            eprintln!("Volume {} bootable={}", id, value);
            Ok(())
        }
        Command::Readonly { id, value } => {
            store.set_volume_readonly(&id, value).await?;
            eprintln!("Volume {} readonly={}", id, value);
            Ok(())
        }
        Command::Extensions => print(&collect(store.extensions()?).await?, output),
        Command::Versions { v2 } => print(&collect(store.versions(v2)?).await?, output),
        Command::Configure { .. } | Command::Resources { .. } => Ok(()),
    }
}

async fn run_metadata(store: &BlockStore, action: MetadataAction, output: OutputFormat) -> Result<()> {
    match action {
        MetadataAction::Get { target, id, key } => {
            let metadata = match target {
                Target::Volume => store.get_volume_metadata(&id, key.as_deref()).await?,
                Target::Snapshot => store.get_snapshot_metadata(&id, key.as_deref()).await?,
            };
            print(&metadata, output)
        }
        MetadataAction::Set {
            target,
            id,
            entries,
            key,
            replace,
        } => {
            let entries = parse_entries(&entries)?;
            let metadata = match (target, key.is_some() || replace) {
                (Target::Volume, false) => store.create_volume_metadata(&id, &entries).await?,
                (Target::Volume, true) => {
                    store
                        .update_volume_metadata(&id, &entries, key.as_deref())
                        .await?
                }
                (Target::Snapshot, false) => store.create_snapshot_metadata(&id, &entries).await?,
                (Target::Snapshot, true) => {
                    store
                        .update_snapshot_metadata(&id, &entries, key.as_deref())
                        .await?
                }
            };
            print(&metadata, output)
        }
        MetadataAction::Delete { target, id, key } => {
            match target {
                Target::Volume => store.delete_volume_metadata(&id, &key).await?,
                Target::Snapshot => store.delete_snapshot_metadata(&id, &key).await?,
            }
            eprintln!("Deleted metadata key {}", key);
            Ok(())
        }
    }
}

/// Build the proxy from flags, environment and config file
fn connect(config: &Config, args: &Args) -> Result<BlockStore> {
    let Some(endpoint) = config.effective_endpoint(args.endpoint.as_deref()) else {
        bail!(
            "no endpoint configured (use --endpoint, {} or `bsctl configure`)",
            block_store::config::ENV_ENDPOINT
        );
    };
    let Some(project) = config.effective_project(args.project.as_deref()) else {
        bail!(
            "no project configured (use --project, {} or `bsctl configure`)",
            block_store::config::ENV_PROJECT_ID
        );
    };
    let token = Config::effective_token(args.token.as_deref());
    if token.is_none() {
        tracing::warn!("no auth token set; requests are sent unauthenticated");
    }

    let session = Session::with_options(&endpoint, &project, token, &config.client_options())
        .with_context(|| format!("connecting to {}", endpoint))?;
    Ok(BlockStore::new(session))
}

async fn collect<T>(stream: ResourceStream<T>) -> Result<Vec<T>> {
    Ok(stream.try_collect().await?)
}

/// Parse `KEY=VALUE` arguments
fn parse_entries(entries: &[String]) -> Result<BTreeMap<String, String>> {
    entries
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => bail!("expected KEY=VALUE, got '{}'", entry),
        })
        .collect()
}

fn print<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_entries() {
        let entries = parse_entries(&["a=1".to_string(), "b=x=y".to_string()]).unwrap();
        assert_eq!(entries["a"], "1");
        assert_eq!(entries["b"], "x=y");
        assert!(parse_entries(&["novalue".to_string()]).is_err());
        assert!(parse_entries(&["=v".to_string()]).is_err());
    }

    #[test]
    fn test_bootable_takes_explicit_value() {
        let args = Args::try_parse_from(["bsctl", "bootable", "vol-1", "false"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Bootable { ref id, value: false } if id == "vol-1"
        ));
    }

    #[test]
    fn test_resource_rows_from_registry() {
        let rows = resource_rows(None).unwrap();
        assert_eq!(rows.len(), get_all_resource_keys().len());

        let volume = rows.iter().find(|row| row.name == "volume").unwrap();
        assert_eq!(volume.path, "/volumes");
        assert_eq!(volume.scope, "project");
        assert!(volume.filters.contains(&"status"));
        assert!(volume.filters.contains(&"limit"));

        let versions = resource_rows(Some("version")).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].scope, "root");

        let err = resource_rows(Some("backup")).unwrap_err();
        assert!(err.to_string().contains("quota-set"));
    }

    #[test]
    fn test_resources_needs_no_connection_flags() {
        let args = Args::try_parse_from(["bsctl", "resources", "snapshot", "-o", "yaml"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Resources { name: Some(ref name) } if name == "snapshot"
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["bsctl", "volumes", "--detail", "--project", "p1", "-o", "yaml"])
                .unwrap();
        assert_eq!(args.project.as_deref(), Some("p1"));
        assert!(matches!(args.output, OutputFormat::Yaml));
    }
}
