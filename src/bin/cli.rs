//! CLI for exercising an in-process miniprim cluster

use clap::{Parser, Subcommand};
use miniprim::directory::{ResourceType, ResourceTypeRegistry};
use miniprim::partition::{
    LocalPartitionGroup, MultiRaftProtocol, PartitionGroup, PartitionService, PartitionerKind,
    ProtocolRegistry, ServiceId,
};
use miniprim::resources::{CounterOp, IdGeneratorOp, LockOp, MapOp, Payload};
use miniprim::Config;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "miniprim")]
#[command(about = "Resource directory and partition router playground")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./miniprim.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured partitioner (hash, rendezvous)
    #[arg(long)]
    partitioner: Option<PartitionerKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which partition owns each key
    Route {
        /// Keys to route
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Create one primitive of each built-in type, run a few operations and
    /// print the resulting directory of every partition
    Demo {
        /// Keys used to route the counter increments
        #[arg(long, value_delimiter = ',', default_value = "a,b,c,d")]
        keys: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(partitioner) = cli.partitioner {
        config.router.partitioner = partitioner;
    }

    let registry = Arc::new(ResourceTypeRegistry::with_builtin());
    let groups: Vec<Arc<LocalPartitionGroup>> = config
        .groups
        .iter()
        .map(|group| Arc::new(LocalPartitionGroup::from_config(group, registry.clone())))
        .collect();
    let partitions = groups.iter().fold(
        PartitionService::new(config.default_group.clone()),
        |service, group| service.with_group(group.clone()),
    );

    let protocols = ProtocolRegistry::new();
    let router = protocols.router(
        MultiRaftProtocol::NAME,
        config.router.clone(),
        Arc::new(partitions),
    )?;

    match cli.command {
        Commands::Route { keys } => {
            let group = router.group()?;
            let client = router
                .create_service(ServiceId::new("route", ResourceType::map()))
                .await?;
            println!(
                "Group {} ({} partitions, {} partitioner):",
                group.name(),
                group.partitions().len(),
                config.router.partitioner
            );
            for key in keys {
                println!("  {} -> {}", key, client.partition_for(&key)?);
            }
        }

        Commands::Demo { keys } => {
            let counter = router
                .create_service(ServiceId::new("hits", ResourceType::counter()))
                .await?;
            for key in &keys {
                let value = counter
                    .execute(key, CounterOp::Increment.to_payload())
                    .await?;
                println!(
                    "counter[{}] on {} = {}",
                    key,
                    counter.partition_for(key)?,
                    value
                );
            }

            let lock = router
                .create_service(ServiceId::new("lockA", ResourceType::lock()))
                .await?;
            let grant = lock
                .execute(
                    "lockA",
                    LockOp::Lock {
                        holder: config.node_id.clone(),
                    }
                    .to_payload(),
                )
                .await?;
            println!("lock lockA = {}", grant);

            let ids = router
                .create_service(ServiceId::new("ids", ResourceType::id_generator()))
                .await?;
            let batch = ids
                .execute("ids", IdGeneratorOp::NextBatch { size: 100 }.to_payload())
                .await?;
            println!("id batch = {}", batch);

            let map = router
                .create_service(ServiceId::new("settings", ResourceType::map()))
                .await?;
            map.execute(
                "mode",
                MapOp::Put {
                    key: "mode".into(),
                    value: json!("demo"),
                }
                .to_payload(),
            )
            .await?;

            let group_name = router.group()?.name().to_string();
            for group in groups.iter().filter(|g| g.name() == group_name) {
                for partition in group.partitions() {
                    let Some(log) = group.log(partition.id()) else {
                        continue;
                    };
                    println!("{} (last index {}):", log.name(), log.last_index().await);
                    for (path, resource) in log.read(|d| d.paths()).await {
                        match resource {
                            Some(id) => println!("  {}  [resource {}]", path, id),
                            None => println!("  {}", path),
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
