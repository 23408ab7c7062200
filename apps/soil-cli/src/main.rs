use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use ble_transport::MockRadio;
use plant_registry::{MemoryStore, RegistryStore, SqliteStore};
use poll_engine::{PollConfig, PollScheduler, MOISTURE_CHARACTERISTIC, MOISTURE_SERVICE};

#[derive(Parser, Debug)]
#[command(
    name = "soil",
    version,
    about = "Soilhub registry CLI",
    disable_help_subcommand = true
)]
struct Cli {
    /// SQLite database path for the device registry
    #[arg(long, default_value = "devices.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every tracked device as JSON
    Devices,
    /// Show one device by its radio uuid
    Show { radio_uuid: String },
    /// Set a device's nickname
    Nickname { radio_uuid: String, nickname: String },
    /// Remove a device from the registry
    Remove { radio_uuid: String },
    /// Run poll cycles against the mock radio
    Poll {
        /// Number of cycles to run
        #[arg(long, default_value_t = 1)]
        cycles: u32,
        /// Use an in-memory registry instead of the db file
        #[arg(long, action = ArgAction::SetTrue)]
        memory: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices => {
            let store = SqliteStore::open(&cli.db)?;
            let records = store.load_all()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Show { radio_uuid } => {
            let store = SqliteStore::open(&cli.db)?;
            match store.find_by_uuid(&radio_uuid)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => bail!("device '{radio_uuid}' not found"),
            }
        }
        Commands::Nickname {
            radio_uuid,
            nickname,
        } => {
            let store = SqliteStore::open(&cli.db)?;
            if !store.set_nickname(&radio_uuid, &nickname)? {
                bail!("device '{radio_uuid}' not found");
            }
            println!("nickname updated for device '{radio_uuid}'");
        }
        Commands::Remove { radio_uuid } => {
            let store = SqliteStore::open(&cli.db)?;
            if !store.remove(&radio_uuid)? {
                bail!("device '{radio_uuid}' not found");
            }
            println!("device '{radio_uuid}' removed");
        }
        Commands::Poll { cycles, memory } => {
            let store: Arc<dyn RegistryStore> = if memory {
                Arc::new(MemoryStore::new())
            } else {
                Arc::new(SqliteStore::open(&cli.db)?)
            };

            let radio = MockRadio::new();
            radio.add_sensor(
                "mock-a1",
                "SoilSensor-A1",
                MOISTURE_SERVICE,
                MOISTURE_CHARACTERISTIC,
                42,
            );
            radio.add_sensor(
                "mock-b2",
                "SoilSensor-B2",
                MOISTURE_SERVICE,
                MOISTURE_CHARACTERISTIC,
                17,
            );

            let config = PollConfig {
                interval: Duration::from_millis(100),
                ..PollConfig::default()
            };
            let scheduler = PollScheduler::new(Arc::new(radio), Arc::clone(&store), config);
            for cycle in 1..=cycles {
                let sighted = scheduler.run_cycle().await?;
                info!(cycle, sighted, "poll cycle done");
            }
            println!("{}", serde_json::to_string_pretty(&store.load_all()?)?);
        }
    }
    Ok(())
}
