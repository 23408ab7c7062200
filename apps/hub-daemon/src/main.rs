use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ble_transport::{MockRadio, RadioLink};
use plant_registry::{MemoryStore, RegistryStore, SqliteStore};
use poll_engine::{MetricsHub, PollConfig, PollScheduler, MOISTURE_CHARACTERISTIC, MOISTURE_SERVICE};

#[derive(Parser)]
#[command(name = "hub-daemon")]
#[command(about = "Soilhub polling daemon for BLE soil-moisture sensors")]
struct Args {
    /// Seconds to sleep between poll cycles
    #[arg(long, default_value_t = 10)]
    interval_secs: u64,

    /// SQLite database path for the device registry
    #[arg(long, default_value = "devices.db")]
    db: String,

    /// Use the in-process mock radio with simulated sensors and an in-memory
    /// registry
    #[arg(long)]
    mock: bool,

    /// GATT service that carries the moisture characteristic
    #[arg(long, default_value_t = MOISTURE_SERVICE)]
    service_uuid: Uuid,

    /// GATT characteristic holding the moisture value
    #[arg(long, default_value_t = MOISTURE_CHARACTERISTIC)]
    characteristic_uuid: Uuid,

    /// Nickname given to newly discovered devices
    #[arg(long, default_value = "Pakkun Flower")]
    nickname: String,

    /// Only track devices whose advertised name contains this substring;
    /// empty string tracks everything
    #[arg(long, default_value = "SoilSensor")]
    name_filter: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();

    info!("soilhub daemon starting");

    let store: Arc<dyn RegistryStore> = if args.mock {
        Arc::new(MemoryStore::new())
    } else {
        info!(db = %args.db, "opening device registry");
        Arc::new(SqliteStore::open(&args.db)?)
    };

    let radio = build_radio(&args);

    let config = PollConfig {
        interval: Duration::from_secs(args.interval_secs),
        service_uuid: args.service_uuid,
        characteristic_uuid: args.characteristic_uuid,
        default_nickname: args.nickname.clone(),
        name_filter: if args.name_filter.is_empty() {
            None
        } else {
            Some(args.name_filter.clone())
        },
    };

    let metrics =
        MetricsHub::new().map_err(|e| anyhow::anyhow!("failed to init metrics: {e}"))?;
    let scheduler = PollScheduler::new(radio, store, config).with_metrics(metrics.clone());

    let (stop_tx, stop_rx) = watch::channel(false);
    let engine = tokio::spawn(scheduler.run(stop_rx));

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    let _ = stop_tx.send(true);
    engine.await?;

    debug!("final metrics:\n{}", metrics.encode_text());
    info!("soilhub daemon stopped");
    Ok(())
}

fn build_radio(args: &Args) -> Arc<dyn RadioLink> {
    // Only the mock backend is built in for now; native radio stacks land
    // behind the `bluez`/`corebluetooth` features.
    let radio = MockRadio::new();
    if args.mock {
        radio.add_sensor(
            "mock-a1",
            "SoilSensor-A1",
            args.service_uuid,
            args.characteristic_uuid,
            42,
        );
        radio.add_sensor(
            "mock-b2",
            "SoilSensor-B2",
            args.service_uuid,
            args.characteristic_uuid,
            17,
        );
    } else {
        warn!("no native radio backend enabled; scans will come back empty");
    }
    Arc::new(radio)
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
