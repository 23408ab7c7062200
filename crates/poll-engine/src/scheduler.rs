//! Fixed-cadence polling loop.

use crate::{reconcile, CycleError, MetricsHub, PollConfig, TelemetryFetcher};
use ble_transport::{DiscoveredDevice, RadioLink};
use plant_registry::{DeviceMutation, RegistryStore};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Drives the scan / fetch / reconcile / sleep loop.
///
/// Cycles never overlap: the next scan starts only after this cycle's commit
/// has returned. A failed cycle is logged and skipped; only the stop signal
/// ends the loop, and a stop requested mid-cycle lets the in-flight cycle
/// finish.
pub struct PollScheduler {
    radio: Arc<dyn RadioLink>,
    store: Arc<dyn RegistryStore>,
    fetcher: TelemetryFetcher,
    config: PollConfig,
    metrics: Option<MetricsHub>,
}

impl PollScheduler {
    pub fn new(
        radio: Arc<dyn RadioLink>,
        store: Arc<dyn RegistryStore>,
        config: PollConfig,
    ) -> Self {
        let fetcher = TelemetryFetcher::new(config.service_uuid, config.characteristic_uuid);
        Self {
            radio,
            store,
            fetcher,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHub) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run until `stop` flips to true.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        info!(
            interval_s = self.config.interval.as_secs(),
            "poll scheduler started"
        );
        loop {
            if *stop.borrow_and_update() {
                break;
            }
            if let Some(hub) = &self.metrics {
                hub.poll.cycles.inc();
            }
            match self.run_cycle().await {
                Ok(sighted) => debug!(devices = sighted, "poll cycle complete"),
                Err(e) => {
                    if let Some(hub) = &self.metrics {
                        hub.poll.cycle_failures.inc();
                    }
                    error!("poll cycle failed: {e}");
                }
            }
            tokio::select! {
                _ = sleep(self.config.interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        // sender gone; nothing can ever stop us otherwise
                        break;
                    }
                }
            }
        }
        info!("poll scheduler stopped");
    }

    /// One full cycle: scan, fetch per device, reconcile, commit. The store
    /// is only touched after scan and fetch are done, and nothing is held
    /// across the sleep that follows.
    pub async fn run_cycle(&self) -> Result<usize, CycleError> {
        let discovered = self.radio.scan().await?;
        let tracked = self.filter_by_name(discovered);

        let mut sightings = Vec::with_capacity(tracked.len());
        for device in tracked {
            let reading = match self.fetcher.read_moisture(self.radio.as_ref(), &device).await {
                Ok(value) => Some(value),
                Err(e) => {
                    if let Some(hub) = &self.metrics {
                        hub.poll.read_failures.inc();
                    }
                    warn!(device = %device.advertised_name, "moisture read failed: {e}");
                    None
                }
            };
            sightings.push((device, reading));
        }

        let snapshot = self.store.load_all()?;
        let batch = reconcile(
            &snapshot,
            &sightings,
            OffsetDateTime::now_utc(),
            &self.config.default_nickname,
        );
        self.store.commit(&batch)?;

        if let Some(hub) = &self.metrics {
            let inserted = batch
                .iter()
                .filter(|m| matches!(m, DeviceMutation::Insert { .. }))
                .count();
            hub.poll.devices_tracked.set((snapshot.len() + inserted) as i64);
        }
        Ok(sightings.len())
    }

    fn filter_by_name(&self, devices: Vec<DiscoveredDevice>) -> Vec<DiscoveredDevice> {
        match &self.config.name_filter {
            Some(filter) => {
                let needle = filter.to_lowercase();
                devices
                    .into_iter()
                    .filter(|d| d.advertised_name.to_lowercase().contains(&needle))
                    .collect()
            }
            None => devices,
        }
    }
}
