use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct PollMetrics {
    pub cycles: IntCounter,
    pub cycle_failures: IntCounter,
    pub read_failures: IntCounter,
    pub devices_tracked: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub poll: PollMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let cycles = IntCounter::new("soilhub_poll_cycles", "Total poll cycles started")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let cycle_failures = IntCounter::new(
            "soilhub_poll_cycle_failures",
            "Poll cycles skipped due to a scan or store failure",
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let read_failures = IntCounter::new(
            "soilhub_read_failures",
            "Per-device moisture reads that returned no value",
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let devices_tracked = IntGauge::new(
            "soilhub_devices_tracked",
            "Number of device records in the registry",
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let poll = PollMetrics {
            cycles,
            cycle_failures,
            read_failures,
            devices_tracked,
        };
        let _ = registry.register(Box::new(poll.cycles.clone()));
        let _ = registry.register(Box::new(poll.cycle_failures.clone()));
        let _ = registry.register(Box::new(poll.read_failures.clone()));
        let _ = registry.register(Box::new(poll.devices_tracked.clone()));
        Ok(Self { registry, poll })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
