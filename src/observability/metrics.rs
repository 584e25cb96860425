use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub pickup_transitions_total: IntCounterVec,
    pub emails_in_queue: IntGauge,
    pub commit_latency_seconds: HistogramVec,
    pub reward_points_awarded_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let pickup_transitions_total = IntCounterVec::new(
            Opts::new(
                "pickup_transitions_total",
                "Pickup lifecycle transitions by kind and outcome",
            ),
            &["transition", "outcome"],
        )
        .expect("valid pickup_transitions_total metric");

        let emails_in_queue = IntGauge::new(
            "emails_in_queue",
            "Notification emails waiting for the delivery worker",
        )
        .expect("valid emails_in_queue metric");

        let commit_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "commit_latency_seconds",
                "Latency of lifecycle commits in seconds",
            ),
            &["operation"],
        )
        .expect("valid commit_latency_seconds metric");

        let reward_points_awarded_total = IntCounter::new(
            "reward_points_awarded_total",
            "Points credited through completed pickups",
        )
        .expect("valid reward_points_awarded_total metric");

        registry
            .register(Box::new(pickup_transitions_total.clone()))
            .expect("register pickup_transitions_total");
        registry
            .register(Box::new(emails_in_queue.clone()))
            .expect("register emails_in_queue");
        registry
            .register(Box::new(commit_latency_seconds.clone()))
            .expect("register commit_latency_seconds");
        registry
            .register(Box::new(reward_points_awarded_total.clone()))
            .expect("register reward_points_awarded_total");

        Self {
            registry,
            pickup_transitions_total,
            emails_in_queue,
            commit_latency_seconds,
            reward_points_awarded_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
