use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter, UpDownCounter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;

pub mod labels {
    pub const ROUTE: &str = "route";
    pub const METHOD: &str = "method";
    pub const STATUS_CODE: &str = "status_code";
    pub const ERROR_TYPE: &str = "error_type";
    pub const VERSION: &str = "version";
    pub const RUST_VERSION: &str = "rust_version";
}

pub mod values {
    pub const ERROR_TRANSPORT: &str = "transport";
    pub const ERROR_INVALID_RESPONSE: &str = "invalid_response";
}

#[derive(Clone)]
pub struct Metrics {
    pub connections_total: Counter<u64>,
    pub connections_active: UpDownCounter<i64>,

    pub requests_total: Counter<u64>,
    pub requests_duration_seconds: Histogram<f64>,

    // Rate limiting
    pub rate_limit_allowed_total: Counter<u64>,
    pub rate_limit_rejected_total: Counter<u64>,

    pub auth_failures_total: Counter<u64>,

    // Upstream assistant calls
    pub upstream_requests_total: Counter<u64>,
    pub upstream_errors_total: Counter<u64>,
    pub upstream_duration_seconds: Histogram<f64>,

    pub build_info: Gauge<u64>,
}

impl Metrics {
    fn new(meter: Meter) -> Self {
        Self {
            connections_total: meter
                .u64_counter("heyhi_connections_total")
                .with_description("Total number of client connections accepted")
                .build(),
            connections_active: meter
                .i64_up_down_counter("heyhi_connections_active")
                .with_description("Number of open client connections")
                .build(),

            requests_total: meter
                .u64_counter("heyhi_requests_total")
                .with_description("Total number of gateway requests answered")
                .build(),
            requests_duration_seconds: meter
                .f64_histogram("heyhi_requests_duration_seconds")
                .with_description("Gateway request duration in seconds")
                .build(),

            rate_limit_allowed_total: meter
                .u64_counter("heyhi_rate_limit_allowed_total")
                .with_description("Requests admitted by the rate limiter")
                .build(),
            rate_limit_rejected_total: meter
                .u64_counter("heyhi_rate_limit_rejected_total")
                .with_description("Requests rejected by the rate limiter (429)")
                .build(),

            auth_failures_total: meter
                .u64_counter("heyhi_auth_failures_total")
                .with_description("Requests rejected for a missing or wrong API key (401)")
                .build(),

            upstream_requests_total: meter
                .u64_counter("heyhi_upstream_requests_total")
                .with_description("Calls to the upstream assistant service that got a response")
                .build(),
            upstream_errors_total: meter
                .u64_counter("heyhi_upstream_errors_total")
                .with_description("Upstream calls that failed or returned a non-JSON body")
                .build(),
            upstream_duration_seconds: meter
                .f64_histogram("heyhi_upstream_duration_seconds")
                .with_description("Upstream call duration in seconds")
                .build(),

            build_info: meter
                .u64_gauge("heyhi_build_info")
                .with_description("Build information (version, rust version)")
                .build(),
        }
    }

    /// Set build info metric with version labels
    pub fn set_build_info(&self) {
        self.build_info.record(
            1,
            &[
                KeyValue::new(labels::VERSION, env!("CARGO_PKG_VERSION")),
                KeyValue::new(labels::RUST_VERSION, env!("CARGO_PKG_RUST_VERSION")),
            ],
        );
    }

    pub fn record_request(&self, method: &str, route: &str, status_code: u16, duration: f64) {
        let attrs = [
            KeyValue::new(labels::METHOD, method.to_string()),
            KeyValue::new(labels::ROUTE, route.to_string()),
            KeyValue::new(labels::STATUS_CODE, status_code.to_string()),
        ];
        self.requests_total.add(1, &attrs);
        self.requests_duration_seconds.record(duration, &attrs);
    }

    pub fn record_rate_limit_allowed(&self, route: &str) {
        self.rate_limit_allowed_total
            .add(1, &[KeyValue::new(labels::ROUTE, route.to_string())]);
    }

    pub fn record_rate_limit_rejected(&self, route: &str) {
        self.rate_limit_rejected_total
            .add(1, &[KeyValue::new(labels::ROUTE, route.to_string())]);
    }

    pub fn record_auth_failure(&self, route: &str) {
        self.auth_failures_total
            .add(1, &[KeyValue::new(labels::ROUTE, route.to_string())]);
    }

    pub fn record_upstream_response(&self, route: &str, status_code: u16, duration: f64) {
        self.upstream_requests_total.add(
            1,
            &[
                KeyValue::new(labels::ROUTE, route.to_string()),
                KeyValue::new(labels::STATUS_CODE, status_code.to_string()),
            ],
        );
        self.upstream_duration_seconds
            .record(duration, &[KeyValue::new(labels::ROUTE, route.to_string())]);
    }

    pub fn record_upstream_error(&self, route: &str, error_type: &str) {
        self.upstream_errors_total.add(
            1,
            &[
                KeyValue::new(labels::ROUTE, route.to_string()),
                KeyValue::new(labels::ERROR_TYPE, error_type.to_string()),
            ],
        );
    }
}

pub fn init_metrics() -> Result<(Arc<Metrics>, Registry), Box<dyn std::error::Error + Send + Sync>>
{
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("heyhi-gateway");
    let metrics = Arc::new(Metrics::new(meter));

    metrics.set_build_info();

    Ok((metrics, registry))
}
