// Prometheus metrics for the gateway.
// Tracks: throughput per translation, latency, decode and downstream errors.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_with_registry, register_histogram_with_registry, Counter, Encoder, Histogram,
    HistogramOpts, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub requests_total: Counter,
    pub request_duration_seconds: Histogram,
    pub requests_failed_total: Counter,

    // Translation metrics (by ZDS message family)
    pub translations_total: Counter,
    pub genereer_zaakidentificatie_total: Counter,
    pub creeer_zaak_total: Counter,
    pub geef_zaakdetails_total: Counter,

    // Error metrics
    pub decode_errors_total: Counter,
    pub routing_errors_total: Counter,
    pub zgw_errors_total: Counter,
    pub db_errors_total: Counter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = register_counter_with_registry!(
            Opts::new("zdsbrug_requests_total", "Total ZDS requests processed"),
            registry
        )?;

        let request_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "zdsbrug_request_duration_seconds",
                "End-to-end request duration in seconds"
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            registry
        )?;

        let requests_failed_total = register_counter_with_registry!(
            Opts::new("zdsbrug_requests_failed_total", "Requests that raised an error"),
            registry
        )?;

        let translations_total = register_counter_with_registry!(
            Opts::new("zdsbrug_translations_total", "Total translations executed"),
            registry
        )?;

        let genereer_zaakidentificatie_total = register_counter_with_registry!(
            Opts::new(
                "zdsbrug_genereer_zaakidentificatie_total",
                "genereerZaakIdentificatie translations"
            ),
            registry
        )?;

        let creeer_zaak_total = register_counter_with_registry!(
            Opts::new("zdsbrug_creeer_zaak_total", "creeerZaak translations"),
            registry
        )?;

        let geef_zaakdetails_total = register_counter_with_registry!(
            Opts::new("zdsbrug_geef_zaakdetails_total", "geefZaakdetails translations"),
            registry
        )?;

        let decode_errors_total = register_counter_with_registry!(
            Opts::new("zdsbrug_decode_errors_total", "Envelope decode failures"),
            registry
        )?;

        let routing_errors_total = register_counter_with_registry!(
            Opts::new("zdsbrug_routing_errors_total", "Requests without a matching translation"),
            registry
        )?;

        let zgw_errors_total = register_counter_with_registry!(
            Opts::new("zdsbrug_zgw_errors_total", "Failed ZGW calls"),
            registry
        )?;

        let db_errors_total = register_counter_with_registry!(
            Opts::new("zdsbrug_db_errors_total", "Failed persistence writes"),
            registry
        )?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            requests_failed_total,
            translations_total,
            genereer_zaakidentificatie_total,
            creeer_zaak_total,
            geef_zaakdetails_total,
            decode_errors_total,
            routing_errors_total,
            zgw_errors_total,
            db_errors_total,
        })
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Track a translation by converter name.
    pub fn track_translation(&self, translation: &str) {
        self.translations_total.inc();
        match translation {
            "GenereerZaakIdentificatie" => self.genereer_zaakidentificatie_total.inc(),
            "CreeerZaak" => self.creeer_zaak_total.inc(),
            "GeefZaakdetails" => self.geef_zaakdetails_total.inc(),
            _ => {}
        }
    }

    /// Track a failed request by error kind.
    pub fn track_error(&self, err: &crate::errors::GatewayError) {
        use crate::errors::GatewayError;
        self.requests_failed_total.inc();
        match err {
            GatewayError::Validation(_) | GatewayError::Translation(_) => {
                self.decode_errors_total.inc()
            }
            GatewayError::Routing(_) => self.routing_errors_total.inc(),
            GatewayError::Downstream(_) => self.zgw_errors_total.inc(),
            GatewayError::Database(_) => self.db_errors_total.inc(),
            GatewayError::Configuration(_) | GatewayError::Unknown(_) => {}
        }
    }
}

pub static METRICS: Lazy<Metrics> =
    Lazy::new(|| Metrics::new().expect("metrics registry initialization"));
