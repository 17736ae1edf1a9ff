// Converters translate between ZDS envelopes and the canonical ZGW model.
// One variant per message family; selection is a pure lookup against the
// routing table loaded at startup.

pub mod creeer_zaak;
pub mod geef_zaakdetails;
pub mod genereer_zaakidentificatie;

pub use creeer_zaak::CreeerZaakConverter;
pub use geef_zaakdetails::GeefZaakdetailsConverter;
pub use genereer_zaakidentificatie::GenereerZaakIdentificatieConverter;

use std::sync::Arc;

use crate::config::{HandlerCategory, TranslationEntry};
use crate::cycle::{RequestResponseCycle, RouteParams};
use crate::errors::{GatewayError, Result};
use crate::zgw::model::{TranslationRequest, TranslationResult};

/// Translation strategy for one ZDS message family. Converters are free of
/// side effects: no I/O, only decoding and encoding.
pub trait Converter: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Handler category this converter was bound to by the routing table.
    fn category(&self) -> HandlerCategory;

    /// Envelope -> canonical request. Structural malformation (missing
    /// header fields, wrong root identity) is a validation error.
    fn decode(&self, cycle: &RequestResponseCycle) -> Result<TranslationRequest>;

    /// Canonical result -> outbound envelope text. A result carrying an
    /// error payload is encoded as a Fo03 fault; errors are data here.
    fn encode(&self, cycle: &RequestResponseCycle, result: &TranslationResult) -> Result<String>;
}

/// Placeholder pair for the capability entry point; never translates.
#[derive(Debug)]
pub struct DiscoveryConverter;

impl Converter for DiscoveryConverter {
    fn name(&self) -> &'static str {
        "Discovery"
    }

    fn category(&self) -> HandlerCategory {
        HandlerCategory::Discovery
    }

    fn decode(&self, _cycle: &RequestResponseCycle) -> Result<TranslationRequest> {
        Err(GatewayError::Validation(
            "Discovery converter does not translate".to_string(),
        ))
    }

    fn encode(&self, _cycle: &RequestResponseCycle, _result: &TranslationResult) -> Result<String> {
        Err(GatewayError::Validation(
            "Discovery converter does not translate".to_string(),
        ))
    }
}

#[derive(Debug)]
struct Registration {
    entry: TranslationEntry,
    converter: Arc<dyn Converter>,
}

/// Resolves the converter for a routing tuple. Built once from the
/// translations table; read-only afterwards.
#[derive(Debug)]
pub struct ConverterFactory {
    registrations: Vec<Registration>,
    discovery: Arc<dyn Converter>,
}

impl ConverterFactory {
    pub fn from_entries(entries: Vec<TranslationEntry>) -> Result<Self> {
        let registrations = entries
            .into_iter()
            .map(|entry| {
                let converter = build_converter(&entry)?;
                Ok(Registration { entry, converter })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            registrations,
            discovery: Arc::new(DiscoveryConverter),
        })
    }

    /// Deterministic lookup: the same tuple resolves to the same converter
    /// for the lifetime of the configuration.
    pub fn resolve(&self, route: &RouteParams, soap_action: &str) -> Result<Arc<dyn Converter>> {
        let action = soap_action.replace('"', "");
        self.registrations
            .iter()
            .find(|r| {
                let e = &r.entry;
                e.protocol == route.protocol
                    && e.endpoint == route.endpoint
                    && e.modus.as_deref().map_or(true, |m| m == route.modus)
                    && e.version.as_deref().map_or(true, |v| v == route.version)
                    && e.soap_action == action
            })
            .map(|r| Arc::clone(&r.converter))
            .ok_or_else(|| {
                GatewayError::Routing(format!(
                    "{}/{}/{}/{} with action {}",
                    route.modus, route.version, route.protocol, route.endpoint, action
                ))
            })
    }

    /// No-op converter for the capability entry point.
    pub fn default_converter(&self) -> Arc<dyn Converter> {
        Arc::clone(&self.discovery)
    }

    pub fn entries(&self) -> impl Iterator<Item = &TranslationEntry> {
        self.registrations.iter().map(|r| &r.entry)
    }
}

fn build_converter(entry: &TranslationEntry) -> Result<Arc<dyn Converter>> {
    match entry.translation.as_str() {
        "GenereerZaakIdentificatie" => Ok(Arc::new(GenereerZaakIdentificatieConverter::new(entry))),
        "CreeerZaak" => Ok(Arc::new(CreeerZaakConverter::new(entry))),
        "GeefZaakdetails" => Ok(Arc::new(GeefZaakdetailsConverter::new(entry))),
        other => Err(GatewayError::Configuration(format!(
            "Unknown translation: {}",
            other
        ))),
    }
}
