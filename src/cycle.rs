// Request/response cycle - the per-request context threaded through the
// dispatch pipeline and persisted for audit.

use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

/// Lifecycle of one request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Envelope accepted, nothing resolved yet.
    Received,
    /// Pre-execution snapshot persisted.
    Registered,
    /// Handler execution in flight.
    Executing,
    Completed,
    Failed,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Received => "RECEIVED",
            CycleStatus::Registered => "REGISTERED",
            CycleStatus::Executing => "EXECUTING",
            CycleStatus::Completed => "COMPLETED",
            CycleStatus::Failed => "FAILED",
        }
    }
}

/// Response produced by a request handler: the encoded outbound envelope and
/// the status code the transport should reply with.
#[derive(Debug, Clone)]
pub struct TranslationResponse {
    pub status_code: u16,
    pub body: String,
}

/// Routing parameters taken from the request path.
#[derive(Debug, Clone)]
pub struct RouteParams {
    pub modus: String,
    pub version: String,
    pub protocol: String,
    pub endpoint: String,
}

/// Per-request context. Created once per inbound request, exclusively owned
/// by the dispatcher, passed by reference to handler and store.
#[derive(Debug)]
pub struct RequestResponseCycle {
    pub modus: String,
    pub version: String,
    pub protocol: String,
    pub endpoint: String,
    /// Derived `modus/version/protocol/endpoint`.
    pub path: String,
    /// SOAPAction with the surrounding quotes stripped.
    pub soap_action: String,
    /// Raw inbound envelope text, kept opaque here.
    pub body: String,
    /// Correlation id, caller-supplied or generated. Immutable once set.
    pub referentienummer: String,
    pub started_at: DateTime<Utc>,
    start_instant: Instant,
    pub status: CycleStatus,
    response: Option<TranslationResponse>,
    /// Business reference extracted from the ZGW result, for observability.
    pub kenmerk: Option<String>,
}

/// Fresh correlation id for requests that did not supply one. Unique per
/// process lifetime.
pub fn new_referentienummer() -> String {
    format!("zb-{}", Uuid::new_v4())
}

impl RequestResponseCycle {
    pub fn new(route: RouteParams, soap_action: &str, body: String, referentienummer: String) -> Self {
        let path = format!(
            "{}/{}/{}/{}",
            route.modus, route.version, route.protocol, route.endpoint
        );
        Self {
            modus: route.modus,
            version: route.version,
            protocol: route.protocol,
            endpoint: route.endpoint,
            path,
            soap_action: soap_action.replace('"', ""),
            body,
            referentienummer,
            started_at: Utc::now(),
            start_instant: Instant::now(),
            status: CycleStatus::Received,
            response: None,
            kenmerk: None,
        }
    }

    pub fn route(&self) -> RouteParams {
        RouteParams {
            modus: self.modus.clone(),
            version: self.version.clone(),
            protocol: self.protocol.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    /// Trace report label, derived from the action's message name.
    pub fn report_name(&self) -> String {
        format!("{}:{}", self.path, self.action_name())
    }

    /// Last segment of the (URL-shaped) SOAP action, e.g.
    /// "genereerZaakIdentificatie_Di02".
    pub fn action_name(&self) -> &str {
        self.soap_action
            .rsplit('/')
            .next()
            .unwrap_or(self.soap_action.as_str())
    }

    pub fn duration_in_milliseconds(&self) -> u128 {
        self.start_instant.elapsed().as_millis()
    }

    /// Write-once: a second set is ignored.
    pub fn set_response(&mut self, response: TranslationResponse) {
        if self.response.is_some() {
            warn!(
                referentienummer = %self.referentienummer,
                "response already set on cycle, ignoring second write"
            );
            return;
        }
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&TranslationResponse> {
        self.response.as_ref()
    }
}
