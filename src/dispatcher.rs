// Dispatcher - orchestrates one request/response cycle: resolution, the
// pre/post persistence writes, handler execution and the trace span that
// brackets all of it.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::converter::ConverterFactory;
use crate::cycle::{self, CycleStatus, RequestResponseCycle, RouteParams, TranslationResponse};
use crate::errors::Result;
use crate::requesthandler::RequestHandlerFactory;
use crate::trace::{TraceSpan, Tracer};
use crate::zds;

/// One row of the capability listing served on the bare entry point.
#[derive(Debug, Serialize)]
pub struct CapabilityEntry {
    pub path: String,
    pub soapaction: String,
    pub translation: String,
    pub handler: &'static str,
}

pub struct Dispatcher {
    converters: ConverterFactory,
    handlers: RequestHandlerFactory,
    tracer: Arc<dyn Tracer>,
}

impl Dispatcher {
    pub fn new(
        converters: ConverterFactory,
        handlers: RequestHandlerFactory,
        tracer: Arc<dyn Tracer>,
    ) -> Self {
        Self {
            converters,
            handlers,
            tracer,
        }
    }

    /// Translate one inbound envelope. The correlation id is taken from the
    /// caller, else from the envelope header, else freshly generated before
    /// any tracing begins.
    pub async fn handle(
        &self,
        route: RouteParams,
        soap_action: &str,
        body: String,
        referentienummer: Option<String>,
    ) -> Result<TranslationResponse> {
        let referentienummer = referentienummer
            .filter(|r| !r.is_empty())
            .or_else(|| zds::peek_referentienummer(&body))
            .unwrap_or_else(cycle::new_referentienummer);

        let mut cycle = RequestResponseCycle::new(route, soap_action, body, referentienummer);

        info!(
            path = %cycle.path,
            soap_action = %cycle.soap_action,
            referentienummer = %cycle.referentienummer,
            "processing request"
        );

        let report = cycle.report_name();
        let mut span = self.tracer.open(&report, &cycle.body, &cycle.referentienummer);
        span.input("modus", &cycle.modus);
        span.input("version", &cycle.version);
        span.input("protocol", &cycle.protocol);
        span.input("endpoint", &cycle.endpoint);
        span.input("soapAction", &cycle.soap_action);
        span.info("referentienummer", &cycle.referentienummer);

        // Errors from anywhere below are annotated here exactly once and
        // re-raised unchanged; the span closes on every exit path.
        match self.process(&mut cycle, span.as_mut()).await {
            Ok(response) => {
                span.close();
                Ok(response)
            }
            Err(err) => {
                cycle.status = CycleStatus::Failed;
                error!(
                    referentienummer = %cycle.referentienummer,
                    error = %err,
                    "request failed"
                );
                span.abort(&report, &err.to_string());
                span.close();
                Err(err)
            }
        }
    }

    async fn process(
        &self,
        cycle: &mut RequestResponseCycle,
        span: &mut dyn TraceSpan,
    ) -> Result<TranslationResponse> {
        let converter = self.converters.resolve(&cycle.route(), &cycle.soap_action)?;
        let handler = self.handlers.resolve(Arc::clone(&converter))?;
        crate::metrics::METRICS.track_translation(converter.name());

        // pre-save: execution requires a durable pre-state, so this one is
        // fatal on failure
        cycle.status = CycleStatus::Registered;
        handler.save(cycle).await?;

        span.info("converter", converter.name());
        span.info("handler", handler.name());
        span.info("path", &cycle.path);

        cycle.status = CycleStatus::Executing;
        let response = handler.execute(cycle).await?;

        span.output("statusCode", &response.status_code.to_string());
        span.output("kenmerk", cycle.kenmerk.as_deref().unwrap_or(""));
        span.info(
            "duration",
            &format!("{} ms", cycle.duration_in_milliseconds()),
        );
        // the end event reuses the response body computed above
        span.end(&cycle.report_name(), &response.body);

        cycle.set_response(response.clone());
        cycle.status = CycleStatus::Completed;
        if let Err(err) = handler.save(cycle).await {
            // a finished translation is not failed retroactively by an
            // audit write; trace it and return the response anyway
            warn!(
                referentienummer = %cycle.referentienummer,
                error = %err,
                "post-execution save failed"
            );
        }

        Ok(response)
    }

    /// Capability enumeration for the bare entry point. Resolves the
    /// default converter/handler pair but executes nothing and touches
    /// neither store nor tracer.
    pub fn capabilities(&self) -> Result<Vec<CapabilityEntry>> {
        let converter = self.converters.default_converter();
        let handler = self.handlers.resolve(converter)?;
        debug!(handler = handler.name(), "enumerating capabilities");

        Ok(self
            .converters
            .entries()
            .map(|entry| CapabilityEntry {
                path: format!(
                    "/{}/{}/{}/{}",
                    entry.modus.as_deref().unwrap_or("{modus}"),
                    entry.version.as_deref().unwrap_or("{version}"),
                    entry.protocol,
                    entry.endpoint
                ),
                soapaction: entry.soap_action.clone(),
                translation: entry.translation.clone(),
                handler: entry.handler.as_str(),
            })
            .collect())
    }
}
