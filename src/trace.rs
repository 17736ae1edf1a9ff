// Per-request trace recorder. One span per request/response cycle:
// open -> {input, info, output}* -> (end | abort) -> close.
//
// The tracer is an observability sink: implementations must never raise.
// A sink failure is worth at most a low-priority log line and must never
// mask the request error it was recording.

use tracing::{debug, trace};

/// One request's span. Exactly one of `end`/`abort` fires per span, and
/// `close` is always the last call regardless of which terminal fired.
pub trait TraceSpan: Send {
    fn input(&mut self, key: &str, value: &str);
    fn info(&mut self, key: &str, value: &str);
    fn output(&mut self, key: &str, value: &str);
    fn end(&mut self, report: &str, payload: &str);
    fn abort(&mut self, report: &str, detail: &str);
    fn close(&mut self);
}

/// Opens spans. Each request gets its own span instance; span state never
/// leaks across requests.
pub trait Tracer: Send + Sync {
    fn open(&self, report: &str, payload: &str, referentienummer: &str) -> Box<dyn TraceSpan>;
}

/// Default tracer: renders span events onto the `tracing` subscriber, tagged
/// with the correlation id so concurrent requests stay distinguishable.
pub struct LogTracer;

impl Tracer for LogTracer {
    fn open(&self, report: &str, payload: &str, referentienummer: &str) -> Box<dyn TraceSpan> {
        debug!(
            target: "zdsbrug::trace",
            referentienummer,
            report,
            payload_bytes = payload.len(),
            "open"
        );
        Box::new(LogSpan {
            referentienummer: referentienummer.to_string(),
            terminated: false,
            closed: false,
        })
    }
}

struct LogSpan {
    referentienummer: String,
    terminated: bool,
    closed: bool,
}

impl LogSpan {
    fn event(&self, kind: &str, key: &str, value: &str) {
        if self.closed {
            // Misuse is not worth failing a request over.
            trace!(target: "zdsbrug::trace", referentienummer = %self.referentienummer, kind, "event after close dropped");
            return;
        }
        debug!(
            target: "zdsbrug::trace",
            referentienummer = %self.referentienummer,
            key,
            value,
            "{}", kind
        );
    }
}

impl TraceSpan for LogSpan {
    fn input(&mut self, key: &str, value: &str) {
        self.event("input", key, value);
    }

    fn info(&mut self, key: &str, value: &str) {
        self.event("info", key, value);
    }

    fn output(&mut self, key: &str, value: &str) {
        self.event("output", key, value);
    }

    fn end(&mut self, report: &str, payload: &str) {
        if self.terminated || self.closed {
            trace!(target: "zdsbrug::trace", referentienummer = %self.referentienummer, "duplicate terminal event dropped");
            return;
        }
        self.terminated = true;
        debug!(
            target: "zdsbrug::trace",
            referentienummer = %self.referentienummer,
            report,
            payload_bytes = payload.len(),
            "end"
        );
    }

    fn abort(&mut self, report: &str, detail: &str) {
        if self.terminated || self.closed {
            trace!(target: "zdsbrug::trace", referentienummer = %self.referentienummer, "duplicate terminal event dropped");
            return;
        }
        self.terminated = true;
        debug!(
            target: "zdsbrug::trace",
            referentienummer = %self.referentienummer,
            report,
            detail,
            "abort"
        );
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if !self.terminated {
            trace!(target: "zdsbrug::trace", referentienummer = %self.referentienummer, "span closed without terminal event");
        }
        debug!(target: "zdsbrug::trace", referentienummer = %self.referentienummer, "close");
    }
}

// Scoped-resource backstop: the span closes even if an error unwinds past
// the dispatcher.
impl Drop for LogSpan {
    fn drop(&mut self) {
        if !self.closed {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_span_accepts_full_lifecycle() {
        let tracer = LogTracer;
        let mut span = tracer.open("prod/v1/zds/zaak:di02", "<xml/>", "zb-1");
        span.input("modus", "prod");
        span.info("referentienummer", "zb-1");
        span.output("statusCode", "200");
        span.end("prod/v1/zds/zaak:di02", "<xml/>");
        span.close();
        // second close is a no-op, not a panic
        span.close();
    }

    #[test]
    fn test_log_span_swallows_events_after_close() {
        let tracer = LogTracer;
        let mut span = tracer.open("r", "", "zb-2");
        span.abort("r", "boom");
        span.close();
        span.info("late", "event");
        span.end("r", "late terminal");
    }
}
