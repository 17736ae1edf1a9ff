// Canonical translation model - the single representation between the ZDS
// decode step and the ZGW call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of target-protocol operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZgwOperation {
    /// POST against a generator resource, no body to speak of.
    Generate,
    /// POST creating a resource.
    Create,
    /// GET with query parameters.
    Retrieve,
}

/// Canonical request produced by a converter's decode step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub operation: ZgwOperation,
    /// Resource path under the ZGW base url, e.g. "zaken".
    pub resource: String,
    #[serde(default)]
    pub query: Vec<(String, String)>,
    #[serde(default)]
    pub payload: Option<Value>,
    /// Correlation id, attached to the outbound call for log correlation.
    pub referentienummer: String,
}

/// Canonical result of a ZGW call. HTTP-level error responses arrive here
/// as data; only transport and server failures are raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub status: u16,
    pub body: Value,
}

impl TranslationResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Business identification of the (first) resource in the result,
    /// whether the body is a single object or a paginated list.
    pub fn identificatie(&self) -> Option<&str> {
        if let Some(id) = self.body.get("identificatie").and_then(Value::as_str) {
            return Some(id);
        }
        self.body
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|first| first.get("identificatie"))
            .and_then(Value::as_str)
    }

    /// First result object, for list-shaped responses.
    pub fn first_result(&self) -> Option<&Value> {
        match self.body.get("results").and_then(Value::as_array) {
            Some(results) => results.first(),
            None if self.body.is_object() => Some(&self.body),
            None => None,
        }
    }

    /// Problem title of an error payload (ZGW error bodies follow RFC 7807).
    pub fn error_title(&self) -> Option<&str> {
        self.body.get("title").and_then(Value::as_str)
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.body.get("detail").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identificatie_from_object() {
        let result = TranslationResult {
            status: 201,
            body: json!({"identificatie": "ZAAK-001", "url": "http://zgw/zaken/1"}),
        };
        assert!(result.is_success());
        assert_eq!(result.identificatie(), Some("ZAAK-001"));
    }

    #[test]
    fn test_identificatie_from_list() {
        let result = TranslationResult {
            status: 200,
            body: json!({"count": 1, "results": [{"identificatie": "ZAAK-002"}]}),
        };
        assert_eq!(result.identificatie(), Some("ZAAK-002"));
        assert_eq!(
            result.first_result().unwrap()["identificatie"],
            json!("ZAAK-002")
        );
    }

    #[test]
    fn test_error_payload_accessors() {
        let result = TranslationResult {
            status: 400,
            body: json!({"title": "Invalide resource", "detail": "startdatum is verplicht"}),
        };
        assert!(!result.is_success());
        assert_eq!(result.error_title(), Some("Invalide resource"));
        assert_eq!(result.error_detail(), Some("startdatum is verplicht"));
        assert_eq!(result.identificatie(), None);
    }
}
