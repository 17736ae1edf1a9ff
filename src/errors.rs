use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::zds;

/// Gateway error taxonomy. Everything raised below the dispatcher travels
/// through unchanged; only the transport boundary maps kinds to responses.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No translation registered for the routing tuple / action.
    #[error("No translation for {0}")]
    Routing(String),

    /// Structurally malformed inbound envelope.
    #[error("Invalid request envelope: {0}")]
    Validation(String),

    /// Decode/encode failure inside a converter.
    #[error("Translation error: {0}")]
    Translation(String),

    /// The ZGW call itself failed (transport or server fault).
    #[error("ZGW call failed: {0}")]
    Downstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Anything else, wrapped so it is never silently dropped.
    #[error("Internal error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Downstream(err.to_string())
    }
}

impl GatewayError {
    /// StUF fault code carried in the Fo03 body.
    pub fn stuf_code(&self) -> &'static str {
        match self {
            GatewayError::Routing(_) => "StUF058",
            GatewayError::Validation(_) => "StUF055",
            GatewayError::Translation(_) => "StUF058",
            GatewayError::Downstream(_) => "StUF046",
            GatewayError::Database(_) | GatewayError::Configuration(_) | GatewayError::Unknown(_) => {
                "StUF058"
            }
        }
    }
}

// Transport boundary: map error kinds onto protocol-appropriate fault
// responses. The body is always a ZDS Fo03 fault envelope.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Routing(_) => StatusCode::NOT_FOUND,
            GatewayError::Downstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Translation(_)
            | GatewayError::Database(_)
            | GatewayError::Configuration(_)
            | GatewayError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let fault = zds::model::ZdsFo03::bare(self.stuf_code(), &self.to_string());
        let body = zds::to_soap(zds::model::ZdsMessage::Fo03(fault))
            .unwrap_or_else(|_| String::from("<Fo03Bericht/>"));

        (status, [(header::CONTENT_TYPE, "text/xml; charset=utf-8")], body).into_response()
    }
}
