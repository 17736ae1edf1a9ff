// ZDS (StUF) message support: envelope reading and response generation for
// the message families the gateway translates.

pub mod envelope;
pub mod model;

pub use envelope::{parse_envelope, peek_referentienummer, ZdsEnvelope};
pub use model::{SoapEnvelope, ZdsMessage, ZdsStuurgegevens};

use crate::errors::{GatewayError, Result};

// StUF namespaces, fixed per sector model.
pub const NS_SOAPENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const NS_STUF: &str = "http://www.egem.nl/StUF/StUF0301";
pub const NS_ZKN: &str = "http://www.egem.nl/StUF/sector/zkn/0310";

/// Serialize an outbound message into a full SOAP envelope.
pub fn to_soap(message: ZdsMessage) -> Result<String> {
    let envelope = SoapEnvelope::new(message);
    let xml = quick_xml::se::to_string(&envelope)
        .map_err(|e| GatewayError::Translation(format!("Failed to serialize envelope: {}", e)))?;
    Ok(format!(r#"<?xml version="1.0" encoding="UTF-8"?>{}"#, xml))
}

/// StUF date (yyyymmdd) to ZGW date (yyyy-mm-dd). Anything that is not an
/// eight-digit date passes through untouched; value validation is not this
/// gateway's job.
pub fn stuf_to_iso_date(value: &str) -> String {
    let v = value.trim();
    if v.len() == 8 && v.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &v[0..4], &v[4..6], &v[6..8])
    } else {
        v.to_string()
    }
}

/// ZGW date (yyyy-mm-dd) to StUF date (yyyymmdd).
pub fn iso_to_stuf_date(value: &str) -> String {
    let v = value.trim();
    if v.len() == 10 && v.as_bytes()[4] == b'-' && v.as_bytes()[7] == b'-' {
        format!("{}{}{}", &v[0..4], &v[5..7], &v[8..10])
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_conversions() {
        assert_eq!(stuf_to_iso_date("20230115"), "2023-01-15");
        assert_eq!(iso_to_stuf_date("2023-01-15"), "20230115");
        // lenient passthrough for anything else
        assert_eq!(stuf_to_iso_date("next week"), "next week");
        assert_eq!(iso_to_stuf_date(""), "");
    }
}
