// creeerZaak (zakLk01 kennisgeving) -> ZGW zaak creation -> Bv03 ack.

use serde_json::{Map, Value};

use crate::config::{HandlerCategory, TranslationEntry};
use crate::converter::Converter;
use crate::cycle::RequestResponseCycle;
use crate::errors::{GatewayError, Result};
use crate::zds;
use crate::zds::envelope::{element_blocks, element_text};
use crate::zds::model::{ZdsBv03, ZdsFo03, ZdsMessage};
use crate::zgw::model::{TranslationRequest, TranslationResult, ZgwOperation};

const ROOT: &str = "zakLk01";

#[derive(Debug)]
pub struct CreeerZaakConverter {
    resource: String,
    category: HandlerCategory,
}

impl CreeerZaakConverter {
    pub fn new(entry: &TranslationEntry) -> Self {
        Self {
            resource: entry.zgw_resource.clone(),
            category: entry.handler,
        }
    }
}

impl Converter for CreeerZaakConverter {
    fn name(&self) -> &'static str {
        "CreeerZaak"
    }

    fn category(&self) -> HandlerCategory {
        self.category
    }

    fn decode(&self, cycle: &RequestResponseCycle) -> Result<TranslationRequest> {
        let envelope = zds::parse_envelope(&cycle.body)?;
        if envelope.root != ROOT {
            return Err(GatewayError::Validation(format!(
                "Expected {}, got {}",
                ROOT, envelope.root
            )));
        }

        // A kennisgeving carries one or more object elements; the first one
        // holds the zaak being created.
        let objects = element_blocks(&envelope.body_xml, "object");
        let zaak = objects.first().ok_or_else(|| {
            GatewayError::Validation("zakLk01 without object element".to_string())
        })?;

        let identificatie = element_text(zaak, "identificatie")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                GatewayError::Validation("zaak object without identificatie".to_string())
            })?;

        let mut payload = Map::new();
        payload.insert("identificatie".to_string(), Value::String(identificatie));
        if let Some(org) = envelope
            .stuurgegevens
            .zender
            .as_ref()
            .and_then(|z| z.organisatie.clone())
            .filter(|o| !o.is_empty())
        {
            payload.insert("bronorganisatie".to_string(), Value::String(org));
        }
        for (element, field) in [
            ("omschrijving", "omschrijving"),
            ("toelichting", "toelichting"),
        ] {
            if let Some(value) = element_text(zaak, element).filter(|v| !v.is_empty()) {
                payload.insert(field.to_string(), Value::String(value));
            }
        }
        for (element, field) in [
            ("startdatum", "startdatum"),
            ("registratiedatum", "registratiedatum"),
        ] {
            if let Some(value) = element_text(zaak, element).filter(|v| !v.is_empty()) {
                payload.insert(field.to_string(), Value::String(zds::stuf_to_iso_date(&value)));
            }
        }

        Ok(TranslationRequest {
            operation: ZgwOperation::Create,
            resource: self.resource.clone(),
            query: vec![],
            payload: Some(Value::Object(payload)),
            referentienummer: cycle.referentienummer.clone(),
        })
    }

    fn encode(&self, cycle: &RequestResponseCycle, result: &TranslationResult) -> Result<String> {
        let stuurgegevens = zds::parse_envelope(&cycle.body)
            .map_err(|e| GatewayError::Translation(e.to_string()))?
            .stuurgegevens;

        if result.is_success() {
            let bv03 = ZdsBv03::new(&stuurgegevens, &cycle.referentienummer);
            zds::to_soap(ZdsMessage::Bv03(bv03))
        } else {
            let fo03 = ZdsFo03::reply(
                &stuurgegevens,
                &cycle.referentienummer,
                "StUF058",
                result.error_title().unwrap_or("Aanmaken zaak mislukt"),
                result.error_detail().map(str::to_string),
            );
            zds::to_soap(ZdsMessage::Fo03(fo03))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::RouteParams;
    use serde_json::json;

    const ZAK_LK01: &str = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <ZKN:zakLk01 xmlns:ZKN="http://www.egem.nl/StUF/sector/zkn/0310" xmlns:StUF="http://www.egem.nl/StUF/StUF0301">
      <ZKN:stuurgegevens>
        <StUF:berichtcode>Lk01</StUF:berichtcode>
        <StUF:zender><StUF:organisatie>0392</StUF:organisatie></StUF:zender>
        <StUF:ontvanger><StUF:applicatie>ZSH</StUF:applicatie></StUF:ontvanger>
        <StUF:referentienummer>ref-456</StUF:referentienummer>
        <StUF:entiteittype>ZAK</StUF:entiteittype>
      </ZKN:stuurgegevens>
      <ZKN:parameters><StUF:mutatiesoort>T</StUF:mutatiesoort></ZKN:parameters>
      <ZKN:object StUF:entiteittype="ZAK" StUF:verwerkingssoort="T">
        <ZKN:identificatie>ZAAK-2023-0001</ZKN:identificatie>
        <ZKN:omschrijving>Aanvraag kapvergunning</ZKN:omschrijving>
        <ZKN:startdatum>20230115</ZKN:startdatum>
        <ZKN:registratiedatum>20230116</ZKN:registratiedatum>
      </ZKN:object>
    </ZKN:zakLk01>
  </soapenv:Body>
</soapenv:Envelope>"#;

    fn converter() -> CreeerZaakConverter {
        CreeerZaakConverter {
            resource: "zaken".into(),
            category: HandlerCategory::Create,
        }
    }

    fn cycle(body: &str) -> RequestResponseCycle {
        RequestResponseCycle::new(
            RouteParams {
                modus: "prod".into(),
                version: "v1".into(),
                protocol: "zds".into(),
                endpoint: "zaak".into(),
            },
            "http://www.egem.nl/StUF/sector/zkn/0310/creeerZaak_Lk01",
            body.to_string(),
            "ref-456".into(),
        )
    }

    #[test]
    fn test_decode_builds_create_payload() {
        let request = converter().decode(&cycle(ZAK_LK01)).unwrap();
        assert_eq!(request.operation, ZgwOperation::Create);
        assert_eq!(request.resource, "zaken");
        let payload = request.payload.unwrap();
        assert_eq!(payload["identificatie"], json!("ZAAK-2023-0001"));
        assert_eq!(payload["bronorganisatie"], json!("0392"));
        assert_eq!(payload["omschrijving"], json!("Aanvraag kapvergunning"));
        assert_eq!(payload["startdatum"], json!("2023-01-15"));
        assert_eq!(payload["registratiedatum"], json!("2023-01-16"));
    }

    #[test]
    fn test_decode_requires_object() {
        let body = r#"<Envelope><Body><zakLk01><stuurgegevens><berichtcode>Lk01</berichtcode></stuurgegevens></zakLk01></Body></Envelope>"#;
        let err = converter().decode(&cycle(body)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_decode_requires_identificatie() {
        let body = ZAK_LK01.replace(
            "<ZKN:identificatie>ZAAK-2023-0001</ZKN:identificatie>",
            "",
        );
        let err = converter().decode(&cycle(&body)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_encode_success_is_bv03() {
        let result = TranslationResult {
            status: 201,
            body: json!({"identificatie": "ZAAK-2023-0001", "url": "http://zgw/zaken/1"}),
        };
        let xml = converter().encode(&cycle(ZAK_LK01), &result).unwrap();
        assert!(xml.contains("<StUF:Bv03Bericht>"));
        assert!(xml.contains("<StUF:referentienummer>ref-456</StUF:referentienummer>"));
    }

    #[test]
    fn test_encode_rejection_is_fo03() {
        let result = TranslationResult {
            status: 400,
            body: json!({"title": "Invalide resource", "detail": "zaaktype is verplicht"}),
        };
        let xml = converter().encode(&cycle(ZAK_LK01), &result).unwrap();
        assert!(xml.contains("<StUF:Fo03Bericht>"));
        assert!(xml.contains("zaaktype is verplicht"));
    }
}
