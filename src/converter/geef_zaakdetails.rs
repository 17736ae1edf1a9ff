// geefZaakdetails (zakLv01 vraag) -> ZGW zaak lookup -> zakLa01 antwoord.

use serde_json::Value;

use crate::config::{HandlerCategory, TranslationEntry};
use crate::converter::Converter;
use crate::cycle::RequestResponseCycle;
use crate::errors::{GatewayError, Result};
use crate::zds;
use crate::zds::envelope::{element_block, element_text};
use crate::zds::model::{ZdsFo03, ZdsMessage, ZdsZaakObject, ZdsZakLa01};
use crate::zgw::model::{TranslationRequest, TranslationResult, ZgwOperation};

const ROOT: &str = "zakLv01";

#[derive(Debug)]
pub struct GeefZaakdetailsConverter {
    resource: String,
    category: HandlerCategory,
}

impl GeefZaakdetailsConverter {
    pub fn new(entry: &TranslationEntry) -> Self {
        Self {
            resource: entry.zgw_resource.clone(),
            category: entry.handler,
        }
    }
}

impl Converter for GeefZaakdetailsConverter {
    fn name(&self) -> &'static str {
        "GeefZaakdetails"
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

        // the vraag selects on gelijk/identificatie
        let gelijk = element_block(&envelope.body_xml, "gelijk").ok_or_else(|| {
            GatewayError::Validation("zakLv01 without gelijk selection".to_string())
        })?;
        let identificatie = element_text(&gelijk, "identificatie")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                GatewayError::Validation("gelijk selection without identificatie".to_string())
            })?;

        Ok(TranslationRequest {
            operation: ZgwOperation::Retrieve,
            resource: self.resource.clone(),
            query: vec![("identificatie".to_string(), identificatie)],
            payload: None,
            referentienummer: cycle.referentienummer.clone(),
        })
    }

    fn encode(&self, cycle: &RequestResponseCycle, result: &TranslationResult) -> Result<String> {
        let stuurgegevens = zds::parse_envelope(&cycle.body)
            .map_err(|e| GatewayError::Translation(e.to_string()))?
            .stuurgegevens;

        // a miss is a valid empty antwoord, not a fault
        if result.status == 404 || (result.is_success() && result.first_result().is_none()) {
            let la01 = ZdsZakLa01::new(&stuurgegevens, &cycle.referentienummer, vec![]);
            return zds::to_soap(ZdsMessage::ZakLa01(la01));
        }

        if result.is_success() {
            let zaak = result.first_result().ok_or_else(|| {
                GatewayError::Translation("ZGW result carries no zaak".to_string())
            })?;
            let object = to_zaak_object(zaak);
            let la01 = ZdsZakLa01::new(&stuurgegevens, &cycle.referentienummer, vec![object]);
            zds::to_soap(ZdsMessage::ZakLa01(la01))
        } else {
            let fo03 = ZdsFo03::reply(
                &stuurgegevens,
                &cycle.referentienummer,
                "StUF058",
                result.error_title().unwrap_or("Ophalen zaakdetails mislukt"),
                result.error_detail().map(str::to_string),
            );
            zds::to_soap(ZdsMessage::Fo03(fo03))
        }
    }
}

fn to_zaak_object(zaak: &Value) -> ZdsZaakObject {
    let text = |field: &str| {
        zaak.get(field)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    ZdsZaakObject {
        entiteittype: "ZAK",
        identificatie: text("identificatie").unwrap_or_default(),
        omschrijving: text("omschrijving"),
        startdatum: text("startdatum").map(|d| zds::iso_to_stuf_date(&d)),
        registratiedatum: text("registratiedatum").map(|d| zds::iso_to_stuf_date(&d)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::RouteParams;
    use serde_json::json;

    const ZAK_LV01: &str = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <ZKN:zakLv01 xmlns:ZKN="http://www.egem.nl/StUF/sector/zkn/0310" xmlns:StUF="http://www.egem.nl/StUF/StUF0301">
      <ZKN:stuurgegevens>
        <StUF:berichtcode>Lv01</StUF:berichtcode>
        <StUF:zender><StUF:applicatie>ZSC</StUF:applicatie></StUF:zender>
        <StUF:ontvanger><StUF:applicatie>ZSH</StUF:applicatie></StUF:ontvanger>
        <StUF:referentienummer>ref-789</StUF:referentienummer>
      </ZKN:stuurgegevens>
      <ZKN:parameters><StUF:sortering>0</StUF:sortering><StUF:indicatorVervolgvraag>false</StUF:indicatorVervolgvraag></ZKN:parameters>
      <ZKN:gelijk StUF:entiteittype="ZAK">
        <ZKN:identificatie>ZAAK-2023-0001</ZKN:identificatie>
      </ZKN:gelijk>
    </ZKN:zakLv01>
  </soapenv:Body>
</soapenv:Envelope>"#;

    fn converter() -> GeefZaakdetailsConverter {
        GeefZaakdetailsConverter {
            resource: "zaken".into(),
            category: HandlerCategory::Retrieve,
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
            "http://www.egem.nl/StUF/sector/zkn/0310/geefZaakdetails_Lv01",
            body.to_string(),
            "ref-789".into(),
        )
    }

    #[test]
    fn test_decode_builds_retrieve_query() {
        let request = converter().decode(&cycle(ZAK_LV01)).unwrap();
        assert_eq!(request.operation, ZgwOperation::Retrieve);
        assert_eq!(
            request.query,
            vec![("identificatie".to_string(), "ZAAK-2023-0001".to_string())]
        );
        assert!(request.payload.is_none());
    }

    #[test]
    fn test_decode_requires_gelijk_identificatie() {
        let body = ZAK_LV01.replace(
            "<ZKN:identificatie>ZAAK-2023-0001</ZKN:identificatie>",
            "",
        );
        let err = converter().decode(&cycle(&body)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_encode_hit_maps_zaak_fields() {
        let result = TranslationResult {
            status: 200,
            body: json!({"count": 1, "results": [{
                "identificatie": "ZAAK-2023-0001",
                "omschrijving": "Aanvraag kapvergunning",
                "startdatum": "2023-01-15",
                "registratiedatum": "2023-01-16"
            }]}),
        };
        let xml = converter().encode(&cycle(ZAK_LV01), &result).unwrap();
        assert!(xml.contains("<StUF:berichtcode>La01</StUF:berichtcode>"));
        assert!(xml.contains("<ZKN:identificatie>ZAAK-2023-0001</ZKN:identificatie>"));
        assert!(xml.contains("<ZKN:startdatum>20230115</ZKN:startdatum>"));
        assert!(xml.contains("<ZKN:registratiedatum>20230116</ZKN:registratiedatum>"));
    }

    #[test]
    fn test_encode_miss_is_empty_antwoord() {
        let result = TranslationResult {
            status: 200,
            body: json!({"count": 0, "results": []}),
        };
        let xml = converter().encode(&cycle(ZAK_LV01), &result).unwrap();
        assert!(xml.contains("<StUF:berichtcode>La01</StUF:berichtcode>"));
        assert!(xml.contains("<ZKN:antwoord/>"));
        assert!(!xml.contains("<ZKN:object"));
    }

    #[test]
    fn test_encode_404_is_empty_antwoord() {
        let result = TranslationResult {
            status: 404,
            body: json!({"title": "Niet gevonden"}),
        };
        let xml = converter().encode(&cycle(ZAK_LV01), &result).unwrap();
        assert!(xml.contains("<StUF:berichtcode>La01</StUF:berichtcode>"));
        assert!(!xml.contains("Fo03"));
    }
}
