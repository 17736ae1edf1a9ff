// genereerZaakIdentificatie_Di02 -> ZGW identification generator -> Du02.

use serde_json::json;

use crate::config::{HandlerCategory, TranslationEntry};
use crate::converter::Converter;
use crate::cycle::RequestResponseCycle;
use crate::errors::{GatewayError, Result};
use crate::zds;
use crate::zds::model::{ZdsFo03, ZdsGenereerZaakIdentificatieDu02, ZdsMessage};
use crate::zgw::model::{TranslationRequest, TranslationResult, ZgwOperation};

const ROOT: &str = "genereerZaakIdentificatie_Di02";

#[derive(Debug)]
pub struct GenereerZaakIdentificatieConverter {
    resource: String,
    category: HandlerCategory,
}

impl GenereerZaakIdentificatieConverter {
    pub fn new(entry: &TranslationEntry) -> Self {
        Self {
            resource: entry.zgw_resource.clone(),
            category: entry.handler,
        }
    }
}

impl Converter for GenereerZaakIdentificatieConverter {
    fn name(&self) -> &'static str {
        "GenereerZaakIdentificatie"
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

        let bronorganisatie = envelope
            .stuurgegevens
            .zender
            .as_ref()
            .and_then(|z| z.organisatie.clone())
            .filter(|o| !o.is_empty());

        Ok(TranslationRequest {
            operation: ZgwOperation::Generate,
            resource: self.resource.clone(),
            query: vec![],
            payload: Some(match bronorganisatie {
                Some(org) => json!({ "bronorganisatie": org }),
                None => json!({}),
            }),
            referentienummer: cycle.referentienummer.clone(),
        })
    }

    fn encode(&self, cycle: &RequestResponseCycle, result: &TranslationResult) -> Result<String> {
        let stuurgegevens = zds::parse_envelope(&cycle.body)
            .map_err(|e| GatewayError::Translation(e.to_string()))?
            .stuurgegevens;

        if result.is_success() {
            let identificatie = result.identificatie().ok_or_else(|| {
                GatewayError::Translation("ZGW result carries no identificatie".to_string())
            })?;
            let du02 = ZdsGenereerZaakIdentificatieDu02::new(
                &stuurgegevens,
                &cycle.referentienummer,
                identificatie.to_string(),
            );
            zds::to_soap(ZdsMessage::GenereerZaakIdentificatieDu02(du02))
        } else {
            let fo03 = ZdsFo03::reply(
                &stuurgegevens,
                &cycle.referentienummer,
                "StUF058",
                result.error_title().unwrap_or("Genereren zaakidentificatie mislukt"),
                result.error_detail().map(str::to_string),
            );
            zds::to_soap(ZdsMessage::Fo03(fo03))
        }
    }
}
