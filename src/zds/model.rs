// Outbound ZDS message model. Headers are fixed per message type at
// construction and never mutated afterwards; a reply header copies the
// caller's referentienummer and swaps the sender/receiver roles.

use chrono::Utc;
use serde::Serialize;

use crate::zds::{NS_SOAPENV, NS_STUF, NS_ZKN};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ZdsPartij {
    #[serde(rename = "StUF:organisatie", skip_serializing_if = "Option::is_none")]
    pub organisatie: Option<String>,
    #[serde(rename = "StUF:applicatie", skip_serializing_if = "Option::is_none")]
    pub applicatie: Option<String>,
    #[serde(rename = "StUF:gebruiker", skip_serializing_if = "Option::is_none")]
    pub gebruiker: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ZdsStuurgegevens {
    #[serde(rename = "StUF:berichtcode")]
    pub berichtcode: String,
    #[serde(rename = "StUF:zender", skip_serializing_if = "Option::is_none")]
    pub zender: Option<ZdsPartij>,
    #[serde(rename = "StUF:ontvanger", skip_serializing_if = "Option::is_none")]
    pub ontvanger: Option<ZdsPartij>,
    #[serde(rename = "StUF:referentienummer", skip_serializing_if = "Option::is_none")]
    pub referentienummer: Option<String>,
    #[serde(rename = "StUF:tijdstipBericht", skip_serializing_if = "Option::is_none")]
    pub tijdstip_bericht: Option<String>,
    #[serde(rename = "StUF:functie", skip_serializing_if = "Option::is_none")]
    pub functie: Option<String>,
}

impl ZdsStuurgegevens {
    /// Reply header: zender/ontvanger swapped, referentienummer copied from
    /// the caller, tijdstip stamped now. The berichtcode is supplied by the
    /// message constructor and stays fixed for the message's lifetime.
    pub fn reply_to(inbound: &ZdsStuurgegevens, berichtcode: &str, referentienummer: &str) -> Self {
        Self {
            berichtcode: berichtcode.to_string(),
            zender: inbound.ontvanger.clone(),
            ontvanger: inbound.zender.clone(),
            referentienummer: Some(referentienummer.to_string()),
            tijdstip_bericht: Some(Utc::now().format("%Y%m%d%H%M%S").to_string()),
            functie: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ZdsZaakIdentificatie {
    #[serde(rename = "@StUF:entiteittype")]
    pub entiteittype: &'static str,
    #[serde(rename = "ZKN:identificatie")]
    pub identificatie: String,
}

/// genereerZaakIdentificatie_Du02: answer to a Di02 identification request.
#[derive(Debug, Serialize)]
pub struct ZdsGenereerZaakIdentificatieDu02 {
    #[serde(rename = "ZKN:stuurgegevens")]
    pub stuurgegevens: ZdsStuurgegevens,
    #[serde(rename = "ZKN:zaak")]
    pub zaak: ZdsZaakIdentificatie,
}

impl ZdsGenereerZaakIdentificatieDu02 {
    pub fn new(inbound: &ZdsStuurgegevens, referentienummer: &str, identificatie: String) -> Self {
        let mut stuurgegevens = ZdsStuurgegevens::reply_to(inbound, "Du02", referentienummer);
        stuurgegevens.functie = Some("genereerZaakidentificatie".to_string());
        Self {
            stuurgegevens,
            zaak: ZdsZaakIdentificatie {
                entiteittype: "ZAK",
                identificatie,
            },
        }
    }
}

/// Bv03Bericht: plain acknowledgement for kennisgeving messages.
#[derive(Debug, Serialize)]
pub struct ZdsBv03 {
    #[serde(rename = "StUF:stuurgegevens")]
    pub stuurgegevens: ZdsStuurgegevens,
}

impl ZdsBv03 {
    pub fn new(inbound: &ZdsStuurgegevens, referentienummer: &str) -> Self {
        Self {
            stuurgegevens: ZdsStuurgegevens::reply_to(inbound, "Bv03", referentienummer),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ZdsZaakObject {
    #[serde(rename = "@StUF:entiteittype")]
    pub entiteittype: &'static str,
    #[serde(rename = "ZKN:identificatie")]
    pub identificatie: String,
    #[serde(rename = "ZKN:omschrijving", skip_serializing_if = "Option::is_none")]
    pub omschrijving: Option<String>,
    #[serde(rename = "ZKN:startdatum", skip_serializing_if = "Option::is_none")]
    pub startdatum: Option<String>,
    #[serde(rename = "ZKN:registratiedatum", skip_serializing_if = "Option::is_none")]
    pub registratiedatum: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ZdsAntwoord {
    #[serde(rename = "ZKN:object", skip_serializing_if = "Vec::is_empty")]
    pub object: Vec<ZdsZaakObject>,
}

/// zakLa01: answer to a zakLv01 details query. An empty antwoord is a valid
/// answer for a query that matched nothing.
#[derive(Debug, Serialize)]
pub struct ZdsZakLa01 {
    #[serde(rename = "ZKN:stuurgegevens")]
    pub stuurgegevens: ZdsStuurgegevens,
    #[serde(rename = "ZKN:antwoord")]
    pub antwoord: ZdsAntwoord,
}

impl ZdsZakLa01 {
    pub fn new(inbound: &ZdsStuurgegevens, referentienummer: &str, object: Vec<ZdsZaakObject>) -> Self {
        Self {
            stuurgegevens: ZdsStuurgegevens::reply_to(inbound, "La01", referentienummer),
            antwoord: ZdsAntwoord { object },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ZdsFoutBody {
    #[serde(rename = "StUF:code")]
    pub code: String,
    #[serde(rename = "StUF:plek")]
    pub plek: String,
    #[serde(rename = "StUF:omschrijving")]
    pub omschrijving: String,
    #[serde(rename = "StUF:details", skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Fo03Bericht: StUF fault. Faults are data at the converter layer; the
/// transport boundary also renders one for errors raised out of the core.
#[derive(Debug, Serialize)]
pub struct ZdsFo03 {
    #[serde(rename = "StUF:stuurgegevens")]
    pub stuurgegevens: ZdsStuurgegevens,
    #[serde(rename = "StUF:body")]
    pub body: ZdsFoutBody,
}

impl ZdsFo03 {
    /// Fault for an error raised before any inbound header was decoded.
    pub fn bare(code: &str, omschrijving: &str) -> Self {
        Self {
            stuurgegevens: ZdsStuurgegevens {
                berichtcode: "Fo03".to_string(),
                tijdstip_bericht: Some(Utc::now().format("%Y%m%d%H%M%S").to_string()),
                ..Default::default()
            },
            body: ZdsFoutBody {
                code: code.to_string(),
                plek: "server".to_string(),
                omschrijving: omschrijving.to_string(),
                details: None,
            },
        }
    }

    /// Fault replying to a decoded message, carrying its correlation id.
    pub fn reply(
        inbound: &ZdsStuurgegevens,
        referentienummer: &str,
        code: &str,
        omschrijving: &str,
        details: Option<String>,
    ) -> Self {
        Self {
            stuurgegevens: ZdsStuurgegevens::reply_to(inbound, "Fo03", referentienummer),
            body: ZdsFoutBody {
                code: code.to_string(),
                plek: "server".to_string(),
                omschrijving: omschrijving.to_string(),
                details,
            },
        }
    }
}

/// Outbound message families. The serde variant name is the qualified
/// element the body carries.
#[derive(Debug, Serialize)]
pub enum ZdsMessage {
    #[serde(rename = "ZKN:genereerZaakIdentificatie_Du02")]
    GenereerZaakIdentificatieDu02(ZdsGenereerZaakIdentificatieDu02),
    #[serde(rename = "StUF:Bv03Bericht")]
    Bv03(ZdsBv03),
    #[serde(rename = "ZKN:zakLa01")]
    ZakLa01(ZdsZakLa01),
    #[serde(rename = "StUF:Fo03Bericht")]
    Fo03(ZdsFo03),
}

#[derive(Debug, Serialize)]
pub struct SoapBody {
    #[serde(rename = "$value")]
    message: ZdsMessage,
}

#[derive(Debug, Serialize)]
#[serde(rename = "soapenv:Envelope")]
pub struct SoapEnvelope {
    #[serde(rename = "@xmlns:soapenv")]
    xmlns_soapenv: &'static str,
    #[serde(rename = "@xmlns:StUF")]
    xmlns_stuf: &'static str,
    #[serde(rename = "@xmlns:ZKN")]
    xmlns_zkn: &'static str,
    #[serde(rename = "soapenv:Body")]
    body: SoapBody,
}

impl SoapEnvelope {
    pub fn new(message: ZdsMessage) -> Self {
        Self {
            xmlns_soapenv: NS_SOAPENV,
            xmlns_stuf: NS_STUF,
            xmlns_zkn: NS_ZKN,
            body: SoapBody { message },
        }
    }
}
