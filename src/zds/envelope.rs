// SOAP envelope reader. Inbound ZDS traffic arrives with whatever namespace
// prefixes the sending application chose, so matching happens on local names
// via the event reader rather than through serde.

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::errors::{GatewayError, Result};
use crate::zds::model::{ZdsPartij, ZdsStuurgegevens};

/// Structurally parsed inbound message: the payload root element, the
/// stuurgegevens header, and the raw payload XML for family-specific decode.
#[derive(Debug, Clone)]
pub struct ZdsEnvelope {
    /// Local name of the message root inside the SOAP body,
    /// e.g. "zakLk01" or "genereerZaakIdentificatie_Di02".
    pub root: String,
    pub stuurgegevens: ZdsStuurgegevens,
    /// Inner XML of the message root element.
    pub body_xml: String,
}

fn local_of(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.local_name().as_ref()).into_owned()
}

/// Parse the SOAP envelope and the StUF header. Structural checks only:
/// a Body, a message root, a stuurgegevens block and a berichtcode element
/// must be present.
pub fn parse_envelope(xml: &str) -> Result<ZdsEnvelope> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_body = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = local_of(e.name());
                if !in_body {
                    if local == "Body" {
                        in_body = true;
                    }
                } else {
                    let root = local;
                    let span = reader.read_to_end(e.name()).map_err(|e| {
                        GatewayError::Validation(format!("Unclosed message element: {}", e))
                    })?;
                    let body_xml = xml[span].to_string();
                    let stuurgegevens = read_stuurgegevens(&body_xml)?;
                    return Ok(ZdsEnvelope {
                        root,
                        stuurgegevens,
                        body_xml,
                    });
                }
            }
            Ok(Event::Empty(e)) if in_body => {
                let root = local_of(e.name());
                // an empty message root cannot carry stuurgegevens
                return Err(GatewayError::Validation(format!(
                    "Message {} has no stuurgegevens",
                    root
                )));
            }
            Ok(Event::Eof) => {
                return Err(GatewayError::Validation(if in_body {
                    "SOAP Body is empty".to_string()
                } else {
                    "No SOAP Body element".to_string()
                }));
            }
            Err(e) => {
                return Err(GatewayError::Validation(format!("Malformed XML: {}", e)));
            }
            _ => {}
        }
    }
}

fn read_stuurgegevens(body_xml: &str) -> Result<ZdsStuurgegevens> {
    let block = element_block(body_xml, "stuurgegevens")
        .ok_or_else(|| GatewayError::Validation("Missing stuurgegevens".to_string()))?;

    let berichtcode = element_text(&block, "berichtcode")
        .ok_or_else(|| GatewayError::Validation("Missing berichtcode".to_string()))?;

    Ok(ZdsStuurgegevens {
        berichtcode,
        zender: element_block(&block, "zender").map(|b| read_partij(&b)),
        ontvanger: element_block(&block, "ontvanger").map(|b| read_partij(&b)),
        referentienummer: element_text(&block, "referentienummer"),
        tijdstip_bericht: element_text(&block, "tijdstipBericht"),
        functie: element_text(&block, "functie"),
    })
}

fn read_partij(block: &str) -> ZdsPartij {
    ZdsPartij {
        organisatie: element_text(block, "organisatie"),
        applicatie: element_text(block, "applicatie"),
        gebruiker: element_text(block, "gebruiker"),
    }
}

/// Correlation id carried in the inbound header, if any. Lenient: a
/// malformed envelope yields None here and a proper validation error later,
/// during decode.
pub fn peek_referentienummer(xml: &str) -> Option<String> {
    element_text(xml, "referentienummer").filter(|v| !v.is_empty())
}

/// Text content of the first element with the given local name. Empty
/// elements yield an empty string; absent elements yield None.
pub fn element_text(xml: &str, local: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if local_of(e.name()) == local => {
                let raw = reader.read_text(e.name()).ok()?;
                let trimmed = raw.trim();
                return Some(
                    quick_xml::escape::unescape(trimmed)
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| trimmed.to_string()),
                );
            }
            Ok(Event::Empty(e)) if local_of(e.name()) == local => return Some(String::new()),
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Raw inner XML of the first element with the given local name.
pub fn element_block(xml: &str, local: &str) -> Option<String> {
    element_blocks_limited(xml, local, 1).into_iter().next()
}

/// Raw inner XML of every element with the given local name, in document
/// order. Nested occurrences inside a match are not revisited.
pub fn element_blocks(xml: &str, local: &str) -> Vec<String> {
    element_blocks_limited(xml, local, usize::MAX)
}

fn element_blocks_limited(xml: &str, local: &str, limit: usize) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut blocks = Vec::new();
    loop {
        if blocks.len() >= limit {
            return blocks;
        }
        match reader.read_event() {
            Ok(Event::Start(e)) if local_of(e.name()) == local => {
                match reader.read_to_end(e.name()) {
                    Ok(span) => blocks.push(xml[span].to_string()),
                    Err(_) => return blocks,
                }
            }
            Ok(Event::Empty(e)) if local_of(e.name()) == local => blocks.push(String::new()),
            Ok(Event::Eof) | Err(_) => return blocks,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DI02: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Header/>
  <soapenv:Body>
    <ZKN:genereerZaakIdentificatie_Di02 xmlns:ZKN="http://www.egem.nl/StUF/sector/zkn/0310" xmlns:StUF="http://www.egem.nl/StUF/StUF0301">
      <ZKN:stuurgegevens>
        <StUF:berichtcode>Di02</StUF:berichtcode>
        <StUF:zender>
          <StUF:organisatie>0392</StUF:organisatie>
          <StUF:applicatie>ZSC</StUF:applicatie>
        </StUF:zender>
        <StUF:ontvanger>
          <StUF:applicatie>ZSH</StUF:applicatie>
        </StUF:ontvanger>
        <StUF:referentienummer>ref-123</StUF:referentienummer>
        <StUF:tijdstipBericht>20230101120000</StUF:tijdstipBericht>
        <StUF:functie>genereerZaakidentificatie</StUF:functie>
      </ZKN:stuurgegevens>
    </ZKN:genereerZaakIdentificatie_Di02>
  </soapenv:Body>
</soapenv:Envelope>"#;

    #[test]
    fn test_parse_envelope() {
        let envelope = parse_envelope(DI02).unwrap();
        assert_eq!(envelope.root, "genereerZaakIdentificatie_Di02");
        assert_eq!(envelope.stuurgegevens.berichtcode, "Di02");
        assert_eq!(
            envelope.stuurgegevens.referentienummer.as_deref(),
            Some("ref-123")
        );
        assert_eq!(
            envelope.stuurgegevens.functie.as_deref(),
            Some("genereerZaakidentificatie")
        );
        let zender = envelope.stuurgegevens.zender.as_ref().unwrap();
        assert_eq!(zender.organisatie.as_deref(), Some("0392"));
        assert_eq!(zender.applicatie.as_deref(), Some("ZSC"));
    }

    #[test]
    fn test_parse_envelope_ignores_prefix_choice() {
        // same message, different prefixes
        let xml = DI02
            .replace("soapenv:", "s:")
            .replace("xmlns:soapenv", "xmlns:s")
            .replace("ZKN:", "z:")
            .replace("xmlns:ZKN", "xmlns:z")
            .replace("StUF:", "stuf:")
            .replace("xmlns:StUF", "xmlns:stuf");
        let envelope = parse_envelope(&xml).unwrap();
        assert_eq!(envelope.root, "genereerZaakIdentificatie_Di02");
        assert_eq!(envelope.stuurgegevens.berichtcode, "Di02");
    }

    #[test]
    fn test_missing_body_is_validation_error() {
        let xml = r#"<Envelope><Header/></Envelope>"#;
        let err = parse_envelope(xml).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_missing_stuurgegevens_is_validation_error() {
        let xml = r#"<Envelope><Body><zakLk01><object/></zakLk01></Body></Envelope>"#;
        let err = parse_envelope(xml).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_missing_berichtcode_is_validation_error() {
        let xml = r#"<Envelope><Body><zakLk01><stuurgegevens><referentienummer>x</referentienummer></stuurgegevens></zakLk01></Body></Envelope>"#;
        let err = parse_envelope(xml).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_empty_berichtcode_is_structurally_valid() {
        let xml = r#"<Envelope><Body><zakLk01><stuurgegevens><berichtcode/></stuurgegevens></zakLk01></Body></Envelope>"#;
        let envelope = parse_envelope(xml).unwrap();
        assert_eq!(envelope.stuurgegevens.berichtcode, "");
    }

    #[test]
    fn test_malformed_xml_is_validation_error() {
        let err = parse_envelope("<Envelope><Body><zakLk01>").unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_peek_referentienummer() {
        assert_eq!(peek_referentienummer(DI02).as_deref(), Some("ref-123"));
        assert_eq!(peek_referentienummer("<not-xml"), None);
        assert_eq!(peek_referentienummer("<a><referentienummer/></a>"), None);
    }

    #[test]
    fn test_element_blocks() {
        let xml = r#"<a><object><id>1</id></object><object><id>2</id></object></a>"#;
        let blocks = element_blocks(xml, "object");
        assert_eq!(blocks.len(), 2);
        assert_eq!(element_text(&blocks[0], "id").as_deref(), Some("1"));
        assert_eq!(element_text(&blocks[1], "id").as_deref(), Some("2"));
    }

    #[test]
    fn test_element_text_unescapes() {
        let xml = r#"<a><omschrijving>Aanvraag &amp; toekenning</omschrijving></a>"#;
        assert_eq!(
            element_text(xml, "omschrijving").as_deref(),
            Some("Aanvraag & toekenning")
        );
    }
}
