//! OAI-PMH response documents

use bibcat_rml::source::{ElementId, XmlDocument};

use crate::error::{HarvestError, Result};
use crate::state::ListingPage;

/// OAI-PMH error code for an empty result set
pub const NO_RECORDS_MATCH: &str = "noRecordsMatch";

/// Parse a response, surfacing any OAI-PMH `<error>` element
pub fn parse_response(text: &str) -> Result<XmlDocument> {
    let doc = XmlDocument::parse(text).map_err(|e| HarvestError::Xml(e.to_string()))?;
    let root = doc
        .root()
        .ok_or_else(|| HarvestError::Xml("empty response".to_string()))?;
    if let Some(error) = doc
        .child_elements(root)
        .find(|id| doc.element(*id).name.local == "error")
    {
        return Err(HarvestError::Protocol {
            code: attribute(&doc, error, "code").unwrap_or("unknown").to_string(),
            message: doc.text_content(error).trim().to_string(),
        });
    }
    Ok(doc)
}

/// Identifiers, resumption token and declared size of a `ListIdentifiers`
/// response
///
/// Headers with `status="deleted"` are skipped. A `noRecordsMatch` error is
/// an empty final page.
pub fn parse_list_identifiers(text: &str) -> Result<ListingPage> {
    let doc = match parse_response(text) {
        Ok(doc) => doc,
        Err(HarvestError::Protocol { code, .. }) if code == NO_RECORDS_MATCH => {
            return Ok(ListingPage::default());
        }
        Err(e) => return Err(e),
    };

    let mut page = ListingPage::default();
    for id in doc.descendants_or_self(XmlDocument::DOCUMENT) {
        match doc.element(id).name.local.as_str() {
            "header" => {
                if attribute(&doc, id, "status") == Some("deleted") {
                    continue;
                }
                let identifier = doc
                    .child_elements(id)
                    .find(|c| doc.element(*c).name.local == "identifier")
                    .map(|c| doc.text_content(c).trim().to_string())
                    .filter(|s| !s.is_empty());
                if let Some(identifier) = identifier {
                    page.identifiers.push(identifier);
                }
            }
            "resumptionToken" => {
                let token = doc.text_content(id).trim().to_string();
                page.resumption_token = (!token.is_empty()).then_some(token);
                page.complete_list_size = attribute(&doc, id, "completeListSize")
                    .map(|size| {
                        size.trim().parse::<usize>().map_err(|_| {
                            HarvestError::Xml(format!("invalid completeListSize {size:?}"))
                        })
                    })
                    .transpose()?;
            }
            _ => {}
        }
    }
    Ok(page)
}

fn attribute<'d>(doc: &'d XmlDocument, id: ElementId, local: &str) -> Option<&'d str> {
    doc.element(id)
        .attributes
        .iter()
        .find(|a| a.name.local == local)
        .map(|a| a.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2024-05-01T12:00:00Z</responseDate>
  <request verb="ListIdentifiers" metadataPrefix="mods">https://repo.example.edu/oai</request>
  <ListIdentifiers>
    <header><identifier>oai:repo:1</identifier><datestamp>2024-01-01</datestamp></header>
    <header status="deleted"><identifier>oai:repo:2</identifier></header>
    <header><identifier> oai:repo:3 </identifier></header>
    <resumptionToken completeListSize="25" cursor="0">mods/0/10</resumptionToken>
  </ListIdentifiers>
</OAI-PMH>"#;

    #[test]
    fn test_list_identifiers_page() {
        let page = parse_list_identifiers(PAGE).unwrap();
        assert_eq!(page.identifiers, vec!["oai:repo:1", "oai:repo:3"]);
        assert_eq!(page.resumption_token.as_deref(), Some("mods/0/10"));
        assert_eq!(page.complete_list_size, Some(25));
    }

    #[test]
    fn test_empty_token_ends_listing() {
        let text = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><ListIdentifiers>
            <header><identifier>oai:repo:9</identifier></header>
            <resumptionToken completeListSize="25" cursor="24"/>
        </ListIdentifiers></OAI-PMH>"#;
        let page = parse_list_identifiers(text).unwrap();
        assert_eq!(page.resumption_token, None);
        assert_eq!(page.complete_list_size, Some(25));
    }

    #[test]
    fn test_error_element() {
        let text = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
            <error code="badResumptionToken">The token has expired</error></OAI-PMH>"#;
        let err = parse_list_identifiers(text).unwrap_err();
        match err {
            HarvestError::Protocol { code, message } => {
                assert_eq!(code, "badResumptionToken");
                assert_eq!(message, "The token has expired");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_records_match_is_empty() {
        let text = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
            <error code="noRecordsMatch">No matching records</error></OAI-PMH>"#;
        assert_eq!(parse_list_identifiers(text).unwrap(), ListingPage::default());
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            parse_list_identifiers("<OAI-PMH><ListIdentifiers>"),
            Err(HarvestError::Xml(_))
        ));
    }
}
