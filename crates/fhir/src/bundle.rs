//! FHIR `Bundle` parsing.

use crate::resources::Resource;
use crate::{FhirError, FhirResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: Option<String>,
    pub resource: Option<Resource>,
}

impl BundleEntry {
    /// Key other entries use to reference this one.
    ///
    /// Synthea references entries by the uuid in `fullUrl`; other producers use the resource id.
    pub fn local_id(&self) -> Option<&str> {
        self.full_url
            .as_deref()
            .and_then(|u| u.strip_prefix("urn:uuid:"))
            .or_else(|| self.resource.as_ref().and_then(Resource::id))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// Parse a bundle from JSON text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `entry[3].resource`)
    /// to the failing field when the JSON does not match the wire schema.
    ///
    /// # Errors
    ///
    /// - [`FhirError::InvalidJson`] if the text is not well-formed JSON,
    /// - [`FhirError::Translation`] if the JSON does not match the wire schema,
    /// - [`FhirError::InvalidInput`] if the document is not a `Bundle`.
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let bundle = match serde_path_to_error::deserialize::<_, Bundle>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                if source.is_syntax() || source.is_eof() {
                    return Err(FhirError::InvalidJson(source));
                }
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Bundle schema mismatch at {path}: {source}"
                )));
            }
        };

        if bundle.resource_type != "Bundle" {
            return Err(FhirError::InvalidInput(format!(
                "expected resourceType Bundle, got {:?}",
                bundle.resource_type
            )));
        }

        Ok(bundle)
    }

    /// Entries carrying a resource, in document order.
    pub fn resources(&self) -> impl Iterator<Item = (&BundleEntry, &Resource)> {
        self.entry
            .iter()
            .filter_map(|e| e.resource.as_ref().map(|r| (e, r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "resourceType": "Bundle",
        "type": "transaction",
        "entry": [
            {
                "fullUrl": "urn:uuid:p-1",
                "resource": {
                    "resourceType": "Patient",
                    "id": "p-1",
                    "identifier": [{"system": "https://github.com/synthetichealth/synthea", "value": "p-1"}],
                    "name": [{"use": "official", "family": "Lovelace", "given": ["Ada"]}],
                    "birthDate": "1990-05-15",
                    "someUnknownField": {"nested": true}
                }
            },
            {
                "fullUrl": "urn:uuid:claim-1",
                "resource": {"resourceType": "Claim", "id": "claim-1"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_bundle_keeps_known_and_marks_other() {
        let bundle = Bundle::parse(BUNDLE).expect("bundle should parse");
        assert_eq!(bundle.entry.len(), 2);

        let (entry, resource) = bundle.resources().next().expect("first entry");
        assert_eq!(entry.local_id(), Some("p-1"));
        match resource {
            Resource::Patient(p) => {
                assert_eq!(p.birth_date.as_deref(), Some("1990-05-15"));
                assert_eq!(p.name[0].family.as_deref(), Some("Lovelace"));
            }
            other => panic!("expected patient, got {other:?}"),
        }
        assert_eq!(bundle.entry[1].resource, Some(Resource::Other));
    }

    #[test]
    fn test_parse_rejects_non_bundle() {
        let err = Bundle::parse(r#"{"resourceType": "Patient"}"#)
            .expect_err("non-bundle should be rejected");
        assert!(matches!(err, FhirError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_reports_path() {
        let err = Bundle::parse(r#"{"resourceType": "Bundle", "entry": [{"fullUrl": 5}]}"#)
            .expect_err("bad fullUrl should fail");
        assert!(err.to_string().contains("entry[0].fullUrl"), "{err}");
        assert!(matches!(err, FhirError::Translation(_)));
    }

    #[test]
    fn test_parse_malformed_text_is_invalid_json() {
        let err = Bundle::parse(r#"{"resourceType": "Bundle", "entry": ["#)
            .expect_err("truncated document should fail");
        assert!(matches!(err, FhirError::InvalidJson(_)));

        let err = Bundle::parse("not json").expect_err("plain text should fail");
        assert!(matches!(err, FhirError::InvalidJson(_)));
    }
}
