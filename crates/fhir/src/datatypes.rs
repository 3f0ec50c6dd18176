//! FHIR R4 general-purpose datatypes, reduced to the fields the importer reads.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers and references
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Identifier {
    pub system: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<CodeableConcept>,
}

/// Value of the first identifier that has one.
pub fn first_identifier(identifiers: &[Identifier]) -> Option<&str> {
    identifiers.iter().find_map(|i| non_empty(i.value.as_deref()))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reference {
    pub reference: Option<String>,
    pub display: Option<String>,
}

/// What a reference string points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// A resource id or bundle-local uuid (`urn:uuid:abc`, `Patient/abc`).
    Id(String),
    /// A conditional reference (`Organization?identifier=system|value`).
    Identifier {
        system: Option<String>,
        value: String,
    },
}

impl Reference {
    /// Resolve the reference string.
    ///
    /// Returns `None` for an absent or empty reference.
    pub fn target(&self) -> Option<ReferenceTarget> {
        let raw = non_empty(self.reference.as_deref())?;

        if let Some(uuid) = raw.strip_prefix("urn:uuid:") {
            return non_empty(Some(uuid)).map(|id| ReferenceTarget::Id(id.to_string()));
        }

        if let Some((_, query)) = raw.split_once("?identifier=") {
            let (system, value) = match query.split_once('|') {
                Some((system, value)) => (non_empty(Some(system)), value),
                None => (None, query),
            };
            return non_empty(Some(value)).map(|value| ReferenceTarget::Identifier {
                system: system.map(str::to_string),
                value: value.to_string(),
            });
        }

        let id = raw.rsplit('/').next().unwrap_or(raw);
        non_empty(Some(id)).map(|id| ReferenceTarget::Id(id.to_string()))
    }
}

// ============================================================================
// Codes
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Coding {
    pub system: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn first_coding(&self) -> Option<&Coding> {
        self.coding.first()
    }

    /// Code of the first coding.
    pub fn code(&self) -> Option<&str> {
        self.first_coding().and_then(|c| non_empty(c.code.as_deref()))
    }

    /// Display of the first coding, falling back to the concept text.
    pub fn display(&self) -> Option<&str> {
        self.first_coding()
            .and_then(|c| non_empty(c.display.as_deref()))
            .or_else(|| non_empty(self.text.as_deref()))
    }
}

// ============================================================================
// People and places
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HumanName {
    #[serde(rename = "use")]
    pub use_: Option<String>,
    pub text: Option<String>,
    pub family: Option<String>,
    pub given: Vec<String>,
    pub prefix: Vec<String>,
}

impl HumanName {
    pub fn first_given(&self) -> Option<&str> {
        self.given.iter().find_map(|g| non_empty(Some(g.as_str())))
    }

    /// `prefix given family`, or the `text` form when no parts are present.
    pub fn full(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .prefix
            .iter()
            .chain(self.given.iter())
            .map(String::as_str)
            .chain(self.family.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();

        if parts.is_empty() {
            non_empty(self.text.as_deref()).map(str::to_string)
        } else {
            Some(parts.join(" "))
        }
    }
}

/// The official name if present, otherwise the first one.
pub fn primary_name(names: &[HumanName]) -> Option<&HumanName> {
    names
        .iter()
        .find(|n| n.use_.as_deref() == Some("official"))
        .or_else(|| names.first())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactPoint {
    pub system: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "use")]
    pub use_: Option<String>,
}

/// Value of the first contact point with the given system (`phone`, `email`).
pub fn telecom_value<'a>(telecom: &'a [ContactPoint], system: &str) -> Option<&'a str> {
    telecom
        .iter()
        .filter(|t| t.system.as_deref() == Some(system))
        .find_map(|t| non_empty(t.value.as_deref()))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Address lines joined with `", "`.
    pub fn line_text(&self) -> Option<String> {
        let lines: Vec<&str> = self
            .line
            .iter()
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
            .collect();
        (!lines.is_empty()).then(|| lines.join(", "))
    }
}

// ============================================================================
// Values
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Period {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Quantity {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub code: Option<String>,
}

impl Quantity {
    /// Human unit, falling back to the UCUM code.
    pub fn unit_text(&self) -> Option<&str> {
        non_empty(self.unit.as_deref()).or_else(|| non_empty(self.code.as_deref()))
    }
}

/// Extension, including the nested form US Core uses for race and ethnicity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Extension {
    pub url: String,
    pub value_string: Option<String>,
    pub value_coding: Option<Coding>,
    pub value_code: Option<String>,
    pub extension: Vec<Extension>,
}

impl Extension {
    /// Text carried by the extension: its own string value, then a nested `text` extension,
    /// then the display of a nested coding.
    pub fn text(&self) -> Option<&str> {
        if let Some(value) = non_empty(self.value_string.as_deref()) {
            return Some(value);
        }
        if let Some(value) = self
            .extension
            .iter()
            .find(|e| e.url == "text")
            .and_then(|e| non_empty(e.value_string.as_deref()))
        {
            return Some(value);
        }
        self.extension
            .iter()
            .filter_map(|e| e.value_coding.as_ref())
            .chain(self.value_coding.as_ref())
            .find_map(|c| non_empty(c.display.as_deref()))
    }
}

/// Text of the first extension whose URL ends with `suffix`.
pub fn extension_text<'a>(extensions: &'a [Extension], suffix: &str) -> Option<&'a str> {
    extensions
        .iter()
        .filter(|e| e.url.ends_with(suffix))
        .find_map(Extension::text)
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(raw: &str) -> Reference {
        Reference {
            reference: Some(raw.into()),
            display: None,
        }
    }

    #[test]
    fn test_reference_targets() {
        assert_eq!(
            reference("urn:uuid:abc-123").target(),
            Some(ReferenceTarget::Id("abc-123".into()))
        );
        assert_eq!(
            reference("Patient/42").target(),
            Some(ReferenceTarget::Id("42".into()))
        );
        assert_eq!(
            reference("Organization?identifier=https://github.com/synthetichealth/synthea|ef58").target(),
            Some(ReferenceTarget::Identifier {
                system: Some("https://github.com/synthetichealth/synthea".into()),
                value: "ef58".into(),
            })
        );
        assert_eq!(reference("  ").target(), None);
        assert_eq!(Reference::default().target(), None);
    }

    #[test]
    fn test_human_name_full() {
        let name = HumanName {
            use_: Some("official".into()),
            family: Some("Lovelace".into()),
            given: vec!["Ada".into(), "Augusta".into()],
            prefix: vec!["Ms.".into()],
            ..Default::default()
        };
        assert_eq!(name.full().as_deref(), Some("Ms. Ada Augusta Lovelace"));
        assert_eq!(name.first_given(), Some("Ada"));
    }

    #[test]
    fn test_extension_text_reads_nested_text() {
        let race = Extension {
            url: "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race".into(),
            extension: vec![Extension {
                url: "text".into(),
                value_string: Some("White".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(extension_text(&[race], "us-core-race"), Some("White"));
    }
}
