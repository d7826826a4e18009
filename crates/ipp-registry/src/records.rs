//! Records extracted from the IANA IPP registrations document.
//!
//! Extraction from the registry XML happens elsewhere; this is the JSON shape
//! the extractor produces and the engine consumes.

use crate::model::SpecReference;
use crate::overrides::RFC_URI_BASE;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// All records of one registry snapshot
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryRecords {
    /// Registry revision date, carried through to the output
    pub updated: Option<String>,
    pub enums: Vec<EnumRecord>,
    pub keywords: Vec<KeywordRecord>,
    pub attributes: Vec<AttributeRecord>,
    pub status_codes: Vec<StatusCodeRecord>,
}

impl RegistryRecords {
    /// Append another snapshot's records, keeping the first revision date seen
    pub fn merge(&mut self, other: RegistryRecords) {
        if self.updated.is_none() {
            self.updated = other.updated;
        }
        self.enums.extend(other.enums);
        self.keywords.extend(other.keywords);
        self.attributes.extend(other.attributes);
        self.status_codes.extend(other.status_codes);
    }

    pub fn len(&self) -> usize {
        self.enums.len() + self.keywords.len() + self.attributes.len() + self.status_codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Citation of the document defining a record
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRef {
    #[serde(rename = "type")]
    pub kind: XRefKind,
    pub data: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XRefKind {
    Rfc,
    Uri,
    #[serde(other)]
    Other,
}

impl XRef {
    /// The cited spec, if the citation names both an id and a location
    pub fn spec_reference(&self) -> Option<SpecReference> {
        let (id, uri) = match self.kind {
            XRefKind::Rfc => (
                Some(self.data.as_str()),
                Some(format!("{RFC_URI_BASE}{}", self.data)),
            ),
            XRefKind::Uri => (self.text.as_deref(), Some(self.data.clone())),
            XRefKind::Other => (None, None),
        };
        match (id, uri) {
            (Some(id), Some(uri)) if !id.is_empty() && !uri.is_empty() => Some(SpecReference {
                id: id.trim().into(),
                uri,
            }),
            _ => None,
        }
    }
}

/// One value of an enumerated attribute
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRecord {
    #[serde(alias = "family")]
    pub attribute: String,
    /// Value label, or prose such as "values are the same as ..."
    pub name: Option<String>,
    pub value: Option<String>,
    pub syntax: Option<String>,
    pub xref: Option<XRef>,
}

/// One value of a keyword attribute
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRecord {
    #[serde(alias = "family")]
    pub attribute: String,
    pub value: Option<String>,
    pub syntax: Option<String>,
    #[serde(rename = "type")]
    pub keyword_type: Option<String>,
    pub xref: Option<XRef>,
}

/// An attribute, member attribute or sub-member attribute
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Attribute family, e.g. `Job Template`
    #[serde(alias = "family")]
    pub collection: String,
    pub name: String,
    #[serde(alias = "member")]
    pub member_attribute: Option<String>,
    #[serde(alias = "submember", alias = "sub-member_attribute")]
    pub sub_member_attribute: Option<String>,
    pub syntax: Option<String>,
    pub xref: Option<XRef>,
}

/// An operation status code
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCodeRecord {
    pub name: String,
    pub value: String,
    pub xref: Option<XRef>,
}
