//! Entity tables built from registry records.
//!
//! Every record kind is ingested with upsert-by-name semantics: the first
//! record for a name creates the entity, later records add values, specs or
//! members to it. One [`ModelRegistry`] is built per run and threaded through
//! the collection assembler and the type inferencer.

use crate::diagnostics::Diagnostics;
use crate::error::WarningKind;
use crate::model::{EntityTable, NamedEntity, Reference, Values};
use crate::names;
use crate::output::{EnumDefinition, KeywordDefinition};
use crate::overrides::{self, EnumRedirect, STATUS_ENUM};
use crate::records::{AttributeRecord, EnumRecord, KeywordRecord, StatusCodeRecord, XRef};
use crate::reference::{self, CollectionIndex};
use crate::syntax::Syntax;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Marker on member names whose record replaces the earlier member grammar
const EXTENSION_MARKER: &str = "(extension)";

/// Named entity tables for one registry run
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    /// Spec id to document URI, in first-citation order
    pub specs: IndexMap<SmolStr, String>,
    pub enums: EntityTable,
    pub keywords: EntityTable,
    /// Attribute family (e.g. `Job Template`) to its attributes
    pub attributes: IndexMap<SmolStr, EntityTable>,
    /// Collections registered by the assembler, keyed by name
    pub collections: EntityTable,
    /// One canonical declaration per attribute name, filled by the assembler
    pub types: EntityTable,
    pub diagnostics: Diagnostics,
}

impl CollectionIndex for ModelRegistry {
    fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }
}

/// Whether a label or value carries a parenthesized qualifier such as `(deprecated)`
fn has_qualifier(text: &str) -> bool {
    text.find('(')
        .is_some_and(|open| text[open..].contains(')'))
}

/// Parse a decimal or `0x` hexadecimal code, reporting whether it was hexadecimal
fn parse_code(value: &str) -> Option<(i64, bool)> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok().map(|code| (code, true)),
        None => value.parse().ok().map(|code| (code, false)),
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes of one family
    pub fn family(&self, family: &str) -> Option<&EntityTable> {
        self.attributes.get(family)
    }

    /// Record the spec cited by `xref`, returning its id
    fn cite(&mut self, xref: Option<&XRef>) -> Option<SmolStr> {
        let xref = xref?;
        match xref.spec_reference() {
            Some(spec) => {
                self.specs.entry(spec.id.clone()).or_insert(spec.uri);
                Some(spec.id)
            }
            None => {
                self.diagnostics.warn(
                    WarningKind::UnparseableGrammar,
                    format!("unparseable spec reference '{}'", xref.data),
                    Some(xref),
                );
                None
            }
        }
    }

    /// Ingest one enumeration value record
    pub fn ingest_enum(&mut self, record: &EnumRecord) {
        let spec = self.cite(record.xref.as_ref());
        let attribute = record.attribute.as_str();
        let entity = self.enums.entry(attribute.into()).or_insert_with(|| {
            NamedEntity::new(
                attribute,
                Syntax::normalize_for(attribute, record.syntax.as_deref().unwrap_or_default()),
            )
        });
        if let Some(spec) = spec {
            entity.add_spec(spec);
        }

        let mut value = record.value.as_deref();
        let mut label = record.name.as_deref();
        if let Some(same_as) = label.and_then(reference::enum_label_reference) {
            entity.reference = Some(Reference::by_name(same_as));
            label = None;
            value = None;
        }

        for redirect in overrides::ENUM_REDIRECTS {
            match *redirect {
                EnumRedirect::Prefix(prefix, target) if attribute.starts_with(prefix) => {
                    entity.reference = Some(Reference::by_name(target));
                }
                EnumRedirect::Exact(name, target) if attribute == name => {
                    entity.reference = Some(Reference::by_name(target));
                    return;
                }
                _ => {}
            }
        }

        let Some(value) = value else {
            return;
        };

        let Some(label) = label else {
            match reference::parse_enum_reference(value) {
                Some(reference) => entity.reference = Some(reference),
                None => {
                    entity.bad = true;
                    self.diagnostics.note(
                        WarningKind::UnparseableGrammar,
                        format!("enum {attribute} has unparseable value '{value}'"),
                    );
                }
            }
            return;
        };

        if has_qualifier(label) || label.contains("Reserved") {
            return;
        }

        match parse_code(value) {
            Some((code, hex)) => {
                entity.hex |= hex;
                entity.values.insert_enumerated(label, code);
            }
            None => self.diagnostics.note(
                WarningKind::UnparseableGrammar,
                format!("enum {attribute} has non-integer value {value}"),
            ),
        }
    }

    /// Ingest one operation status code into the status enumeration
    pub fn ingest_status_code(&mut self, record: &StatusCodeRecord) {
        let spec = self.cite(record.xref.as_ref());
        let entity = self
            .enums
            .entry(STATUS_ENUM.into())
            .or_insert_with(|| {
                let mut status = NamedEntity::new(STATUS_ENUM, Syntax::normalize("enum"));
                status.hex = true;
                status
            });
        if let Some(spec) = spec {
            entity.add_spec(spec);
        }

        let name = record.name.as_str();
        if name == "Unassigned" || name.starts_with("Reserved") || record.value.contains('-') {
            return;
        }
        match parse_code(&record.value) {
            Some((code, _)) => entity.values.insert_enumerated(name, code),
            None => self.diagnostics.note(
                WarningKind::UnparseableGrammar,
                format!("status code has non-integer value {}", record.value),
            ),
        }
    }

    /// Ingest one keyword value record
    pub fn ingest_keyword(&mut self, record: &KeywordRecord) {
        let spec = self.cite(record.xref.as_ref());
        let attribute = record.attribute.as_str();
        let entity = self.keywords.entry(attribute.into()).or_insert_with(|| {
            NamedEntity::new(
                attribute,
                Syntax::normalize_for(attribute, record.syntax.as_deref().unwrap_or_default()),
            )
        });
        if let Some(spec) = spec {
            entity.add_spec(spec);
        }
        if let Some(keyword_type) = &record.keyword_type {
            entity.keyword_type = Some(keyword_type.as_str().into());
        }

        let Some(value) = record.value.as_deref() else {
            return;
        };
        if has_qualifier(value) {
            return;
        }

        if !value.contains(' ') {
            entity.values.insert_keyword(value);
        } else if !reference::assign_reference(value, entity) {
            entity.bad = true;
            self.diagnostics.note(
                WarningKind::UnparseableGrammar,
                format!("keyword {attribute} has unparseable value '{value}'"),
            );
        }
    }

    /// Ingest one attribute, member attribute or sub-member attribute record
    pub fn ingest_attribute(&mut self, record: &AttributeRecord) {
        let name = record.name.as_str();
        if has_qualifier(name) {
            tracing::debug!(name, "skipping qualified attribute");
            return;
        }

        let spec = self.cite(record.xref.as_ref());
        let raw_syntax = record.syntax.as_deref().unwrap_or_default();
        let family = self.attributes.entry(record.collection.as_str().into()).or_default();
        let attribute = family
            .entry(name.into())
            .or_insert_with(|| NamedEntity::new(name, Syntax::normalize_for(name, raw_syntax)));
        if let Some(spec) = &spec {
            attribute.add_spec(spec.clone());
        }

        let Some(member_name) = record.member_attribute.as_deref() else {
            return;
        };
        let member_name = member_name
            .strip_suffix(EXTENSION_MARKER)
            .unwrap_or(member_name)
            .trim();

        if member_name.starts_with('<') {
            if !reference::assign_reference(member_name, attribute) {
                self.diagnostics.note(
                    WarningKind::UnparseableGrammar,
                    format!("Unparseable '{name}' member name: '{member_name}'"),
                );
            }
            return;
        }

        let member = attribute
            .members
            .entry(member_name.into())
            .or_insert_with(|| {
                let mut member =
                    NamedEntity::new(member_name, Syntax::normalize_for(member_name, raw_syntax));
                member.inner = true;
                member
            });
        if let Some(spec) = &spec {
            member.add_spec(spec.clone());
        }

        let Some(submember_name) = record.sub_member_attribute.as_deref() else {
            // A repeated member, usually an extension, replaces the earlier grammar
            member.syntax = Syntax::normalize_for(member_name, raw_syntax);
            return;
        };

        if submember_name.starts_with('<') {
            if !reference::assign_reference(submember_name, member) {
                self.diagnostics.note(
                    WarningKind::UnparseableGrammar,
                    format!(
                        "Unparseable '{name}' member '{member_name}' submember name '{submember_name}'"
                    ),
                );
            }
            return;
        }

        let submember = member
            .members
            .entry(submember_name.into())
            .or_insert_with(|| {
                let mut submember = NamedEntity::new(
                    submember_name,
                    Syntax::normalize_for(submember_name, raw_syntax),
                );
                submember.inner = true;
                submember
            });
        if let Some(spec) = spec {
            submember.add_spec(spec);
        }
    }

    /// Add keywords the registry listing omits, replacing any ingested ones
    pub fn inject_synthetic_keywords(&mut self) {
        for synthetic in overrides::SYNTHETIC_KEYWORDS {
            let mut keyword = NamedEntity::new(synthetic.name, Syntax::normalize(synthetic.syntax));
            keyword.add_spec(synthetic.spec);
            for value in synthetic.values {
                keyword.values.insert_keyword(*value);
            }
            keyword.empty_ok = synthetic.empty_ok;
            keyword.reference = synthetic
                .members_of
                .map(|collection| Reference::by_members(collection));
            tracing::debug!(name = synthetic.name, "injecting synthetic keyword");
            self.keywords.insert(synthetic.name.into(), keyword);
        }
    }

    /// Copy members the registry documents only on a sibling collection
    pub fn apply_member_patches(&mut self) {
        for patch in overrides::MEMBER_PATCHES {
            let Some(family) = self.attributes.get_mut(patch.family) else {
                continue;
            };
            let Some(member) = family
                .get(patch.source)
                .and_then(|source| source.members.get(patch.member))
                .cloned()
            else {
                tracing::debug!(?patch, "member patch source missing");
                continue;
            };
            if let Some(target) = family.get_mut(patch.collection) {
                target.members.insert(patch.member.into(), member);
            }
        }
    }

    /// Names of the entries whose by-name reference points at `name`
    fn referrers(table: &EntityTable, name: &str) -> Vec<SmolStr> {
        table
            .values()
            .filter(|entity| {
                entity
                    .reference
                    .as_ref()
                    .and_then(Reference::name)
                    .is_some_and(|target| target == name)
            })
            .map(|entity| entity.name.clone())
            .collect()
    }

    /// Check by-name references, returning whether `entity` stands on its own
    fn check_standalone(
        diagnostics: &mut Diagnostics,
        table: &EntityTable,
        entity: &NamedEntity,
    ) -> bool {
        if entity.bad {
            return false;
        }
        if let Some(target) = entity.reference.as_ref().and_then(Reference::name) {
            if !table.contains_key(target) {
                diagnostics.warn(
                    WarningKind::UnresolvedReference,
                    format!("{} has bad ref={target}", entity.name),
                    Some(entity),
                );
            }
            return false;
        }
        true
    }

    /// Enumerations that will be emitted, with their referrers
    pub fn validate_enums(&mut self) -> Vec<EnumDefinition> {
        let mut definitions = Vec::new();
        for entity in self.enums.values() {
            if !Self::check_standalone(&mut self.diagnostics, &self.enums, entity) {
                continue;
            }
            let values = match &entity.values {
                Values::Enumerated(values) if !values.is_empty() => values,
                _ => {
                    self.diagnostics.note(
                        WarningKind::EmptyDefinition,
                        format!("enum {} has no values defined", entity.name),
                    );
                    continue;
                }
            };
            definitions.push(EnumDefinition {
                name: names::enum_type_name(&entity.name),
                full_name: entity.name.clone(),
                values: values.clone(),
                hex: entity.hex,
                specs: entity.specs.iter().cloned().collect(),
                refs: Self::referrers(&self.enums, &entity.name),
            });
        }
        definitions
    }

    /// Keywords that will be emitted, attaching group notes to their entities
    pub fn validate_keywords(&mut self) -> Vec<KeywordDefinition> {
        let mut notes = Vec::new();
        let mut definitions = Vec::new();

        for entity in self.keywords.values() {
            if !Self::check_standalone(&mut self.diagnostics, &self.keywords, entity) {
                continue;
            }
            let values: Vec<SmolStr> = match &entity.values {
                Values::Keywords(values) => values.iter().cloned().collect(),
                _ => Vec::new(),
            };

            let mut doc_note = None;
            match &entity.reference {
                Some(Reference::ByMembers { .. }) => {
                    if !values.is_empty() {
                        self.diagnostics.warn(
                            WarningKind::UnresolvedReference,
                            "Cannot handle keyword with both ref and values",
                            Some(entity),
                        );
                    }
                    continue;
                }
                Some(Reference::ByGroup { family }) => {
                    if !self.attributes.contains_key(family) {
                        self.diagnostics.warn(
                            WarningKind::UnresolvedReference,
                            format!("Keyword refers to group {family} but no such group"),
                            Some(entity),
                        );
                        continue;
                    }
                    let also = if values.is_empty() { "" } else { " also" };
                    let note = format!(
                        "Legal values{also} include all attribute names found in [{}].",
                        names::group_ref(family)
                    );
                    notes.push((entity.name.clone(), note.clone()));
                    doc_note = Some(note);
                }
                _ => {}
            }

            if values.is_empty() && !entity.empty_ok {
                tracing::debug!(name = %entity.name, "keyword has no values");
                continue;
            }

            definitions.push(KeywordDefinition {
                name: names::keyword_type_name(&entity.name),
                full_name: entity.name.clone(),
                values,
                or_name: entity.syntax.text().contains("name"),
                keyword_type: entity.keyword_type.clone(),
                doc_note,
                specs: entity.specs.iter().cloned().collect(),
                refs: Self::referrers(&self.keywords, &entity.name),
            });
        }

        for (name, note) in notes {
            if let Some(entity) = self.keywords.get_mut(&name) {
                entity.doc_note = Some(note);
            }
        }
        definitions
    }
}
