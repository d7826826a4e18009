//! Collection structure and cross-family consistency.
//!
//! [`CollectionAssembler::run`] applies five passes in a fixed order. Later
//! passes rely on what earlier ones established: backfilling memberless
//! collections only works once every collection that does declare members has
//! been registered.

use crate::error::WarningKind;
use crate::model::{EntityTable, NamedEntity, Reference};
use crate::overrides::{
    self, COLLECTION_PREFIX_ALIASES, MemberlessException, SYNTAX_UNIONS, SyntaxUnion,
    UNTYPED_COLLECTIONS,
};
use crate::registry::ModelRegistry;
use crate::syntax::Syntax;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// A name-pattern heuristic that finds the collection a memberless one shares members with
struct BackfillRule {
    name: &'static str,
    apply: fn(&str, &EntityTable) -> Option<SmolStr>,
}

const BACKFILL_RULES: &[BackfillRule] = &[
    BackfillRule {
        name: "strip-actual",
        apply: |name, collections| registered_base(name.strip_suffix("-actual")?, collections),
    },
    BackfillRule {
        name: "strip-default",
        apply: |name, collections| registered_base(name.strip_suffix("-default")?, collections),
    },
    BackfillRule {
        name: "completed-infix",
        apply: |name, collections| {
            if !name.contains("-completed-") {
                return None;
            }
            registered_base(&name.replace("-completed-", "-"), collections)
        },
    },
    BackfillRule {
        name: "family-prefix",
        apply: |name, _| {
            COLLECTION_PREFIX_ALIASES
                .iter()
                .find(|(prefix, _)| name.starts_with(prefix))
                .map(|(_, root)| SmolStr::new_static(*root))
        },
    },
];

fn registered_base(base: &str, collections: &EntityTable) -> Option<SmolStr> {
    collections.contains_key(base).then(|| SmolStr::from(base))
}

/// Outcome of backfilling one memberless collection
#[derive(Debug, Clone, PartialEq, Eq)]
enum Backfill {
    /// Already registered under its own name
    Registered,
    Alias(SmolStr),
    Keep,
    Drop { silent: bool },
}

/// Canonical grammar of two disagreeing declarations, if they are a sanctioned union
pub fn unify(a: &Syntax, b: &Syntax) -> Option<Syntax> {
    if a == b {
        return None;
    }
    let text = if a.text() == b.text() {
        a.text()
    } else {
        SYNTAX_UNIONS
            .iter()
            .find_map(|union| union_text(union, a.text(), b.text()))?
    };
    let is_set = if a.is_set() == b.is_set() {
        a.is_set()
    } else if SYNTAX_UNIONS.contains(&SyntaxUnion::SetWidening) {
        true
    } else {
        return None;
    };
    Some(Syntax::from_normalized(text, is_set))
}

fn union_text(union: &SyntaxUnion, a: &str, b: &str) -> Option<&'static str> {
    match *union {
        SyntaxUnion::Pair { a: x, b: y, result } => {
            ((a == x && b == y) || (a == y && b == x)).then_some(result)
        }
        SyntaxUnion::Bounded { base } => {
            let bounded = |text: &str| {
                text.strip_prefix(base)
                    .is_some_and(|bound| bound.starts_with('('))
            };
            ((a == base && bounded(b)) || (b == base && bounded(a))).then_some(base)
        }
        SyntaxUnion::SetWidening => None,
    }
}

/// A member at any depth that has no grammar
fn empty_member(entity: &NamedEntity) -> Option<&NamedEntity> {
    entity.members.values().find_map(|member| {
        if member.syntax.is_empty() {
            Some(member)
        } else {
            empty_member(member)
        }
    })
}

/// Collection names that memberless collection attributes point at, at any depth
fn pending_references<'a>(entity: &'a NamedEntity, pending: &mut IndexMap<SmolStr, &'a NamedEntity>) {
    if entity.syntax.is_collection() && !entity.is_collection() {
        let target = entity.alias().unwrap_or(&entity.name);
        if !UNTYPED_COLLECTIONS.contains(&target.as_str()) {
            pending.entry(target.clone()).or_insert(entity);
        }
    }
    for member in entity.members.values() {
        pending_references(member, pending);
    }
}

/// Runs the collection passes over one registry
pub struct CollectionAssembler<'r> {
    registry: &'r mut ModelRegistry,
}

impl<'r> CollectionAssembler<'r> {
    pub fn new(registry: &'r mut ModelRegistry) -> Self {
        Self { registry }
    }

    /// Run all passes in order
    pub fn run(mut self) {
        let _span = tracing::debug_span!("assemble_collections").entered();
        self.merge_aliases();
        self.emit_collections();
        self.backfill_memberless();
        self.audit_references();
        self.unify_families();
    }

    /// Pass 1: move the members of aliasing collections into the collection they alias
    pub fn merge_aliases(&mut self) {
        let _span = tracing::debug_span!("merge_aliases").entered();

        let mut merges = Vec::new();
        for (family_name, family) in &self.registry.attributes {
            for attribute in family.values() {
                let Some(Reference::ByCollectionAlias { collection, family }) = &attribute.reference
                else {
                    continue;
                };
                if !attribute.is_collection() || *collection == attribute.name {
                    continue;
                }
                let target_family = family.clone().unwrap_or_else(|| family_name.clone());
                merges.push((
                    family_name.clone(),
                    attribute.name.clone(),
                    target_family,
                    collection.clone(),
                ));
            }
        }

        for (family, name, target_family, target) in merges {
            let referent_exists = self
                .registry
                .attributes
                .get(&target_family)
                .is_some_and(|f| f.contains_key(&target));
            if !referent_exists {
                self.registry.diagnostics.note(
                    WarningKind::UnresolvedReference,
                    format!("Collection {name} has members of {target}, which is not in {target_family}"),
                );
                continue;
            }

            let Some(members) = self
                .registry
                .attributes
                .get_mut(&family)
                .and_then(|f| f.get_mut(&name))
                .map(|attribute| std::mem::take(&mut attribute.members))
            else {
                continue;
            };
            let Some(referent) = self
                .registry
                .attributes
                .get_mut(&target_family)
                .and_then(|f| f.get_mut(&target))
            else {
                continue;
            };

            for (member_name, member) in members {
                match referent.members.get(&member_name) {
                    Some(existing) if !existing.same_declaration(&member) => {
                        self.registry.diagnostics.warn(
                            WarningKind::CollectionConflict,
                            format!("Collection {target} already has different member {member_name}"),
                            Some(&[existing, &member]),
                        );
                    }
                    Some(_) => {}
                    None => {
                        referent.members.insert(member_name, member);
                    }
                }
            }
        }
    }

    /// Register a collection that declares members, returning whether it was newly emitted.
    ///
    /// An identical earlier definition makes this a no-op; a different one is a
    /// conflict and the earlier definition is kept.
    pub fn emit_collection(&mut self, collection: &NamedEntity) -> bool {
        if let Some(existing) = self.registry.collections.get(&collection.name) {
            if !existing.same_members(collection) {
                self.registry.diagnostics.warn(
                    WarningKind::CollectionConflict,
                    format!("Collection {} already exists with different members", collection.name),
                    Some(&[existing, collection]),
                );
            }
            return false;
        }

        let mut registered = collection.clone();
        registered.emitted = match empty_member(collection) {
            Some(member) => {
                self.registry.diagnostics.warn(
                    WarningKind::EmptyDefinition,
                    format!("Collection {} member {} has no syntax", collection.name, member.name),
                    Some(member),
                );
                false
            }
            None => true,
        };
        let emitted = registered.emitted;
        self.registry
            .collections
            .insert(collection.name.clone(), registered);
        emitted
    }

    /// Pass 2: register every attribute with members
    pub fn emit_collections(&mut self) {
        let _span = tracing::debug_span!("emit_collections").entered();

        let candidates: Vec<(SmolStr, NamedEntity)> = self
            .registry
            .attributes
            .iter()
            .flat_map(|(family, attributes)| {
                attributes
                    .values()
                    .filter(|attribute| attribute.is_collection())
                    .map(move |attribute| (family.clone(), attribute.clone()))
            })
            .collect();

        for (family, collection) in candidates {
            if !self.emit_collection(&collection) {
                continue;
            }
            if let Some(attribute) = self
                .registry
                .attributes
                .get_mut(&family)
                .and_then(|f| f.get_mut(&collection.name))
            {
                attribute.emitted = true;
            }
        }
        tracing::debug!(count = self.registry.collections.len(), "registered collections");
    }

    fn backfill(&self, name: &str) -> Backfill {
        let collections = &self.registry.collections;
        if collections.contains_key(name) {
            return Backfill::Registered;
        }
        for rule in BACKFILL_RULES {
            if let Some(target) = (rule.apply)(name, collections) {
                tracing::debug!(rule = rule.name, name, %target, "aliasing memberless collection");
                return Backfill::Alias(target);
            }
        }
        match overrides::memberless_exception(name) {
            Some(MemberlessException::Keep) => Backfill::Keep,
            Some(MemberlessException::DropSilently) => Backfill::Drop { silent: true },
            None => Backfill::Drop { silent: false },
        }
    }

    /// Pass 3: alias or drop collection attributes with neither members nor an alias
    pub fn backfill_memberless(&mut self) {
        let _span = tracing::debug_span!("backfill_memberless").entered();

        let mut outcomes = Vec::new();
        for (family_name, family) in &self.registry.attributes {
            for attribute in family.values() {
                if attribute.syntax.is_collection()
                    && !attribute.is_collection()
                    && attribute.alias().is_none()
                {
                    outcomes.push((
                        family_name.clone(),
                        attribute.name.clone(),
                        self.backfill(&attribute.name),
                    ));
                }
            }
        }

        for (family_name, name, outcome) in outcomes {
            let Some(family) = self.registry.attributes.get_mut(&family_name) else {
                continue;
            };
            match outcome {
                Backfill::Registered | Backfill::Keep => {}
                Backfill::Alias(target) => {
                    if let Some(attribute) = family.get_mut(&name) {
                        attribute.reference = Some(Reference::ByCollectionAlias {
                            collection: target,
                            family: None,
                        });
                    }
                }
                Backfill::Drop { silent } => {
                    let Some(dropped) = family.shift_remove(&name) else {
                        continue;
                    };
                    if silent {
                        tracing::debug!(%name, "dropping obsolete collection");
                    } else {
                        self.registry.diagnostics.warn(
                            WarningKind::MissingCollectionMembers,
                            format!("no members found for collection {name}"),
                            Some(&dropped),
                        );
                    }
                }
            }
        }
    }

    /// Pass 4: every collection referenced by name must be registered and emitted
    pub fn audit_references(&mut self) {
        let _span = tracing::debug_span!("audit_references").entered();

        let mut pending = IndexMap::new();
        for family in self.registry.attributes.values() {
            for attribute in family.values() {
                pending_references(attribute, &mut pending);
            }
        }

        for (target, subject) in pending {
            match self.registry.collections.get(&target) {
                None => self.registry.diagnostics.warn(
                    WarningKind::UnresolvedReference,
                    format!("Collection {target} referenced but not found"),
                    Some(subject),
                ),
                Some(collection) if !collection.emitted => self.registry.diagnostics.warn(
                    WarningKind::UnresolvedReference,
                    format!("Collection {target} referenced but not emitted"),
                    Some(subject),
                ),
                Some(_) => {}
            }
        }
    }

    /// Pass 5: reduce declarations repeated across families to one per name
    pub fn unify_families(&mut self) {
        let _span = tracing::debug_span!("unify_families").entered();

        let mut types = EntityTable::new();
        for (family_name, family) in &self.registry.attributes {
            for (name, attribute) in family {
                let Some(existing) = types.get_mut(name) else {
                    types.insert(name.clone(), attribute.clone());
                    continue;
                };

                if existing.syntax.is_collection() && attribute.syntax.is_collection() {
                    existing.specs.extend(attribute.specs.iter().cloned());
                } else if let Some(unified) = unify(&existing.syntax, &attribute.syntax) {
                    tracing::debug!(%name, syntax = unified.text(), "unified declarations");
                    existing.specs.extend(attribute.specs.iter().cloned());
                    existing.syntax = unified;
                } else if existing.same_declaration(attribute) {
                    existing.specs.extend(attribute.specs.iter().cloned());
                } else {
                    self.registry.diagnostics.warn(
                        WarningKind::CollectionConflict,
                        format!("Type {name} repeated with differences in {family_name}"),
                        Some(&[&*existing, attribute]),
                    );
                }
            }
        }
        self.registry.types = types;
    }
}
