//! Mapping of normalized grammars onto canonical type kinds.
//!
//! Rules are tried in priority order and the first that produces an
//! [`Inference`] wins. Keyword and enumeration rules consult the registry
//! tables through [`fuzzy_lookup`]; a rule that matches the grammar but cannot
//! resolve its target yields to the rules after it.

use crate::diagnostics::Diagnostics;
use crate::error::WarningKind;
use crate::model::{NamedEntity, TypeDescriptor, TypeKind, Values};
use crate::names::{depluralize, type_ref};
use crate::output::CollectionDefinition;
use crate::overrides::{self, INFERENCE_SYNTAX_OVERRIDES, KEY_VALUE_TYPE_NAMES, UNTYPED_COLLECTIONS};
use crate::reference::{Resolved, fuzzy_lookup};
use crate::registry::ModelRegistry;
use indexmap::IndexMap;
use itertools::Itertools;
use regex::Regex;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Where a descriptor is used, for enumeration back-references
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Site {
    /// The top-level attribute list
    Types,
    /// Inside a collection, by dotted path
    Collection(String),
}

impl Site {
    pub fn usage(&self, name: &str) -> String {
        match self {
            Site::Types => format!("types.{name}"),
            Site::Collection(path) => format!("{path}.{name}"),
        }
    }

    pub fn child(&self, name: &str) -> Site {
        match self {
            Site::Types => Site::Collection(name.to_string()),
            Site::Collection(path) => Site::Collection(format!("{path}.{name}")),
        }
    }
}

/// The attribute a rule is being tried against
struct Subject<'a> {
    entity: &'a NamedEntity,
    /// Name to look up in the keyword and enumeration tables
    lookup: &'a str,
    /// Grammar after inference-time corrections
    syntax: &'a str,
    site: &'a Site,
}

/// What a matching rule decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inference {
    pub kind: TypeKind,
    pub underlying: Option<SmolStr>,
    pub doc_note: Option<String>,
}

impl Inference {
    fn plain(kind: TypeKind) -> Self {
        Self {
            kind,
            underlying: None,
            doc_note: None,
        }
    }
}

enum Matcher {
    Syntax(&'static str),
    Pattern(&'static str),
    Name(&'static [&'static str]),
}

type Resolver = fn(&mut TypeInferencer<'_>, &Subject<'_>) -> Option<Inference>;

enum Action {
    Plain(TypeKind),
    Resolve(Resolver),
}

struct InferenceRule {
    name: &'static str,
    matcher: Matcher,
    action: Action,
}

const INFERENCE_RULES: &[InferenceRule] = &[
    InferenceRule {
        name: "keyword-or-name",
        matcher: Matcher::Syntax("keyword | name"),
        action: Action::Resolve(keyword_or_name),
    },
    InferenceRule {
        name: "keyword",
        matcher: Matcher::Syntax("keyword"),
        action: Action::Resolve(keyword),
    },
    InferenceRule {
        name: "enum",
        matcher: Matcher::Syntax("enum"),
        action: Action::Resolve(enumeration),
    },
    // Checked before octetString, which is how these are registered
    InferenceRule {
        name: "key-value",
        matcher: Matcher::Name(KEY_VALUE_TYPE_NAMES),
        action: Action::Plain(TypeKind::KeyValue),
    },
    InferenceRule {
        name: "uri",
        matcher: Matcher::Pattern(r"^uri(\([0-9]+\))?$"),
        action: Action::Plain(TypeKind::Uri),
    },
    InferenceRule {
        name: "range-of-integer",
        matcher: Matcher::Pattern(r"^rangeOfInteger(\([0-9MINAX:-]*\))?$"),
        action: Action::Plain(TypeKind::IntRange),
    },
    InferenceRule {
        name: "integer-or-range",
        matcher: Matcher::Pattern(
            r"^integer(\([0-9MINAX:-]*\))? \| rangeOfInteger(\([0-9MINAX:-]*\))?$",
        ),
        action: Action::Plain(TypeKind::IntOrIntRange),
    },
    InferenceRule {
        name: "integer",
        matcher: Matcher::Pattern(r"^integer(\([0-9MINAX:-]*\))?$"),
        action: Action::Plain(TypeKind::Integer),
    },
    InferenceRule {
        name: "boolean",
        matcher: Matcher::Syntax("boolean"),
        action: Action::Plain(TypeKind::Boolean),
    },
    InferenceRule {
        name: "charset",
        matcher: Matcher::Syntax("charset"),
        action: Action::Plain(TypeKind::Charset),
    },
    InferenceRule {
        name: "mime-media-type",
        matcher: Matcher::Syntax("mimeMediaType"),
        action: Action::Plain(TypeKind::MimeMediaType),
    },
    InferenceRule {
        name: "natural-language",
        matcher: Matcher::Syntax("naturalLanguage"),
        action: Action::Plain(TypeKind::NaturalLanguage),
    },
    InferenceRule {
        name: "uri-scheme",
        matcher: Matcher::Syntax("uriScheme"),
        action: Action::Plain(TypeKind::UriScheme),
    },
    InferenceRule {
        name: "resolution",
        matcher: Matcher::Syntax("resolution"),
        action: Action::Plain(TypeKind::Resolution),
    },
    InferenceRule {
        name: "collection",
        matcher: Matcher::Syntax("collection"),
        action: Action::Resolve(collection),
    },
    InferenceRule {
        name: "date-time",
        matcher: Matcher::Syntax("dateTime"),
        action: Action::Plain(TypeKind::DateTime),
    },
    InferenceRule {
        name: "name",
        matcher: Matcher::Pattern(r"^name(\([0-9]+\))?$"),
        action: Action::Plain(TypeKind::Name),
    },
    InferenceRule {
        name: "text",
        matcher: Matcher::Pattern(r"^text(\([0-9]+\))?$"),
        action: Action::Plain(TypeKind::Text),
    },
    InferenceRule {
        name: "octet-string",
        matcher: Matcher::Pattern(r"^octetString(\([0-9]+\))?$"),
        action: Action::Plain(TypeKind::OctetString),
    },
];

static COMPILED_RULES: LazyLock<Vec<(Option<Regex>, &'static InferenceRule)>> = LazyLock::new(|| {
    INFERENCE_RULES
        .iter()
        .map(|rule| {
            let regex = match rule.matcher {
                Matcher::Pattern(pattern) => Some(Regex::new(pattern).unwrap()),
                _ => None,
            };
            (regex, rule)
        })
        .collect()
});

fn rule_matches(regex: Option<&Regex>, rule: &InferenceRule, subject: &Subject<'_>) -> bool {
    match (&rule.matcher, regex) {
        (Matcher::Syntax(syntax), _) => subject.syntax == *syntax,
        (Matcher::Pattern(_), Some(regex)) => regex.is_match(subject.syntax),
        (Matcher::Pattern(_), None) => false,
        (Matcher::Name(names), _) => names.contains(&subject.entity.name.as_str()),
    }
}

/// Grammar with known per-attribute mistakes corrected
fn inference_syntax<'a>(name: &str, syntax: &'a str) -> &'a str {
    INFERENCE_SYNTAX_OVERRIDES
        .iter()
        .find(|(attribute, documented, _)| *attribute == name && *documented == syntax)
        .map_or(syntax, |(_, _, actual)| *actual)
}

fn member_names_note(collection: &str) -> String {
    format!("May contain any keyword from [{}.Name].", type_ref(collection))
}

fn keyword_or_name(inferencer: &mut TypeInferencer<'_>, subject: &Subject<'_>) -> Option<Inference> {
    let (underlying, doc_note) = match inferencer.lookup_keyword(subject.lookup) {
        Some(Resolved::Members(collection)) => {
            let note = member_names_note(&collection);
            (Some(collection), Some(note))
        }
        Some(Resolved::Entity(keyword)) => (
            Some(keyword.name.clone()),
            Some(format!(
                "May contain any keyword from [{}] or a name.",
                type_ref(depluralize(&keyword.name))
            )),
        ),
        None => (None, None),
    };
    Some(Inference {
        kind: TypeKind::KeywordOrName,
        underlying,
        doc_note,
    })
}

fn keyword(inferencer: &mut TypeInferencer<'_>, subject: &Subject<'_>) -> Option<Inference> {
    let (underlying, doc_note) = match inferencer.lookup_keyword(subject.lookup) {
        Some(Resolved::Members(collection)) => {
            let note = member_names_note(&collection);
            (Some(collection), Some(note))
        }
        Some(Resolved::Entity(keyword)) if !keyword.values.is_empty() => (
            Some(keyword.name.clone()),
            Some(format!(
                "May contain any keyword from [{}].",
                type_ref(depluralize(&keyword.name))
            )),
        ),
        Some(Resolved::Entity(keyword)) => (
            keyword.empty_ok.then(|| keyword.name.clone()),
            keyword.doc_note.clone(),
        ),
        // Untyped keyword
        None => (None, None),
    };
    Some(Inference {
        kind: TypeKind::Keyword,
        underlying,
        doc_note,
    })
}

fn enumeration(inferencer: &mut TypeInferencer<'_>, subject: &Subject<'_>) -> Option<Inference> {
    let registry = inferencer.registry;
    let Some(Resolved::Entity(target)) = fuzzy_lookup(&registry.enums, subject.lookup, registry) else {
        return None;
    };
    let usage = subject.site.usage(&subject.entity.name);
    let usages = inferencer.enum_usages.entry(target.name.clone()).or_default();
    if !usages.contains(&usage) {
        usages.push(usage);
    }
    Some(Inference {
        kind: TypeKind::Enumeration,
        underlying: Some(target.name.clone()),
        doc_note: None,
    })
}

fn collection(_: &mut TypeInferencer<'_>, subject: &Subject<'_>) -> Option<Inference> {
    let target = subject.entity.alias().unwrap_or(&subject.entity.name);
    if UNTYPED_COLLECTIONS.contains(&target.as_str()) {
        return Some(Inference::plain(TypeKind::UntypedCollection));
    }
    Some(Inference {
        kind: TypeKind::Collection,
        underlying: Some(target.clone()),
        doc_note: None,
    })
}

/// Results of typing one assembled registry
#[derive(Debug, Clone, Default)]
pub struct InferredTypes {
    /// Canonical attributes, sorted by name
    pub types: Vec<TypeDescriptor>,
    pub collections: Vec<CollectionDefinition>,
    pub enum_usages: BTreeMap<SmolStr, Vec<String>>,
    pub key_values: IndexMap<SmolStr, TypeDescriptor>,
    pub diagnostics: Diagnostics,
}

/// Assigns a [`TypeDescriptor`] to every canonical attribute and collection member
pub struct TypeInferencer<'r> {
    registry: &'r ModelRegistry,
    enum_usages: BTreeMap<SmolStr, Vec<String>>,
    key_values: IndexMap<SmolStr, TypeDescriptor>,
    diagnostics: Diagnostics,
}

impl<'r> TypeInferencer<'r> {
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self {
            registry,
            enum_usages: BTreeMap::new(),
            key_values: IndexMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn lookup_keyword(&self, name: &str) -> Option<Resolved<'r>> {
        let registry = self.registry;
        fuzzy_lookup(&registry.keywords, name, registry)
    }

    /// The first inference rule that applies to `entity`
    pub fn infer(&mut self, entity: &NamedEntity, site: &Site) -> Option<Inference> {
        let subject = Subject {
            entity,
            lookup: overrides::lookup_alias(&entity.name),
            syntax: inference_syntax(&entity.name, entity.syntax.text()),
            site,
        };
        for (regex, rule) in COMPILED_RULES.iter() {
            if !rule_matches(regex.as_ref(), rule, &subject) {
                continue;
            }
            let inference = match rule.action {
                Action::Plain(kind) => Some(Inference::plain(kind)),
                Action::Resolve(resolve) => resolve(self, &subject),
            };
            if inference.is_some() {
                tracing::trace!(rule = rule.name, name = %entity.name, "inferred type");
                return inference;
            }
        }
        None
    }

    /// Descriptor for one attribute, without member descriptors
    pub fn describe(&mut self, entity: &NamedEntity, site: &Site) -> Option<TypeDescriptor> {
        let inference = self.infer(entity, site)?;
        let descriptor = TypeDescriptor {
            name: entity.name.clone(),
            kind: inference.kind,
            is_set: entity.syntax.is_set(),
            underlying: inference.underlying,
            secondary: inference.kind.secondary(),
            doc_note: inference.doc_note,
            syntax: entity.syntax.text().to_string(),
            specs: entity.specs.iter().cloned().collect(),
            members: Vec::new(),
        };
        if descriptor.kind == TypeKind::KeyValue {
            self.key_values
                .insert(entity.name.clone(), descriptor.clone());
        }
        Some(descriptor)
    }

    /// Descriptors for every member of `collection`, or the first member with no type
    pub fn describe_members<'e>(
        &mut self,
        collection: &'e NamedEntity,
        site: &Site,
    ) -> Result<Vec<TypeDescriptor>, &'e NamedEntity> {
        let mut descriptors = Vec::with_capacity(collection.members.len());
        for member in collection.members.values() {
            let Some(mut descriptor) = self.describe(member, site) else {
                return Err(member);
            };
            if member.is_collection() {
                descriptor.members = self.describe_members(member, &site.child(&member.name))?;
            }
            descriptors.push(descriptor);
        }
        Ok(descriptors)
    }

    /// Type every emitted collection and every canonical attribute
    pub fn run(mut self) -> InferredTypes {
        let _span = tracing::debug_span!("infer_types").entered();
        let registry = self.registry;

        let mut collections = Vec::new();
        for collection in registry.collections.values().filter(|c| c.emitted) {
            let site = Site::Types.child(&collection.name);
            // Usages and key-values recorded by a collection that fails are rolled back
            let enum_usages = self.enum_usages.clone();
            let key_values = self.key_values.clone();
            match self.describe_members(collection, &site) {
                Ok(members) => collections.push(CollectionDefinition {
                    name: collection.name.clone(),
                    specs: collection.specs.iter().cloned().collect(),
                    members,
                }),
                Err(member) => {
                    self.enum_usages = enum_usages;
                    self.key_values = key_values;
                    self.diagnostics.warn(
                        WarningKind::NoTypeMapping,
                        format!(
                            "Collection {} member {} has no type for '{}'",
                            collection.name,
                            member.name,
                            member.syntax.text()
                        ),
                        Some(member),
                    );
                }
            }
        }

        let mut types = Vec::with_capacity(registry.types.len());
        for entity in registry.types.values().sorted_by(|a, b| a.name.cmp(&b.name)) {
            match self.describe(entity, &Site::Types) {
                Some(descriptor) => types.push(descriptor),
                None => self.diagnostics.warn(
                    WarningKind::NoTypeMapping,
                    format!(
                        "No type for attribute {} with syntax '{}'",
                        entity.name,
                        entity.syntax.raw()
                    ),
                    Some(entity),
                ),
            }
        }
        tracing::debug!(types = types.len(), collections = collections.len(), "inferred types");

        InferredTypes {
            types,
            collections,
            enum_usages: self.enum_usages,
            key_values: self.key_values,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reference;
    use crate::syntax::Syntax;

    fn entity(name: &str, syntax: &str) -> NamedEntity {
        NamedEntity::new(name, Syntax::normalize(syntax))
    }

    fn keyword_with(name: &str, values: &[&str]) -> NamedEntity {
        let mut keyword = entity(name, "keyword");
        for value in values {
            keyword.values.insert_keyword(*value);
        }
        keyword
    }

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        let mut job_state = entity("job-state", "enum");
        job_state.values.insert_enumerated("pending", 3);
        job_state.values.insert_enumerated("processing", 5);
        registry.enums.insert(job_state.name.clone(), job_state);

        for keyword in [
            keyword_with("sides", &["one-sided", "two-sided-long-edge"]),
            keyword_with("media", &["iso_a4_210x297mm"]),
            keyword_with("job-hold-until", &["no-hold"]),
        ] {
            registry.keywords.insert(keyword.name.clone(), keyword);
        }
        registry
    }

    fn kind_of(registry: &ModelRegistry, name: &str, syntax: &str) -> Option<TypeKind> {
        TypeInferencer::new(registry)
            .infer(&entity(name, syntax), &Site::Types)
            .map(|inference| inference.kind)
    }

    #[test]
    fn test_plain_kinds() {
        let registry = ModelRegistry::new();
        let cases = [
            ("printer-uri-supported", "1setOf uri", TypeKind::Uri),
            ("job-more-info", "uri(1023)", TypeKind::Uri),
            ("page-ranges", "1setOf rangeOfInteger(1:MAX)", TypeKind::IntRange),
            ("copies", "integer(1:MAX)", TypeKind::Integer),
            ("number-up", "integer(1:MAX) | rangeOfInteger(1:MAX)", TypeKind::IntOrIntRange),
            ("color-supported", "boolean", TypeKind::Boolean),
            ("attributes-charset", "charset", TypeKind::Charset),
            ("document-format", "mimeMediaType", TypeKind::MimeMediaType),
            ("attributes-natural-language", "naturalLanguage", TypeKind::NaturalLanguage),
            ("reference-uri-schemes-supported", "1setOf uriScheme", TypeKind::UriScheme),
            ("printer-resolution", "resolution", TypeKind::Resolution),
            ("date-time-at-creation", "dateTime", TypeKind::DateTime),
            ("job-name", "name(MAX)", TypeKind::Name),
            ("printer-name", "name(127)", TypeKind::Name),
            ("printer-info", "text(127)", TypeKind::Text),
            ("job-password", "octetString(255)", TypeKind::OctetString),
            ("printer-supply", "1setOf octetString(MAX)", TypeKind::KeyValue),
            ("preferred-attributes", "collection", TypeKind::UntypedCollection),
            ("media-col", "collection", TypeKind::Collection),
        ];
        for (name, syntax, kind) in cases {
            assert_eq!(kind_of(&registry, name, syntax), Some(kind), "{name}: {syntax}");
        }
        assert_eq!(kind_of(&registry, "mystery", "integer | boolean"), None);
        assert_eq!(kind_of(&registry, "empty", ""), None);
    }

    #[test]
    fn test_enum_binds_and_records_usage() {
        let registry = registry();
        let mut inferencer = TypeInferencer::new(&registry);
        let inference = inferencer
            .infer(&entity("job-state", "type1 enum"), &Site::Types)
            .unwrap();
        assert_eq!(inference.kind, TypeKind::Enumeration);
        assert_eq!(inference.underlying.as_deref(), Some("job-state"));

        inferencer.infer(&entity("job-state", "type1 enum"), &Site::Types);
        inferencer.infer(
            &entity("job-state", "type1 enum"),
            &Site::Types.child("job-status-col"),
        );
        assert_eq!(
            inferencer.enum_usages["job-state"],
            ["types.job-state", "job-status-col.job-state"]
        );
    }

    #[test]
    fn test_unresolved_enum_has_no_type() {
        let registry = registry();
        assert_eq!(kind_of(&registry, "finishings", "1setOf type2 enum"), None);
    }

    #[test]
    fn test_keyword_resolution() {
        let registry = registry();
        let mut inferencer = TypeInferencer::new(&registry);

        let sides = inferencer.infer(&entity("sides-supported", "1setOf keyword"), &Site::Types).unwrap();
        assert_eq!(sides.kind, TypeKind::Keyword);
        assert_eq!(sides.underlying.as_deref(), Some("sides"));
        assert_eq!(sides.doc_note.as_deref(), Some("May contain any keyword from [Sides]."));

        let media = inferencer
            .infer(&entity("media-key", "keyword | name(MAX)"), &Site::Types)
            .unwrap();
        assert_eq!(media.kind, TypeKind::KeywordOrName);
        assert_eq!(media.underlying.as_deref(), Some("media"));
        assert_eq!(
            media.doc_note.as_deref(),
            Some("May contain any keyword from [Media] or a name.")
        );

        let untyped = inferencer.infer(&entity("unknown-keyword", "keyword"), &Site::Types).unwrap();
        assert_eq!(untyped.kind, TypeKind::Keyword);
        assert_eq!(untyped.underlying, None);
    }

    #[test]
    fn test_keyword_of_collection_members() {
        let mut registry = registry();
        let mut col = entity("job-constraints-col", "collection");
        col.members.insert("resolver-name".into(), entity("resolver-name", "name"));
        registry.collections.insert(col.name.clone(), col);

        let inference = TypeInferencer::new(&registry)
            .infer(&entity("job-constraints-col-supported", "1setOf keyword"), &Site::Types)
            .unwrap();
        assert_eq!(inference.underlying.as_deref(), Some("job-constraints-col"));
        assert_eq!(
            inference.doc_note.as_deref(),
            Some("May contain any keyword from [JobConstraintsCol.Name].")
        );
    }

    #[test]
    fn test_inference_syntax_override() {
        let mut registry = registry();
        let mut collation = entity("job-collation-type", "enum");
        collation.values.insert_enumerated("uncollated-documents", 4);
        registry.enums.insert(collation.name.clone(), collation);

        assert_eq!(
            kind_of(&registry, "job-collation-type-actual", "1setOf type2 keyword"),
            Some(TypeKind::Enumeration)
        );
    }

    #[test]
    fn test_run_describes_types_and_collections() {
        let mut registry = registry();

        let mut media_col = entity("media-col", "collection");
        let mut media_size = entity("media-size", "collection");
        media_size.inner = true;
        media_size
            .members
            .insert("x-dimension".into(), entity("x-dimension", "integer(0:MAX)"));
        media_col.members.insert("media-size".into(), media_size);
        media_col.members.insert("media-key".into(), entity("media-key", "keyword | name"));
        media_col.emitted = true;
        registry.collections.insert(media_col.name.clone(), media_col.clone());

        let mut broken = entity("broken-col", "collection");
        broken.members.insert("oddity".into(), entity("oddity", "integer | boolean"));
        broken.emitted = true;
        registry.collections.insert(broken.name.clone(), broken);

        let mut media_col_default = entity("media-col-default", "collection");
        media_col_default.reference = Some(Reference::ByCollectionAlias {
            collection: "media-col".into(),
            family: None,
        });
        for attribute in [
            entity("sides", "1setOf type2 keyword"),
            entity("job-state", "type1 enum"),
            entity("printer-alert", "1setOf octetString(MAX)"),
            media_col,
            media_col_default,
            entity("mystery", "integer | boolean"),
        ] {
            registry.types.insert(attribute.name.clone(), attribute);
        }

        let inferred = TypeInferencer::new(&registry).run();

        let names: Vec<_> = inferred.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            ["job-state", "media-col", "media-col-default", "printer-alert", "sides"]
        );
        let sides = &inferred.types[4];
        assert_eq!(sides.kind, TypeKind::Keyword);
        assert!(sides.is_set);
        assert_eq!(inferred.types[2].underlying.as_deref(), Some("media-col"));

        assert_eq!(inferred.collections.len(), 1);
        let media_size = &inferred.collections[0].members[0];
        assert_eq!(media_size.kind, TypeKind::Collection);
        assert_eq!(media_size.members[0].kind, TypeKind::Integer);

        assert!(inferred.key_values.contains_key("printer-alert"));
        assert_eq!(inferred.enum_usages["job-state"], ["types.job-state"]);
        assert_eq!(inferred.diagnostics.count(WarningKind::NoTypeMapping), 2);
    }

    #[test]
    fn test_keyword_listing_member_names() {
        let mut registry = registry();
        let mut names = entity("destination-mandatory-access-attributes", "keyword");
        names.reference = Some(Reference::by_members("destination-accesses"));
        registry.keywords.insert(names.name.clone(), names);
        let mut inferencer = TypeInferencer::new(&registry);

        let keyword = inferencer
            .infer(
                &entity("destination-mandatory-access-attributes", "1setOf keyword"),
                &Site::Types,
            )
            .unwrap();
        assert_eq!(keyword.kind, TypeKind::Keyword);
        assert_eq!(keyword.underlying.as_deref(), Some("destination-accesses"));
        assert_eq!(
            keyword.doc_note.as_deref(),
            Some("May contain any keyword from [DestinationAccesses.Name].")
        );

        let keyword_or_name = inferencer
            .infer(
                &entity("destination-mandatory-access-attributes", "keyword | name(MAX)"),
                &Site::Types,
            )
            .unwrap();
        assert_eq!(keyword_or_name.kind, TypeKind::KeywordOrName);
        assert_eq!(keyword_or_name.underlying.as_deref(), Some("destination-accesses"));
    }

    #[test]
    fn test_failed_collection_leaves_no_usages() {
        let mut registry = registry();
        let mut broken = entity("job-status-col", "collection");
        broken.members.insert("job-state".into(), entity("job-state", "type1 enum"));
        broken
            .members
            .insert("printer-alert".into(), entity("printer-alert", "1setOf octetString(MAX)"));
        broken.members.insert("oddity".into(), entity("oddity", "integer | boolean"));
        broken.emitted = true;
        registry.collections.insert(broken.name.clone(), broken);

        let mut fine = entity("job-col", "collection");
        fine.members.insert("job-state".into(), entity("job-state", "type1 enum"));
        fine.emitted = true;
        registry.collections.insert(fine.name.clone(), fine);

        let inferred = TypeInferencer::new(&registry).run();

        assert_eq!(inferred.collections.len(), 1);
        assert_eq!(inferred.collections[0].name, "job-col");
        assert_eq!(inferred.enum_usages["job-state"], ["job-col.job-state"]);
        assert!(!inferred.key_values.contains_key("printer-alert"));
        assert_eq!(inferred.diagnostics.count(WarningKind::NoTypeMapping), 1);
    }
}
