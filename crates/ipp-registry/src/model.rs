//! Entities held by the [`ModelRegistry`](crate::registry::ModelRegistry).
//!
//! Enumerations, keywords and attributes share one shape, [`NamedEntity`].
//! Cross-references between them are weak: a [`Reference`] carries only a
//! name and is resolved against the registry tables on demand.

use crate::syntax::Syntax;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use smol_str::SmolStr;

/// A standards document cited by registry records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecReference {
    /// Short spec name, e.g. `RFC8011` or `PWG5100.7`
    pub id: SmolStr,
    pub uri: String,
}

/// Weak pointer from one entity to others, resolved by lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Reference {
    /// Another entity of the same kind, followed transitively
    ByName { name: SmolStr },
    /// Any attribute name in an attribute family
    ByGroup { family: SmolStr },
    /// Any member name of a collection
    ByMembers { collection: SmolStr },
    /// Members identical to another named collection
    ByCollectionAlias {
        collection: SmolStr,
        family: Option<SmolStr>,
    },
}

impl Reference {
    pub fn by_name(name: impl Into<SmolStr>) -> Self {
        Self::ByName { name: name.into() }
    }

    pub fn by_group(family: impl Into<SmolStr>) -> Self {
        Self::ByGroup {
            family: family.into(),
        }
    }

    pub fn by_members(collection: impl Into<SmolStr>) -> Self {
        Self::ByMembers {
            collection: collection.into(),
        }
    }

    /// Target name when this is a [`Reference::ByName`]
    pub fn name(&self) -> Option<&SmolStr> {
        match self {
            Self::ByName { name } => Some(name),
            _ => None,
        }
    }

    /// Aliased collection when this is a [`Reference::ByCollectionAlias`]
    pub fn alias(&self) -> Option<&SmolStr> {
        match self {
            Self::ByCollectionAlias { collection, .. } => Some(collection),
            _ => None,
        }
    }
}

/// Concrete values attached to an enumeration or keyword
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Values {
    #[default]
    None,
    /// Label to integer code
    Enumerated(IndexMap<SmolStr, i64>),
    Keywords(IndexSet<SmolStr>),
}

impl Values {
    pub fn is_empty(&self) -> bool {
        match self {
            Values::None => true,
            Values::Enumerated(values) => values.is_empty(),
            Values::Keywords(values) => values.is_empty(),
        }
    }

    pub fn insert_enumerated(&mut self, label: impl Into<SmolStr>, code: i64) {
        if !matches!(self, Values::Enumerated(_)) {
            *self = Values::Enumerated(IndexMap::new());
        }
        if let Values::Enumerated(values) = self {
            values.insert(label.into(), code);
        }
    }

    pub fn insert_keyword(&mut self, keyword: impl Into<SmolStr>) {
        if !matches!(self, Values::Keywords(_)) {
            *self = Values::Keywords(IndexSet::new());
        }
        if let Values::Keywords(values) = self {
            values.insert(keyword.into());
        }
    }
}

/// Member attributes of a collection, in registry order
pub type Members = IndexMap<SmolStr, NamedEntity>;

/// Entities of one kind keyed by name, in first-mention order
pub type EntityTable = IndexMap<SmolStr, NamedEntity>;

/// An enumeration, keyword or attribute, possibly a collection with members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedEntity {
    pub name: SmolStr,
    pub syntax: Syntax,
    /// Ids of the specs that define this entity, in citation order
    pub specs: IndexSet<SmolStr>,
    pub values: Values,
    pub reference: Option<Reference>,
    pub members: Members,
    /// Value prose could not be parsed; kept so references can see it
    pub bad: bool,
    /// Enumeration codes are written in hexadecimal
    pub hex: bool,
    /// A member of a collection rather than a top-level attribute
    pub inner: bool,
    /// Emitted even without values (a keyword that also accepts names)
    pub empty_ok: bool,
    /// Keyword registration type, e.g. `type2`
    pub keyword_type: Option<SmolStr>,
    /// Prose describing legal values that are not listed
    pub doc_note: Option<String>,
    /// Produced by the collection assembler
    pub emitted: bool,
}

impl NamedEntity {
    pub fn new(name: impl Into<SmolStr>, syntax: Syntax) -> Self {
        Self {
            name: name.into(),
            syntax,
            specs: IndexSet::new(),
            values: Values::None,
            reference: None,
            members: Members::new(),
            bad: false,
            hex: false,
            inner: false,
            empty_ok: false,
            keyword_type: None,
            doc_note: None,
            emitted: false,
        }
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn is_collection(&self) -> bool {
        !self.members.is_empty()
    }

    pub fn alias(&self) -> Option<&SmolStr> {
        self.reference.as_ref().and_then(Reference::alias)
    }

    pub fn add_spec(&mut self, id: impl Into<SmolStr>) {
        self.specs.insert(id.into());
    }

    /// Structural equality ignoring cited specs, notes and emission state
    pub fn same_declaration(&self, other: &NamedEntity) -> bool {
        self.name == other.name
            && self.syntax == other.syntax
            && self.values == other.values
            && self.reference == other.reference
            && self.bad == other.bad
            && self.same_members(other)
    }

    /// Member maps are structurally equal, in any order
    pub fn same_members(&self, other: &NamedEntity) -> bool {
        self.members.len() == other.members.len()
            && self.members.iter().all(|(name, member)| {
                other
                    .members
                    .get(name)
                    .is_some_and(|theirs| member.same_declaration(theirs))
            })
    }
}

/// Canonical representation kinds a resolved attribute maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    KeywordOrName,
    Keyword,
    Enumeration,
    KeyValue,
    Uri,
    IntRange,
    IntOrIntRange,
    Integer,
    Boolean,
    Charset,
    MimeMediaType,
    NaturalLanguage,
    UriScheme,
    Resolution,
    Collection,
    UntypedCollection,
    DateTime,
    Name,
    Text,
    OctetString,
}

impl TypeKind {
    /// Component kinds of a disjunctive kind
    pub fn secondary(self) -> Vec<TypeKind> {
        match self {
            TypeKind::KeywordOrName => vec![TypeKind::Keyword, TypeKind::Name],
            TypeKind::IntOrIntRange => vec![TypeKind::Integer, TypeKind::IntRange],
            _ => Vec::new(),
        }
    }
}

/// How one resolved attribute is represented downstream
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    /// Canonical attribute name
    pub name: SmolStr,
    pub kind: TypeKind,
    /// Multi-valued (`1setOf`)
    pub is_set: bool,
    /// Enum, keyword or collection the kind binds to
    pub underlying: Option<SmolStr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<TypeKind>,
    pub doc_note: Option<String>,
    /// Normalized grammar the kind was inferred from
    pub syntax: String,
    pub specs: Vec<SmolStr>,
    /// Descriptors of members declared inline on this attribute
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<TypeDescriptor>,
}
