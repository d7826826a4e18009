//! # IANA IPP registry resolution and type inference
//!
//! Turns records extracted from the IANA IPP registrations document into a
//! cross-referenced, typed model that code generators can render without
//! consulting the registry themselves.
//!
//! The registry is hand-edited: grammars are spelled inconsistently, value
//! lists point at each other in free-form prose, and collection members are
//! spread across several records and families. The engine reconciles all of
//! that deterministically and reports every irregularity as a [`Warning`].
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p ipp-registry --bin ipp-typegen -- \
//!     -i build/ipp-registrations.json \
//!     -o build/ipp-model.json
//! ```
//!
//! Settings can also live in a KDL file passed with `-c`, see [`config`].
//!
//! From code:
//!
//! ```no_run
//! use ipp_registry::{RecordCorpus, resolve};
//!
//! let corpus = RecordCorpus::load("build/ipp-registrations.json")?;
//! let model = resolve(corpus.records());
//! println!("{} types, {} warnings", model.types.len(), model.warning_count());
//! # Ok::<(), ipp_registry::RegistryError>(())
//! ```
//!
//! ## Modules
//!
//! - [`syntax`] - Grammar normalization
//! - [`reference`] - Reference prose parsing and fuzzy name lookup
//! - [`registry`] - Entity tables and record ingestion
//! - [`assemble`] - Collection merging and cross-family unification
//! - [`infer`] - Grammar to type kind mapping
//! - [`pipeline`] - One full run from records to model
//! - [`overrides`] - Known registry irregularities
//! - [`corpus`] - Loading record files
//! - [`output`] - The resolved model

pub mod assemble;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod error;
pub mod infer;
pub mod model;
pub mod names;
pub mod output;
pub mod overrides;
pub mod pipeline;
pub mod records;
pub mod reference;
pub mod registry;
pub mod syntax;

pub use corpus::RecordCorpus;
pub use error::{RegistryError, Result, Warning, WarningKind};
pub use model::{TypeDescriptor, TypeKind};
pub use output::ResolvedModel;
pub use pipeline::resolve;
pub use records::RegistryRecords;
