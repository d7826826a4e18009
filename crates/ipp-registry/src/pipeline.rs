//! One resolution run, from extracted records to the resolved model.
//!
//! Record kinds are ingested in a fixed order: enumerations, keywords (plus
//! the synthetic ones), attributes, status codes. Later phases rely on the
//! tables earlier ones filled, so the order here is part of the behavior.

use crate::assemble::CollectionAssembler;
use crate::infer::TypeInferencer;
use crate::output::ResolvedModel;
use crate::records::RegistryRecords;
use crate::registry::ModelRegistry;

/// Ingest `records` into a fresh registry and apply the registry-level fixups
pub fn build_registry(records: &RegistryRecords) -> ModelRegistry {
    let _span = tracing::debug_span!("ingest", records = records.len()).entered();
    let mut registry = ModelRegistry::new();

    for record in &records.enums {
        registry.ingest_enum(record);
    }
    for record in &records.keywords {
        registry.ingest_keyword(record);
    }
    registry.inject_synthetic_keywords();
    for record in &records.attributes {
        registry.ingest_attribute(record);
    }
    for record in &records.status_codes {
        registry.ingest_status_code(record);
    }
    registry.apply_member_patches();

    tracing::debug!(
        enums = registry.enums.len(),
        keywords = registry.keywords.len(),
        families = registry.attributes.len(),
        "ingested records"
    );
    registry
}

/// Run every phase over `records`
///
/// Never fails: irregular records become warnings on the returned model.
pub fn resolve(records: &RegistryRecords) -> ResolvedModel {
    let _span = tracing::debug_span!("resolve").entered();
    let mut registry = build_registry(records);

    let (enums, keywords) = {
        let _span = tracing::debug_span!("validate").entered();
        (registry.validate_enums(), registry.validate_keywords())
    };

    CollectionAssembler::new(&mut registry).run();
    let inferred = TypeInferencer::new(&registry).run();

    let ModelRegistry {
        specs,
        mut diagnostics,
        ..
    } = registry;
    diagnostics.extend(inferred.diagnostics);

    let model = ResolvedModel {
        updated: records.updated.clone(),
        specs,
        enums,
        keywords,
        collections: inferred.collections,
        types: inferred.types,
        enum_usages: inferred.enum_usages,
        key_values: inferred.key_values,
        warnings: diagnostics.into_warnings(),
    };
    tracing::info!(
        types = model.types.len(),
        collections = model.collections.len(),
        warnings = model.warning_count(),
        "resolved registry"
    );
    model
}
