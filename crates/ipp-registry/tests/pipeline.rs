use ipp_registry::{RecordCorpus, ResolvedModel, TypeKind, WarningKind, resolve};

fn fixture_model() -> ResolvedModel {
    let corpus = RecordCorpus::load("tests/fixtures/registry.json").expect("failed to load fixture");
    resolve(corpus.records())
}

fn warnings_of(model: &ResolvedModel, kind: WarningKind) -> usize {
    model.warnings.iter().filter(|w| w.kind() == kind).count()
}

#[test]
fn test_enumerations_resolve_with_usages() {
    let model = fixture_model();

    let job_state = model.get_enum("job-state").unwrap();
    assert_eq!(
        job_state.values.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
        ["pending", "pending-held", "processing"]
    );
    assert!(!job_state.hex);

    let orientation = model.get_enum("orientation-requested").unwrap();
    assert_eq!(orientation.name, "orientation");
    assert_eq!(orientation.refs, ["orientation-requested-supported"]);
    assert!(model.get_enum("orientation-requested-supported").is_none());

    let status = model.get_enum("status").unwrap();
    assert!(status.hex);
    assert_eq!(status.values.len(), 2);

    let descriptor = model.get_type("job-state").unwrap();
    assert_eq!(descriptor.kind, TypeKind::Enumeration);
    assert_eq!(descriptor.underlying.as_deref(), Some("job-state"));
    assert_eq!(model.enum_usages["orientation-requested"], ["types.orientation-requested"]);
}

#[test]
fn test_keywords_bind_to_attributes() {
    let model = fixture_model();

    let hold = model.get_keyword("job-hold-until").unwrap();
    assert_eq!(hold.values, ["indefinite", "no-hold"]);

    let sides = model.get_type("sides-supported").unwrap();
    assert_eq!(sides.kind, TypeKind::Keyword);
    assert!(sides.is_set);
    assert_eq!(sides.underlying.as_deref(), Some("sides"));

    let media = model.get_type("media").unwrap();
    assert_eq!(media.kind, TypeKind::KeywordOrName);
    assert_eq!(media.underlying.as_deref(), Some("media"));
}

#[test]
fn test_collections_and_aliases() {
    let model = fixture_model();

    let media_col = model.get_collection("media-col").unwrap();
    let members: Vec<_> = media_col.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(members, ["media-key", "media-size", "media-source"]);
    assert_eq!(media_col.members[0].underlying.as_deref(), Some("media"));
    let media_size = &media_col.members[1];
    assert_eq!(media_size.kind, TypeKind::Collection);
    assert!(media_size.members.iter().all(|m| m.kind == TypeKind::Integer));
    assert_eq!(media_size.members.len(), 2);

    for alias in ["media-col-default", "media-col-actual"] {
        let descriptor = model.get_type(alias).unwrap();
        assert_eq!(descriptor.kind, TypeKind::Collection, "{alias}");
        assert_eq!(descriptor.underlying.as_deref(), Some("media-col"), "{alias}");
    }
    assert!(model.get_type("media-col-actual").unwrap().is_set);

    assert!(model.get_type("mystery-col").is_none());
    assert_eq!(warnings_of(&model, WarningKind::MissingCollectionMembers), 1);
    assert_eq!(warnings_of(&model, WarningKind::CollectionConflict), 0);
}

#[test]
fn test_cross_family_declarations_unify() {
    let model = fixture_model();

    let number_up = model.get_type("number-up").unwrap();
    assert_eq!(number_up.syntax, "integer");
    assert_eq!(number_up.kind, TypeKind::Integer);
    assert_eq!(number_up.specs, ["rfc8011", "PWG5100.5"]);

    assert!(model.get_type("job-priority (deprecated)").is_none());
    assert!(model.key_values.contains_key("printer-alert"));
}

#[test]
fn test_types_are_sorted_and_deterministic() {
    let model = fixture_model();
    let names: Vec<_> = model.types.iter().map(|t| t.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    assert_eq!(model.to_json().unwrap(), fixture_model().to_json().unwrap());
}

#[test]
fn test_write_model_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/ipp-model.json");
    fixture_model().write_json(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["updated"], "2024-05-13");
    assert_eq!(json["specs"]["PWG5100.7"], "https://ftp.pwg.org/pub/pwg/candidates/cs-ippjobext21-20230210-5100.7.pdf");
    assert!(json["types"].as_array().unwrap().len() > 10);
    let warnings = json["warnings"].as_array().unwrap();
    assert!(warnings.iter().any(|w| w["kind"] == "missing-collection-members"));
}
