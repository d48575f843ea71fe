use stubgen_symbols::{
    AnnotatedSymbol, Annotation, ClassDecl, FunctionDecl, PropertyDecl, Resolver, Snapshot,
    SourceFile, SymbolUniverse, TypeRef,
};

const MOCK: &str = "org.kodein.micromock.Mock";
const USES_MOCKS: &str = "org.kodein.micromock.UsesMocks";

fn universe() -> SymbolUniverse {
    let mut setter_marked = PropertyDecl::var("clock", TypeRef::named("com.example.Clock"));
    setter_marked.setter_annotations.push(Annotation::new(MOCK));

    SymbolUniverse::from_snapshot(Snapshot::new([
        SourceFile::new("src/test/RepoTest.kt", "com.example")
            .annotated(Annotation::listing(USES_MOCKS, [TypeRef::named("Clock")]))
            .with_class(
                ClassDecl::class("RepoTest")
                    .annotated(Annotation::listing(
                        USES_MOCKS,
                        [TypeRef::named("com.example.Repo")],
                    ))
                    .with_property(
                        PropertyDecl::var("repo", TypeRef::named("com.example.Repo"))
                            .annotated(Annotation::new(MOCK)),
                    )
                    .with_property(setter_marked)
                    .with_function(FunctionDecl::new("setUp").annotated(Annotation::listing(
                        USES_MOCKS,
                        [TypeRef::named("com.example.Store")],
                    ))),
            )
            .with_property(
                PropertyDecl::var("global", TypeRef::named("com.example.Repo"))
                    .annotated(Annotation::new(MOCK)),
            ),
        SourceFile::new("src/main/Repo.kt", "com.example")
            .with_class(ClassDecl::interface("Repo"))
            .with_class(ClassDecl::interface("Clock"))
            .with_class(ClassDecl::interface("Store")),
    ]))
    .expect("valid snapshot")
}

#[test]
fn field_markers_are_reported_per_site_in_declaration_order() {
    let universe = universe();
    let sites = universe.symbols_with_annotation(MOCK);
    let described: Vec<String> = sites.iter().map(|site| site.describe()).collect();
    assert_eq!(
        described,
        vec![
            "property repo".to_string(),
            "setter of property clock".to_string(),
            "property global".to_string(),
        ]
    );

    match sites[2] {
        AnnotatedSymbol::Property { owner, .. } => assert!(owner.is_none()),
        other => panic!("expected a top-level property site, got {other:?}"),
    }
}

#[test]
fn use_site_markers_cover_files_classes_and_functions() {
    let universe = universe();
    let sites = universe.symbols_with_annotation(USES_MOCKS);
    assert_eq!(sites.len(), 3);
    assert!(matches!(sites[0], AnnotatedSymbol::File { .. }));
    assert!(matches!(sites[1], AnnotatedSymbol::Class { .. }));
    assert!(matches!(sites[2], AnnotatedSymbol::Function { .. }));
    assert!(sites.iter().all(|site| site.file() == "src/test/RepoTest.kt"));
}

#[test]
fn unknown_annotations_yield_no_sites() {
    let universe = universe();
    assert!(universe
        .symbols_with_annotation("org.kodein.micromock.Fake")
        .is_empty());
}
