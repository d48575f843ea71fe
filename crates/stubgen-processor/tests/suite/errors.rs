use stubgen_processor::{MemoryWriter, ProcessError, Processor, ProcessorOptions};
use stubgen_symbols::{
    Annotation, ClassDecl, Location, Modifier, PropertyDecl, SourceFile, TypeRef, ValueParameter,
};

use super::{universe, FAKE, MOCK, USES_FAKES, USES_MOCKS};

fn process(files: Vec<SourceFile>) -> ProcessError {
    let universe = universe(files);
    Processor::new(ProcessorOptions::default())
        .run(&universe)
        .expect_err("round should fail")
}

#[test]
fn mocking_a_class_is_an_invalid_target() {
    let err = process(vec![SourceFile::new("src/Test.kt", "app")
        .with_class(ClassDecl::class("Service"))
        .annotated(Annotation {
            location: Some(Location::new("src/Test.kt", 1)),
            ..Annotation::listing(USES_MOCKS, [TypeRef::named("app.Service")])
        })]);

    assert!(matches!(err, ProcessError::InvalidTarget { .. }), "{err:?}");
    assert_eq!(
        err.to_string(),
        "src/Test.kt:1: Cannot generate mock for non interface class app.Service"
    );
}

#[test]
fn faking_an_abstract_class_is_an_invalid_target() {
    let err = process(vec![SourceFile::new("src/Test.kt", "app")
        .with_class(ClassDecl::class("Shape").with_modifier(Modifier::Abstract))
        .annotated(Annotation::listing(USES_FAKES, [TypeRef::named("app.Shape")]))]);

    assert!(matches!(err, ProcessError::InvalidTarget { .. }), "{err:?}");
    assert!(err.to_string().contains("non concrete abstract class app.Shape"), "{err}");
}

#[test]
fn faking_an_empty_enum_is_an_invalid_target() {
    let err = process(vec![SourceFile::new("src/Test.kt", "app")
        .with_class(ClassDecl::enum_class("Nothing", &[]).at(Location::new("src/Model.kt", 9)))
        .annotated(Annotation::listing(USES_FAKES, [TypeRef::named("app.Nothing")]))]);

    assert!(matches!(err, ProcessError::InvalidTarget { .. }), "{err:?}");
    assert_eq!(
        err.to_string(),
        "src/Model.kt:9: Cannot fake empty enum class app.Nothing"
    );
}

#[test]
fn interfaces_required_by_a_fake_are_rejected() {
    let err = process(vec![SourceFile::new("src/Test.kt", "app")
        .with_class(ClassDecl::interface("Clock"))
        .with_class(ClassDecl::class("Timer").with_constructor(vec![ValueParameter::new(
            "clock",
            TypeRef::named("app.Clock"),
        )]))
        .annotated(Annotation::listing(USES_FAKES, [TypeRef::named("app.Timer")]))]);

    assert_eq!(
        err.to_string(),
        "Unknown location: Cannot generate fake for non concrete interface app.Clock"
    );
}

#[test]
fn every_problem_in_a_round_is_reported() {
    let test = ClassDecl::class("BrokenTest")
        .with_property(
            PropertyDecl::val("repo", TypeRef::named("app.Repo"))
                .annotated(Annotation::new(MOCK))
                .at(Location::new("src/Test.kt", 4)),
        )
        .with_property(
            PropertyDecl::var("service", TypeRef::named("app.Service"))
                .annotated(Annotation::new(MOCK))
                .at(Location::new("src/Test.kt", 5)),
        )
        .with_property(
            PropertyDecl::var("missing", TypeRef::named("app.Missing"))
                .annotated(Annotation::new(FAKE))
                .at(Location::new("src/Test.kt", 6)),
        );
    let err = process(vec![SourceFile::new("src/Test.kt", "app")
        .with_class(ClassDecl::interface("Repo"))
        .with_class(ClassDecl::class("Service"))
        .with_class(test)]);

    let ProcessError::Aborted(errors) = &err else {
        panic!("expected an aggregated error, got {err:?}");
    };
    let kinds: Vec<&str> = errors.iter().map(ProcessError::kind).collect();
    assert_eq!(kinds, ["configuration", "invalid_target", "invalid_target"]);
    assert_eq!(
        err.to_string(),
        "processing aborted with 3 error(s)\n  \
         src/Test.kt:4: property repo is immutable but is annotated with @Mock\n  \
         src/Test.kt:5: Cannot generate mock for non interface class app.Service\n  \
         src/Test.kt:6: Cannot generate fake for unknown type app.Missing"
    );
}

#[test]
fn constructor_cycles_fail_instead_of_looping() {
    let err = process(vec![SourceFile::new("src/Model.kt", "app")
        .with_class(ClassDecl::class("Chicken").with_constructor(vec![ValueParameter::new(
            "egg",
            TypeRef::named("app.Egg"),
        )]))
        .with_class(ClassDecl::class("Egg").with_constructor(vec![ValueParameter::new(
            "chicken",
            TypeRef::named("app.Chicken"),
        )]))
        .annotated(Annotation::listing(USES_FAKES, [TypeRef::named("app.Chicken")]))]);

    assert!(matches!(err, ProcessError::InvalidTarget { .. }), "{err:?}");
    assert!(
        err.to_string()
            .ends_with("form a cycle app.Chicken -> app.Egg -> app.Chicken"),
        "{err}"
    );
}

#[test]
fn failed_rounds_write_nothing() {
    let universe = universe(vec![SourceFile::new("src/Test.kt", "app")
        .with_class(ClassDecl::interface("Repo"))
        .with_class(ClassDecl::class("Service"))
        .annotated(Annotation::listing(
            USES_MOCKS,
            [TypeRef::named("app.Repo"), TypeRef::named("app.Service")],
        ))]);

    let mut writer = MemoryWriter::new();
    let result = Processor::new(ProcessorOptions::default()).run_and_write(&universe, &mut writer);
    assert!(result.is_err());
    assert!(writer.artifacts().is_empty());
}
