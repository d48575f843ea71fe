use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use stubgen_processor::ArtifactKind;
use stubgen_symbols::{Annotation, ClassDecl, PropertyDecl, SourceFile, TypeParameter, TypeRef};

use super::{contents, names, run, universe, FAKE, MOCK};

fn main_sources() -> SourceFile {
    SourceFile::new("src/main/Model.kt", "com.example")
        .with_class(ClassDecl::interface("Repo"))
        .with_class(ClassDecl::class("Config"))
}

#[test]
fn injector_assigns_every_annotated_field() {
    let mut supplier = PropertyDecl::var(
        "supplier",
        TypeRef::function([], TypeRef::named("kotlin.String")),
    );
    supplier.setter_annotations.push(Annotation::new(MOCK));

    let test = ClassDecl::class("SampleTest")
        .with_property(
            PropertyDecl::var("repo", TypeRef::named("com.example.Repo")).annotated(Annotation::new(MOCK)),
        )
        .with_property(
            PropertyDecl::var(
                "onEvent",
                TypeRef::function(
                    [TypeRef::named("kotlin.String"), TypeRef::named("kotlin.Int")],
                    TypeRef::named("kotlin.Unit"),
                ),
            )
            .annotated(Annotation::new(MOCK)),
        )
        .with_property(supplier)
        .with_property(
            PropertyDecl::var("config", TypeRef::named("com.example.Config")).annotated(Annotation::new(FAKE)),
        )
        .with_property(
            PropertyDecl::var("name", TypeRef::named("kotlin.String")).annotated(Annotation::new(FAKE)),
        );

    let artifacts = run(&universe([
        main_sources(),
        SourceFile::new("src/test/SampleTest.kt", "com.example.test").with_class(test),
    ]));

    assert_eq!(
        names(&artifacts),
        [
            "com.example.MockRepo",
            "com.example.fakeConfig",
            "com.example.test.SampleTest_injectMocks",
        ]
    );
    let injector = &artifacts[2];
    assert_eq!(injector.kind, ArtifactKind::Injector);
    assert_eq!(
        injector.origins.iter().collect::<Vec<_>>(),
        ["src/test/SampleTest.kt"]
    );
    assert_snapshot!(
        contents(&artifacts, "com.example.test.SampleTest_injectMocks"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example.test

import com.example.MockRepo
import com.example.fakeConfig
import org.kodein.micromock.Mocker
import org.kodein.micromock.mockFunction0
import org.kodein.micromock.mockFunction2

internal fun SampleTest.injectMocks(mocker: Mocker) {
    this.repo = MockRepo(mocker)
    this.onEvent = mockFunction2(mocker, "kotlin.String", "kotlin.Int")
    this.supplier = mockFunction0(mocker)
    this.config = fakeConfig()
    this.name = ""
}
"###
    );
}

#[test]
fn function_types_spelled_as_function_n_use_their_type_arguments() {
    let test = ClassDecl::class("HandlerTest").with_property(
        PropertyDecl::var(
            "handler",
            TypeRef::generic(
                "kotlin.Function1",
                [TypeRef::param("T"), TypeRef::named("kotlin.Boolean")],
            ),
        )
        .annotated(Annotation::new(MOCK)),
    );
    let artifacts = run(&universe([SourceFile::new("src/test/HandlerTest.kt", "com.example").with_class(test)]));

    let injector = contents(&artifacts, "com.example.HandlerTest_injectMocks");
    assert!(
        injector.contains(r#"    this.handler = mockFunction1(mocker, "?")"#),
        "{injector}"
    );
}

#[test]
fn generic_owners_are_star_projected() {
    let test = ClassDecl::class("BaseTest")
        .with_type_parameter(TypeParameter::new("T"))
        .with_property(
            PropertyDecl::var("repo", TypeRef::named("com.example.Repo")).annotated(Annotation::new(MOCK)),
        );
    let artifacts = run(&universe([
        main_sources(),
        SourceFile::new("src/test/BaseTest.kt", "com.example").with_class(test),
    ]));

    let injector = contents(&artifacts, "com.example.BaseTest_injectMocks");
    assert!(
        injector.contains("internal fun BaseTest<*>.injectMocks(mocker: Mocker) {"),
        "{injector}"
    );
}

#[test]
fn owners_without_annotated_fields_get_no_injector() {
    let artifacts = run(&universe([
        main_sources(),
        SourceFile::new("src/test/PlainTest.kt", "com.example")
            .with_class(ClassDecl::class("PlainTest").with_property(PropertyDecl::var(
                "repo",
                TypeRef::named("com.example.Repo"),
            ))),
    ]));
    assert!(artifacts.is_empty());
}
