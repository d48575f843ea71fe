use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use stubgen_symbols::{
    Annotation, ClassDecl, FunctionDecl, Modifier, PropertyDecl, SourceFile, TypeParameter, TypeRef,
};

use super::{contents, names, run, universe, MOCK, USES_MOCKS};

fn repo_sources() -> Vec<SourceFile> {
    vec![
        SourceFile::new("src/main/Repo.kt", "com.example").with_class(
            ClassDecl::interface("Repo")
                .with_property(PropertyDecl::val("count", TypeRef::named("kotlin.Int")).abstract_member())
                .with_function(
                    FunctionDecl::new("save")
                        .with_param("item", TypeRef::named("kotlin.String"))
                        .returning(TypeRef::named("kotlin.Boolean"))
                        .abstract_member(),
                ),
        ),
        SourceFile::new("src/test/RepoTest.kt", "com.example").with_class(
            ClassDecl::class("RepoTest").with_property(
                PropertyDecl::var("repo", TypeRef::named("com.example.Repo"))
                    .annotated(Annotation::new(MOCK)),
            ),
        ),
    ]
}

#[test]
fn mock_overrides_every_abstract_member() {
    let artifacts = run(&universe(repo_sources()));
    assert_eq!(
        names(&artifacts),
        ["com.example.MockRepo", "com.example.RepoTest_injectMocks"]
    );

    assert_snapshot!(
        contents(&artifacts, "com.example.MockRepo"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

import org.kodein.micromock.Mocker

internal class MockRepo(private val mocker: Mocker) : Repo {
    override val count: Int
        get() = this.mocker.register(this, "get:count")

    override fun save(item: String): Boolean {
        return this.mocker.register(this, "save(kotlin.String)", item)
    }
}
"###
    );
}

#[test]
fn mock_preserves_generics_and_inherited_members() {
    let source = ClassDecl::interface("Source")
        .with_type_parameter(TypeParameter::new("T"))
        .with_property(PropertyDecl::var("cursor", TypeRef::named("kotlin.Long")).abstract_member())
        .with_function(
            FunctionDecl::new("next")
                .returning(TypeRef::param("T"))
                .abstract_member(),
        );
    let store = ClassDecl::interface("Store")
        .with_type_parameter(TypeParameter::new("V").with_bound(TypeRef::named("kotlin.Any")))
        .with_supertype(TypeRef::generic("com.example.Source", [TypeRef::param("V")]))
        .with_function(
            FunctionDecl::new("map")
                .with_type_parameter(TypeParameter::new("R"))
                .with_param("f", TypeRef::function([TypeRef::param("V")], TypeRef::param("R")))
                .returning(TypeRef::generic("kotlin.collections.List", [TypeRef::param("R")]))
                .abstract_member(),
        )
        .with_function(FunctionDecl::new("describe").returning(TypeRef::named("kotlin.String")));

    let artifacts = run(&universe([SourceFile::new("src/main/Store.kt", "com.example")
        .annotated(Annotation::listing(USES_MOCKS, [TypeRef::named("Store")]))
        .with_class(source)
        .with_class(store)]));

    assert_snapshot!(
        contents(&artifacts, "com.example.MockStore"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

import org.kodein.micromock.Mocker

internal class MockStore<V : Any>(private val mocker: Mocker) : Store<V> {
    override var cursor: Long
        get() = this.mocker.register(this, "get:cursor")
        set(value) {
            return this.mocker.register(this, "set:cursor", value)
        }

    override fun <R> map(f: (V) -> R): List<R> {
        return this.mocker.register(this, "map(kotlin.Function1)", f)
    }

    override fun next(): V {
        return this.mocker.register(this, "next()")
    }
}
"###
    );
}

#[test]
fn mock_keeps_non_abstract_modifiers_and_unknown_types_key_as_question_marks() {
    let artifacts = run(&universe([SourceFile::new("src/main/Api.kt", "com.example")
        .annotated(Annotation::listing(USES_MOCKS, [TypeRef::named("com.example.Api")]))
        .with_class(
            ClassDecl::interface("Api").with_function(
                FunctionDecl::new("fetch")
                    .with_param("id", TypeRef::unresolved("Identifier"))
                    .with_param("retry", TypeRef::named("kotlin.Int"))
                    .with_modifier(Modifier::Suspend)
                    .abstract_member(),
            ),
        )]));

    let mock = contents(&artifacts, "com.example.MockApi");
    assert!(
        mock.contains("    override suspend fun fetch(id: Identifier, retry: Int) {\n"),
        "{mock}"
    );
    assert!(
        mock.contains(r#"this.mocker.register(this, "fetch(?, kotlin.Int)", id, retry)"#),
        "{mock}"
    );
    assert!(!mock.contains("abstract"), "{mock}");
}

#[test]
fn function_typed_mock_fields_do_not_generate_mock_classes() {
    let artifacts = run(&universe([SourceFile::new("src/test/CallbackTest.kt", "com.example")
        .with_class(
            ClassDecl::class("CallbackTest").with_property(
                PropertyDecl::var(
                    "onClick",
                    TypeRef::function([TypeRef::named("kotlin.Int")], TypeRef::named("kotlin.Unit")),
                )
                .annotated(Annotation::new(MOCK)),
            ),
        )]));

    assert_eq!(names(&artifacts), ["com.example.CallbackTest_injectMocks"]);
}

#[test]
fn same_named_interfaces_in_different_packages_get_their_own_mocks() {
    let artifacts = run(&universe([
        SourceFile::new("src/main/a/Repo.kt", "com.a").with_class(ClassDecl::interface("Repo")),
        SourceFile::new("src/main/b/Repo.kt", "com.b").with_class(ClassDecl::interface("Repo")),
        SourceFile::new("src/test/Test.kt", "com.test").annotated(Annotation::listing(
            USES_MOCKS,
            [TypeRef::named("com.a.Repo"), TypeRef::named("com.b.Repo")],
        )),
    ]));

    assert_eq!(names(&artifacts), ["com.a.MockRepo", "com.b.MockRepo"]);
    assert!(artifacts.iter().all(|artifact| artifact.origins.len() == 1
        && artifact.origins.contains("src/test/Test.kt")));
}

#[test]
fn member_types_are_qualified_against_the_declaring_file() {
    let universe = universe([
        SourceFile::new("src/main/base/Store.kt", "com.base")
            .with_class(ClassDecl::class("Entry"))
            .with_class(
                ClassDecl::interface("Store").with_function(
                    FunctionDecl::new("put")
                        .with_param("entry", TypeRef::named("Entry"))
                        .abstract_member(),
                ),
            ),
        SourceFile::new("src/main/Item.kt", "com.example").with_class(ClassDecl::class("Item")),
        SourceFile::new("src/main/Repo.kt", "com.example").with_class(
            ClassDecl::interface("Repo")
                .with_supertype(TypeRef::named("com.base.Store"))
                .with_property(PropertyDecl::val("last", TypeRef::named("Item")).abstract_member())
                .with_function(
                    FunctionDecl::new("save")
                        .with_param("item", TypeRef::named("Item"))
                        .returning(TypeRef::named("kotlin.Boolean"))
                        .abstract_member(),
                ),
        ),
        SourceFile::new("src/test/RepoTest.kt", "com.example").with_class(
            ClassDecl::class("RepoTest").with_property(
                PropertyDecl::var("repo", TypeRef::named("Repo")).annotated(Annotation::new(MOCK)),
            ),
        ),
    ]);

    let artifacts = run(&universe);
    let mock = contents(&artifacts, "com.example.MockRepo");
    assert!(mock.contains("\"save(com.example.Item)\", item"), "{mock}");
    assert!(mock.contains("\"put(com.base.Entry)\", entry"), "{mock}");
    assert!(mock.contains("override val last: Item\n"), "{mock}");
    assert!(mock.contains("import com.base.Entry\n"), "{mock}");
    assert!(!mock.contains("import Item"), "{mock}");
    assert!(!mock.contains("import Entry"), "{mock}");
}
