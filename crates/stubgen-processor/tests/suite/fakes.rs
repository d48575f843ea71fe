use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use stubgen_symbols::{Annotation, ClassDecl, SourceFile, TypeParameter, TypeRef, ValueParameter};

use super::{contents, names, run, universe, USES_FAKES};

fn param(name: &str, ty: &str) -> ValueParameter {
    ValueParameter::new(name, TypeRef::named(ty))
}

fn requesting(types: &[&str]) -> SourceFile {
    SourceFile::new("src/test/FakesTest.kt", "com.example.test").annotated(Annotation::listing(
        USES_FAKES,
        types.iter().map(|ty| TypeRef::named(*ty)),
    ))
}

#[test]
fn parameters_with_defaults_are_left_to_the_constructor() {
    let artifacts = run(&universe([
        SourceFile::new("src/main/Config.kt", "com.example").with_class(
            ClassDecl::class("Config").with_constructor(vec![
                param("retries", "kotlin.Int"),
                param("label", "kotlin.String").with_default(),
            ]),
        ),
        requesting(&["com.example.Config"]),
    ]));

    assert_snapshot!(
        contents(&artifacts, "com.example.fakeConfig"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

internal fun fakeConfig(): Config = Config(retries = 0)
"###
    );
}

#[test]
fn transitively_required_classes_get_their_own_fakes() {
    let artifacts = run(&universe([
        SourceFile::new("src/main/Job.kt", "com.example")
            .with_class(ClassDecl::class("Job").with_constructor(vec![param("owner", "Team")]))
            .with_class(ClassDecl::class("Team")),
        requesting(&["com.example.Job"]),
    ]));

    assert_eq!(names(&artifacts), ["com.example.fakeJob", "com.example.fakeTeam"]);
    assert_snapshot!(
        contents(&artifacts, "com.example.fakeJob"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

internal fun fakeJob(): Job = Job(owner = fakeTeam())
"###
    );
    assert_snapshot!(
        contents(&artifacts, "com.example.fakeTeam"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

internal fun fakeTeam(): Team = Team()
"###
    );
    assert!(artifacts[1].origins.contains("src/test/FakesTest.kt"));
}

#[test]
fn enums_fake_to_their_first_entry() {
    let artifacts = run(&universe([
        SourceFile::new("src/main/Color.kt", "com.example")
            .with_class(ClassDecl::enum_class("Color", &["RED", "GREEN", "BLUE"])),
        requesting(&["com.example.Color"]),
    ]));

    assert_snapshot!(
        contents(&artifacts, "com.example.fakeColor"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

internal fun fakeColor(): Color = Color.RED
"###
    );
}

#[test]
fn every_required_parameter_gets_a_value() {
    let settings = ClassDecl::class("Settings").with_constructor(vec![
        param("flag", "kotlin.Boolean"),
        param("b", "kotlin.Byte"),
        param("s", "kotlin.Short"),
        param("l", "kotlin.Long"),
        param("f", "kotlin.Float"),
        param("d", "kotlin.Double"),
        param("name", "kotlin.String"),
        ValueParameter::new(
            "tags",
            TypeRef::generic("kotlin.collections.List", [TypeRef::named("kotlin.String")]),
        ),
        ValueParameter::new(
            "ids",
            TypeRef::generic("kotlin.collections.Set", [TypeRef::named("kotlin.Int")]),
        ),
        ValueParameter::new(
            "meta",
            TypeRef::generic(
                "kotlin.collections.Map",
                [TypeRef::named("kotlin.String"), TypeRef::named("kotlin.String")],
            ),
        ),
        ValueParameter::new("parent", TypeRef::named("com.example.Settings").nullable()),
        param("mode", "com.example.Color"),
    ]);
    let artifacts = run(&universe([
        SourceFile::new("src/main/Settings.kt", "com.example")
            .with_class(settings)
            .with_class(ClassDecl::enum_class("Color", &["RED"])),
        requesting(&["com.example.Settings"]),
    ]));

    assert_eq!(names(&artifacts), ["com.example.fakeSettings", "com.example.fakeColor"]);
    assert_snapshot!(
        contents(&artifacts, "com.example.fakeSettings"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

internal fun fakeSettings(): Settings = Settings(
    flag = false,
    b = 0,
    s = 0,
    l = 0L,
    f = 0f,
    d = 0.0,
    name = "",
    tags = emptyList(),
    ids = emptySet(),
    meta = emptyMap(),
    parent = null,
    mode = fakeColor()
)
"###
    );
}

#[test]
fn fakes_in_other_packages_are_imported() {
    let artifacts = run(&universe([
        SourceFile::new("src/main/jobs/Job.kt", "com.example.jobs").with_class(
            ClassDecl::class("Job").with_constructor(vec![param("owner", "com.example.people.Team")]),
        ),
        SourceFile::new("src/main/people/Team.kt", "com.example.people")
            .with_class(ClassDecl::class("Team")),
        requesting(&["com.example.jobs.Job"]),
    ]));

    assert_snapshot!(
        contents(&artifacts, "com.example.jobs.fakeJob"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example.jobs

import com.example.people.fakeTeam

internal fun fakeJob(): Job = Job(owner = fakeTeam())
"###
    );
}

#[test]
fn generic_classes_keep_their_type_parameters() {
    let artifacts = run(&universe([
        SourceFile::new("src/main/Box.kt", "com.example").with_class(
            ClassDecl::class("Box")
                .with_type_parameter(TypeParameter::new("T"))
                .with_constructor(vec![
                    param("label", "kotlin.String"),
                    ValueParameter::new("content", TypeRef::param("T").nullable()),
                ]),
        ),
        requesting(&["com.example.Box"]),
    ]));

    assert_snapshot!(
        contents(&artifacts, "com.example.fakeBox"),
        @r###"
// Generated by stubgen. Do not edit.

package com.example

internal fun <T> fakeBox(): Box<T> = Box(label = "", content = null)
"###
    );
}
