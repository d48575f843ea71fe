use pretty_assertions::assert_eq;
use std::path::PathBuf;
use stubgen_config::{BuiltinConfig, ConfigError, StubgenConfig};
use stubgen_processor::{BuiltinValue, ProcessorOptions};

#[test]
fn empty_file_matches_processor_defaults() {
    let config = StubgenConfig::load_from_str("").unwrap();
    assert_eq!(config.processor_options(), ProcessorOptions::default());
    assert_eq!(config.output.dir, PathBuf::from("build/generated/stubgen"));
    assert_eq!(config.output.manifest, "stubgen-manifest.json");
    assert_eq!(config.print_config().max_width, 100);
}

#[test]
fn sections_override_the_vocabulary() {
    let config = StubgenConfig::load_from_str(
        r#"
[annotations]
mock = "com.acme.test.Mock"
fake = "com.acme.test.Fake"

[runtime]
package = "com.acme.runtime"
dispatcher = "Dispatcher"
mock_function_prefix = "stubFunction"

[output]
dir = "gen"
line_width = 80
"#,
    )
    .unwrap();

    let options = config.processor_options();
    assert_eq!(options.mock_annotation, "com.acme.test.Mock");
    assert_eq!(options.fake_annotation, "com.acme.test.Fake");
    assert_eq!(options.uses_mocks_annotation, "org.kodein.micromock.UsesMocks");
    assert_eq!(options.runtime_package, "com.acme.runtime");
    assert_eq!(options.dispatcher, "Dispatcher");
    assert_eq!(options.mock_function_prefix, "stubFunction");
    assert_eq!(config.output.dir, PathBuf::from("gen"));
    assert_eq!(config.print_config().max_width, 80);
}

#[test]
fn builtins_extend_the_kotlin_table() {
    let config = StubgenConfig::load_from_str(
        r#"
[builtins]
"kotlin.Char" = "' '"
"java.util.UUID" = { call = "java.util.UUID.randomUUID" }
"kotlin.String" = "\"x\""
"#,
    )
    .unwrap();

    assert_eq!(
        config.builtins.get("kotlin.Char"),
        Some(&BuiltinConfig::Literal("' '".to_owned()))
    );

    let builtins = config.processor_options().builtins;
    assert_eq!(builtins.len(), 13);
    assert_eq!(builtins.get("kotlin.String"), Some(&BuiltinValue::literal("\"x\"")));
    assert_eq!(
        builtins.get("java.util.UUID"),
        Some(&BuiltinValue::call("java.util.UUID", "randomUUID"))
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let err = StubgenConfig::load_from_str("[runtime]\ndispatch = \"Mocker\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "got {err:?}");
    assert!(err.to_string().contains("dispatch"), "got {err}");
}

#[test]
fn empty_annotation_names_are_invalid() {
    let err = StubgenConfig::load_from_str("[annotations]\nmock = \"\"\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid config value for `annotations.mock`: must not be empty"
    );
}

#[test]
fn zero_line_width_is_invalid() {
    let err = StubgenConfig::load_from_str("[output]\nline_width = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "output.line_width", .. }));
}

#[test]
fn effective_config_prints_as_toml() {
    let mut config = StubgenConfig::default();
    config.logging.level = "debug".to_owned();
    insta::assert_snapshot!(config.to_toml_string().unwrap(), @r###"
    [annotations]
    mock = "org.kodein.micromock.Mock"
    fake = "org.kodein.micromock.Fake"
    uses_mocks = "org.kodein.micromock.UsesMocks"
    uses_fakes = "org.kodein.micromock.UsesFakes"

    [runtime]
    package = "org.kodein.micromock"
    dispatcher = "Mocker"
    mock_function_prefix = "mockFunction"

    [output]
    dir = "build/generated/stubgen"
    manifest = "stubgen-manifest.json"
    line_width = 100

    [logging]
    level = "debug"
    json = false
    stderr = true
    "###);
}

#[test]
fn printed_config_loads_back_unchanged() {
    let mut config = StubgenConfig::default();
    config.builtins.insert(
        "java.util.UUID".to_owned(),
        BuiltinConfig::Call {
            call: "java.util.UUID.randomUUID".to_owned(),
        },
    );
    let text = config.to_toml_string().unwrap();
    assert_eq!(StubgenConfig::load_from_str(&text).unwrap(), config);
}
