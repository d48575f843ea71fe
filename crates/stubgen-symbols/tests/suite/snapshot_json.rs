use stubgen_symbols::{ClassKind, Resolver, SymbolError, SymbolUniverse, TypeRef};

const SNAPSHOT: &str = r#"
{
  "files": [
    {
      "path": "src/main/kotlin/Config.kt",
      "package": "com.example",
      "classes": [
        {
          "name": "Config",
          "kind": "class",
          "primary_constructor": {
            "parameters": [
              { "name": "retries", "type": { "kind": "named", "name": "kotlin.Int" } },
              { "name": "label", "type": { "kind": "named", "name": "kotlin.String" }, "has_default": true },
              { "name": "parent", "type": { "kind": "named", "name": "com.example.Config", "nullable": true } }
            ]
          },
          "location": { "file": "src/main/kotlin/Config.kt", "line": 3 }
        },
        { "name": "Mode", "kind": "enum_class", "entries": ["FAST", "SLOW"] }
      ]
    }
  ]
}
"#;

#[test]
fn loads_a_host_snapshot() {
    let universe = SymbolUniverse::from_json_str(SNAPSHOT).expect("snapshot parses");
    assert_eq!(universe.class_count(), 2);

    let config = universe.class(universe.lookup("com.example.Config").unwrap());
    assert_eq!(config.decl.kind, ClassKind::Class);
    let params = &config.decl.primary_constructor.as_ref().unwrap().parameters;
    assert_eq!(params.len(), 3);
    assert!(params[1].has_default);
    assert_eq!(params[2].ty, TypeRef::named("com.example.Config").nullable());

    let mode = universe.class(universe.lookup("com.example.Mode").unwrap());
    assert_eq!(mode.decl.entries, vec!["FAST".to_string(), "SLOW".to_string()]);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = SymbolUniverse::from_json_str(r#"{ "files": [], "extra": 1 }"#).unwrap_err();
    assert!(matches!(err, SymbolError::Json(_)), "got {err:?}");
}

#[test]
fn missing_snapshot_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = SymbolUniverse::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("missing.json"), "got {err}");
}
