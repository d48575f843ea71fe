use std::ffi::OsString;
use std::path::Path;
use std::sync::Mutex;

use stubgen_config::{
    discover_config_path, load_for_root, ConfigError, StubgenConfig, STUBGEN_CONFIG_ENV_VAR,
};
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_stubgen_toml_in_root() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(STUBGEN_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("stubgen.toml");
    std::fs::write(&config_path, "[runtime]\ndispatcher = \"Mocker\"\n").unwrap();

    let discovered = discover_config_path(dir.path()).expect("stubgen.toml should be discovered");
    assert_eq!(discovered, config_path.canonicalize().unwrap_or(config_path));
}

#[test]
fn dotfile_is_used_when_no_plain_file_exists() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(STUBGEN_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join(".stubgen.toml");
    std::fs::write(&config_path, "").unwrap();

    let discovered = discover_config_path(dir.path()).expect(".stubgen.toml should be discovered");
    assert_eq!(discovered, config_path.canonicalize().unwrap_or(config_path));
}

#[test]
fn env_override_wins_over_root_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("stubgen.toml"), "[logging]\nlevel = \"info\"\n").unwrap();
    let override_path = dir.path().join("override.toml");
    std::fs::write(&override_path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let _env = EnvVarGuard::set(STUBGEN_CONFIG_ENV_VAR, Path::new("override.toml"));
    let (config, path) = load_for_root(dir.path()).unwrap();
    assert_eq!(
        path,
        Some(override_path.canonicalize().unwrap_or(override_path))
    );
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn missing_config_yields_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(STUBGEN_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path) = load_for_root(dir.path()).unwrap();
    assert_eq!(path, None);
    assert_eq!(config, StubgenConfig::default());
}

#[test]
fn unreadable_override_reports_its_path() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    let _env = EnvVarGuard::set(STUBGEN_CONFIG_ENV_VAR, Path::new("absent.toml"));
    let err = load_for_root(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got {err:?}");
    assert!(err.to_string().contains("absent.toml"), "got {err}");
}
