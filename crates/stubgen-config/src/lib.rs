//! `stubgen.toml` loading and tracing setup.
//!
//! Every section is optional; an empty file (or no file at all) yields the
//! default micromock vocabulary.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stubgen_format::PrintConfig;
use stubgen_processor::{
    BuiltinValue, ProcessorOptions, DEFAULT_DISPATCHER, DEFAULT_MOCK_FUNCTION_PREFIX,
    DEFAULT_RUNTIME_PACKAGE,
};
use thiserror::Error;

/// Environment variable that points at a config file, absolute or relative to the root.
pub const STUBGEN_CONFIG_ENV_VAR: &str = "STUBGEN_CONFIG";

/// File names looked up in the root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stubgen.toml", ".stubgen.toml"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubgenConfig {
    #[serde(default)]
    pub annotations: AnnotationsConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Extra builtin types, keyed by qualified name. Entries replace the
    /// Kotlin defaults of the same name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub builtins: IndexMap<String, BuiltinConfig>,
}

/// Qualified names of the four marker annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationsConfig {
    #[serde(default = "AnnotationsConfig::default_mock")]
    pub mock: String,
    #[serde(default = "AnnotationsConfig::default_fake")]
    pub fake: String,
    #[serde(default = "AnnotationsConfig::default_uses_mocks")]
    pub uses_mocks: String,
    #[serde(default = "AnnotationsConfig::default_uses_fakes")]
    pub uses_fakes: String,
}

impl AnnotationsConfig {
    fn default_mock() -> String {
        format!("{DEFAULT_RUNTIME_PACKAGE}.Mock")
    }

    fn default_fake() -> String {
        format!("{DEFAULT_RUNTIME_PACKAGE}.Fake")
    }

    fn default_uses_mocks() -> String {
        format!("{DEFAULT_RUNTIME_PACKAGE}.UsesMocks")
    }

    fn default_uses_fakes() -> String {
        format!("{DEFAULT_RUNTIME_PACKAGE}.UsesFakes")
    }
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            mock: Self::default_mock(),
            fake: Self::default_fake(),
            uses_mocks: Self::default_uses_mocks(),
            uses_fakes: Self::default_uses_fakes(),
        }
    }
}

/// Names in the runtime library that generated code calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default = "RuntimeConfig::default_package")]
    pub package: String,
    #[serde(default = "RuntimeConfig::default_dispatcher")]
    pub dispatcher: String,
    #[serde(default = "RuntimeConfig::default_mock_function_prefix")]
    pub mock_function_prefix: String,
}

impl RuntimeConfig {
    fn default_package() -> String {
        DEFAULT_RUNTIME_PACKAGE.to_owned()
    }

    fn default_dispatcher() -> String {
        DEFAULT_DISPATCHER.to_owned()
    }

    fn default_mock_function_prefix() -> String {
        DEFAULT_MOCK_FUNCTION_PREFIX.to_owned()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            package: Self::default_package(),
            dispatcher: Self::default_dispatcher(),
            mock_function_prefix: Self::default_mock_function_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory generated sources are written under, relative to the root.
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: PathBuf,

    /// Name of the dependency manifest written next to the sources.
    #[serde(default = "OutputConfig::default_manifest")]
    pub manifest: String,

    /// Column at which argument and parameter lists wrap.
    #[serde(default = "OutputConfig::default_line_width")]
    pub line_width: usize,
}

impl OutputConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("build/generated/stubgen")
    }

    fn default_manifest() -> String {
        "stubgen-manifest.json".to_owned()
    }

    fn default_line_width() -> usize {
        100
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            manifest: Self::default_manifest(),
            line_width: Self::default_line_width(),
        }
    }
}

/// Value a fake uses for a builtin type.
///
/// ```toml
/// [builtins]
/// "java.util.UUID" = { call = "java.util.UUID.randomUUID" }
/// "kotlin.Char" = "' '"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuiltinConfig {
    /// Literal source text.
    Literal(String),
    /// A qualified top-level function called with no arguments.
    Call { call: String },
}

impl BuiltinConfig {
    pub fn to_value(&self) -> BuiltinValue {
        match self {
            BuiltinConfig::Literal(text) => BuiltinValue::literal(text.clone()),
            BuiltinConfig::Call { call } => match call.rsplit_once('.') {
                Some((package, function)) => BuiltinValue::call(package, function),
                None => BuiltinValue::call("", call.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to this file as well. If it cannot be opened, the other
    /// sinks stay active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            "off" | "none" => "off".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged on top.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        match env_directives {
            Some(env_directives) => {
                let config_directives = Self::normalize_level_directives(&self.level);
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid config value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes a snippet of the input; keep only the message.
        let message = err.message().trim().to_owned();
        match err.span() {
            Some(span) => ConfigError::Toml(format!("{message} (at byte {})", span.start)),
            None => ConfigError::Toml(message),
        }
    }
}

impl StubgenConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: StubgenConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("annotations.mock", &self.annotations.mock),
            ("annotations.fake", &self.annotations.fake),
            ("annotations.uses_mocks", &self.annotations.uses_mocks),
            ("annotations.uses_fakes", &self.annotations.uses_fakes),
            ("runtime.dispatcher", &self.runtime.dispatcher),
            ("runtime.mock_function_prefix", &self.runtime.mock_function_prefix),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    message: "must not be empty".to_owned(),
                });
            }
        }
        if self.output.manifest.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output.manifest",
                message: "must not be empty".to_owned(),
            });
        }
        if self.output.line_width == 0 {
            return Err(ConfigError::Invalid {
                field: "output.line_width",
                message: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Options for a processor round.
    pub fn processor_options(&self) -> ProcessorOptions {
        let mut options = ProcessorOptions {
            mock_annotation: self.annotations.mock.clone(),
            fake_annotation: self.annotations.fake.clone(),
            uses_mocks_annotation: self.annotations.uses_mocks.clone(),
            uses_fakes_annotation: self.annotations.uses_fakes.clone(),
            runtime_package: self.runtime.package.clone(),
            dispatcher: self.runtime.dispatcher.clone(),
            mock_function_prefix: self.runtime.mock_function_prefix.clone(),
            ..ProcessorOptions::default()
        };
        for (name, value) in &self.builtins {
            options.builtins.insert(name.clone(), value.to_value());
        }
        options
    }

    pub fn print_config(&self) -> PrintConfig {
        PrintConfig {
            max_width: self.output.line_width,
            ..PrintConfig::default()
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Find the config file for `root`.
///
/// `STUBGEN_CONFIG` wins when set; otherwise the first of [`CONFIG_FILE_NAMES`]
/// present in `root` is used.
pub fn discover_config_path(root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(STUBGEN_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the config for `root`, or the defaults when there is none.
pub fn load_for_root(root: &Path) -> Result<(StubgenConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(root) else {
        return Ok((StubgenConfig::default(), None));
    };
    let config = StubgenConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber.
///
/// Only the first call has an effect; later calls (and calls after another
/// subscriber was installed elsewhere) are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Layer;

    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file = config.file.as_ref().and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        let file_open_failed = config.file.is_some() && file.is_none();

        let writer = match (config.stderr, file) {
            (true, Some(file)) => BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file))),
            (true, None) => BoxMakeWriter::new(std::io::stderr),
            (false, Some(file)) => BoxMakeWriter::new(Mutex::new(file)),
            (false, None) => BoxMakeWriter::new(std::io::sink),
        };

        let layer: Box<dyn Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() && file_open_failed {
            if let Some(path) = config.file.as_ref() {
                tracing::warn!(
                    target: "stubgen.config",
                    path = %path.display(),
                    "failed to open log file; file logging is disabled"
                );
            }
        }
    });
}
