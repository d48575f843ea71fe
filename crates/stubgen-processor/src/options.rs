use stubgen_format::ClassName;

use crate::builtins::Builtins;

pub const DEFAULT_RUNTIME_PACKAGE: &str = "org.kodein.micromock";
pub const DEFAULT_DISPATCHER: &str = "Mocker";
pub const DEFAULT_MOCK_FUNCTION_PREFIX: &str = "mockFunction";

/// Annotation vocabulary and runtime names a round is run with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Field marker requesting a mock.
    pub mock_annotation: String,
    /// Field marker requesting a fake.
    pub fake_annotation: String,
    /// Use-site marker listing mock targets.
    pub uses_mocks_annotation: String,
    /// Use-site marker listing fake targets.
    pub uses_fakes_annotation: String,
    /// Package of the runtime library generated code calls into.
    pub runtime_package: String,
    /// Simple name of the dispatcher class inside `runtime_package`.
    pub dispatcher: String,
    /// Arity-specific mock-function factories are named `<prefix><arity>`.
    pub mock_function_prefix: String,
    pub builtins: Builtins,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            mock_annotation: format!("{DEFAULT_RUNTIME_PACKAGE}.Mock"),
            fake_annotation: format!("{DEFAULT_RUNTIME_PACKAGE}.Fake"),
            uses_mocks_annotation: format!("{DEFAULT_RUNTIME_PACKAGE}.UsesMocks"),
            uses_fakes_annotation: format!("{DEFAULT_RUNTIME_PACKAGE}.UsesFakes"),
            runtime_package: DEFAULT_RUNTIME_PACKAGE.to_string(),
            dispatcher: DEFAULT_DISPATCHER.to_string(),
            mock_function_prefix: DEFAULT_MOCK_FUNCTION_PREFIX.to_string(),
            builtins: Builtins::default(),
        }
    }
}

impl ProcessorOptions {
    pub(crate) fn dispatcher_class(&self) -> ClassName {
        ClassName::new(self.runtime_package.clone(), self.dispatcher.clone())
    }
}

/// `org.kodein.micromock.Mock` -> `Mock`, for diagnostics.
pub(crate) fn short_annotation(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
