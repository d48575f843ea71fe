use indexmap::IndexMap;
use stubgen_format::{Callee, Expr, MemberName};

/// Default value a fake uses for a builtin type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuiltinValue {
    /// Literal source text such as `0L` or `""`.
    Literal(String),
    /// A call to a top-level factory function: `kotlin.collections.emptyList()`.
    Call { package: String, function: String },
}

impl BuiltinValue {
    pub fn literal(text: impl Into<String>) -> Self {
        BuiltinValue::Literal(text.into())
    }

    pub fn call(package: impl Into<String>, function: impl Into<String>) -> Self {
        BuiltinValue::Call {
            package: package.into(),
            function: function.into(),
        }
    }

    pub(crate) fn to_expr(&self) -> Expr {
        match self {
            BuiltinValue::Literal(text) => Expr::literal(text.clone()),
            BuiltinValue::Call { package, function } => Expr::call(
                Callee::Function(MemberName::new(package.clone(), function.clone())),
                [],
            ),
        }
    }
}

/// Types a fake never recurses into; their values come from this table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Builtins {
    entries: IndexMap<String, BuiltinValue>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::kotlin()
    }
}

impl Builtins {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// The Kotlin primitives, `String`, and the read-only collections.
    pub fn kotlin() -> Self {
        let mut builtins = Self::empty();
        for (name, literal) in [
            ("kotlin.Boolean", "false"),
            ("kotlin.Byte", "0"),
            ("kotlin.Short", "0"),
            ("kotlin.Int", "0"),
            ("kotlin.Long", "0L"),
            ("kotlin.Float", "0f"),
            ("kotlin.Double", "0.0"),
            ("kotlin.String", "\"\""),
        ] {
            builtins.insert(name, BuiltinValue::literal(literal));
        }
        for (name, function) in [
            ("kotlin.collections.List", "emptyList"),
            ("kotlin.collections.Set", "emptySet"),
            ("kotlin.collections.Map", "emptyMap"),
        ] {
            builtins.insert(name, BuiltinValue::call("kotlin.collections", function));
        }
        builtins
    }

    /// Add or replace the value used for `qualified_name`.
    pub fn insert(&mut self, qualified_name: impl Into<String>, value: BuiltinValue) {
        self.entries.insert(qualified_name.into(), value);
    }

    pub fn get(&self, qualified_name: &str) -> Option<&BuiltinValue> {
        self.entries.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.entries.contains_key(qualified_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BuiltinValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
