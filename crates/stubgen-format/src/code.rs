//! Declarations and expressions of a generated Kotlin source file.
//!
//! Synthesizers build these values; [`crate::render_file`] turns them into
//! text. Nothing here knows about mocks or fakes.

use std::collections::BTreeSet;

/// A possibly nested class name: `com.example.Outer.Inner`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName {
    pub package: String,
    pub simple_names: Vec<String>,
}

impl ClassName {
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_names: vec![simple_name.into()],
        }
    }

    /// Split a qualified name into package and class names.
    ///
    /// Package segments are the leading segments that start with a lowercase
    /// letter; the rest are (possibly nested) class names.
    pub fn from_qualified(qualified: &str) -> Self {
        let segments: Vec<&str> = qualified.split('.').collect();
        let split = segments
            .iter()
            .position(|segment| segment.starts_with(|c: char| c.is_uppercase()))
            .unwrap_or(segments.len().saturating_sub(1));
        Self {
            package: segments[..split].join("."),
            simple_names: segments[split..].iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn simple_name(&self) -> &str {
        self.simple_names.last().map(String::as_str).unwrap_or("")
    }

    /// The outermost class, which is what an import names.
    pub fn top_level(&self) -> ClassName {
        ClassName {
            package: self.package.clone(),
            simple_names: self.simple_names.iter().take(1).cloned().collect(),
        }
    }

    pub fn canonical(&self) -> String {
        let names = self.simple_names.join(".");
        if self.package.is_empty() {
            names
        } else {
            format!("{}.{}", self.package, names)
        }
    }

    pub fn is_unit(&self) -> bool {
        self.package == "kotlin" && self.simple_names == ["Unit"]
    }
}

/// A top-level function or property referenced from generated code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberName {
    pub package: String,
    pub name: String,
}

impl MemberName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn canonical(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Projection {
    Invariant,
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeArgument {
    Star,
    Type(Projection, TypeName),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    Class {
        name: ClassName,
        args: Vec<TypeArgument>,
        nullable: bool,
    },
    Variable {
        name: String,
        nullable: bool,
    },
    Function {
        parameters: Vec<TypeName>,
        return_type: Box<TypeName>,
        nullable: bool,
        suspend: bool,
    },
    /// Text emitted verbatim; used for references the host could not resolve.
    Raw(String),
}

impl TypeName {
    pub fn class(name: ClassName) -> Self {
        TypeName::Class {
            name,
            args: Vec::new(),
            nullable: false,
        }
    }

    pub fn parameterized(name: ClassName, args: impl IntoIterator<Item = TypeName>) -> Self {
        TypeName::Class {
            name,
            args: args
                .into_iter()
                .map(|ty| TypeArgument::Type(Projection::Invariant, ty))
                .collect(),
            nullable: false,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        TypeName::Variable {
            name: name.into(),
            nullable: false,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TypeName::Class { name, args, nullable: false } if args.is_empty() && name.is_unit())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeVariable {
    pub name: String,
    pub projection: Projection,
    pub bounds: Vec<TypeName>,
    pub reified: bool,
}

impl TypeVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            projection: Projection::Invariant,
            bounds: Vec::new(),
            reified: false,
        }
    }
}

/// Declaration modifiers, in the order Kotlin style prints them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KModifier {
    Public,
    Protected,
    Private,
    Internal,
    Final,
    Open,
    Abstract,
    External,
    Override,
    Tailrec,
    Suspend,
    Inline,
    Infix,
    Operator,
}

impl KModifier {
    pub fn keyword(self) -> &'static str {
        match self {
            KModifier::Public => "public",
            KModifier::Protected => "protected",
            KModifier::Private => "private",
            KModifier::Internal => "internal",
            KModifier::Final => "final",
            KModifier::Open => "open",
            KModifier::Abstract => "abstract",
            KModifier::External => "external",
            KModifier::Override => "override",
            KModifier::Tailrec => "tailrec",
            KModifier::Suspend => "suspend",
            KModifier::Inline => "inline",
            KModifier::Infix => "infix",
            KModifier::Operator => "operator",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callee {
    Constructor(ClassName),
    Function(MemberName),
    Method(Box<Expr>, String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
}

impl Argument {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// Literal text such as `0L`, `false` or `null`.
    Literal(String),
    /// A string literal; escaping happens at render time.
    Str(String),
    Name(String),
    This,
    Field(Box<Expr>, String),
    Call { callee: Callee, args: Vec<Argument> },
    EnumEntry(ClassName, String),
}

impl Expr {
    pub fn literal(text: impl Into<String>) -> Self {
        Expr::Literal(text.into())
    }

    pub fn null() -> Self {
        Expr::Literal("null".to_string())
    }

    pub fn field(receiver: Expr, name: impl Into<String>) -> Self {
        Expr::Field(Box::new(receiver), name.into())
    }

    pub fn call(callee: Callee, args: impl IntoIterator<Item = Argument>) -> Self {
        Expr::Call {
            callee,
            args: args.into_iter().collect(),
        }
    }

    pub fn method(receiver: Expr, name: impl Into<String>, args: impl IntoIterator<Item = Argument>) -> Self {
        Expr::call(Callee::Method(Box::new(receiver), name.into()), args)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Return(Expr),
    Assign { target: Expr, value: Expr },
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDef {
    pub name: String,
    pub ty: TypeName,
}

impl ParameterDef {
    pub fn new(name: impl Into<String>, ty: TypeName) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// `= expr`
    Expression(Expr),
    /// `{ statements }`
    Block(Vec<Stmt>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub modifiers: BTreeSet<KModifier>,
    pub type_variables: Vec<TypeVariable>,
    pub receiver: Option<TypeName>,
    pub parameters: Vec<ParameterDef>,
    /// `None` and `kotlin.Unit` both print without a return type.
    pub return_type: Option<TypeName>,
    pub body: Body,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: BTreeSet::new(),
            type_variables: Vec::new(),
            receiver: None,
            parameters: Vec::new(),
            return_type: None,
            body: Body::Block(Vec::new()),
        }
    }
}

/// A custom getter or setter. Setters take their parameter name from `parameter`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessorDef {
    pub parameter: Option<String>,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: TypeName,
    pub modifiers: BTreeSet<KModifier>,
    pub mutable: bool,
    pub getter: Option<AccessorDef>,
    pub setter: Option<AccessorDef>,
}

/// A constructor parameter declared as a property: `private val mocker: Mocker`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorProperty {
    pub name: String,
    pub ty: TypeName,
    pub modifiers: BTreeSet<KModifier>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub modifiers: BTreeSet<KModifier>,
    pub type_variables: Vec<TypeVariable>,
    pub constructor_properties: Vec<ConstructorProperty>,
    pub superinterfaces: Vec<TypeName>,
    pub properties: Vec<PropertyDef>,
    pub functions: Vec<FunctionDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: BTreeSet::new(),
            type_variables: Vec::new(),
            constructor_properties: Vec::new(),
            superinterfaces: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Class(ClassDef),
    Function(FunctionDef),
}

/// One generated source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDef {
    pub package: String,
    pub name: String,
    pub items: Vec<Item>,
}

impl FileDef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }
}
