//! Serializable snapshot of the declarations visible to one processing round.
//!
//! The host exports this after full symbol resolution. Every type reference is
//! expected to be fully qualified already, except for names the host could not
//! qualify, which are resolved against the declaring file's package (see
//! [`crate::SymbolUniverse::resolve_in_file`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a declaration or annotation in the host's sources.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Render an optional location the way diagnostics print it.
    pub fn describe(location: Option<&Location>) -> String {
        match location {
            Some(location) => location.to_string(),
            None => "Unknown location".to_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    #[default]
    Invariant,
    In,
    Out,
    Star,
}

/// A single type argument. Star projections carry no type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeArg {
    #[serde(default)]
    pub variance: Variance,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeRef>,
}

impl TypeArg {
    pub fn invariant(ty: TypeRef) -> Self {
        Self {
            variance: Variance::Invariant,
            ty: Some(ty),
        }
    }

    pub fn out(ty: TypeRef) -> Self {
        Self {
            variance: Variance::Out,
            ty: Some(ty),
        }
    }

    pub fn star() -> Self {
        Self {
            variance: Variance::Star,
            ty: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A class, interface, enum or library type referenced by qualified name.
    Named {
        name: String,
        #[serde(default)]
        args: Vec<TypeArg>,
        #[serde(default)]
        nullable: bool,
    },
    /// A reference to a type parameter in scope.
    Parameter {
        name: String,
        #[serde(default)]
        nullable: bool,
    },
    /// A function type such as `(String, Int) -> Boolean`.
    Function {
        #[serde(default)]
        parameters: Vec<TypeRef>,
        return_type: Box<TypeRef>,
        #[serde(default)]
        nullable: bool,
        #[serde(default)]
        suspend: bool,
    },
    /// Something the host could not resolve to a declaration.
    Unresolved { text: String },
}

const FUNCTION_PREFIX: &str = "kotlin.Function";
const SUSPEND_FUNCTION_PREFIX: &str = "kotlin.coroutines.SuspendFunction";

fn numbered_suffix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let digits = name.strip_prefix(prefix)?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: args.into_iter().map(TypeArg::invariant).collect(),
            nullable: false,
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        TypeRef::Parameter {
            name: name.into(),
            nullable: false,
        }
    }

    pub fn function(parameters: impl IntoIterator<Item = TypeRef>, return_type: TypeRef) -> Self {
        TypeRef::Function {
            parameters: parameters.into_iter().collect(),
            return_type: Box::new(return_type),
            nullable: false,
            suspend: false,
        }
    }

    pub fn unresolved(text: impl Into<String>) -> Self {
        TypeRef::Unresolved { text: text.into() }
    }

    /// Returns the same reference marked nullable.
    pub fn nullable(self) -> Self {
        self.with_nullability(true)
    }

    pub fn with_nullability(mut self, value: bool) -> Self {
        match &mut self {
            TypeRef::Named { nullable, .. }
            | TypeRef::Parameter { nullable, .. }
            | TypeRef::Function { nullable, .. } => *nullable = value,
            TypeRef::Unresolved { .. } => {}
        }
        self
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            TypeRef::Named { nullable, .. }
            | TypeRef::Parameter { nullable, .. }
            | TypeRef::Function { nullable, .. } => *nullable,
            TypeRef::Unresolved { .. } => false,
        }
    }

    /// The qualified name of a named reference.
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether this is a function type, either structurally or spelled as
    /// `kotlin.FunctionN` / `kotlin.coroutines.SuspendFunctionN`.
    pub fn is_function_type(&self) -> bool {
        match self {
            TypeRef::Function { .. } => true,
            TypeRef::Named { name, .. } => {
                numbered_suffix(name, FUNCTION_PREFIX).is_some()
                    || numbered_suffix(name, SUSPEND_FUNCTION_PREFIX).is_some()
            }
            _ => false,
        }
    }

    /// Type arguments of the function type with the return type last, the way
    /// `kotlin.FunctionN<P1, .., PN, R>` spells them.
    pub fn function_type_arguments(&self) -> Option<Vec<Option<TypeRef>>> {
        match self {
            TypeRef::Function {
                parameters,
                return_type,
                ..
            } => Some(
                parameters
                    .iter()
                    .cloned()
                    .map(Some)
                    .chain(std::iter::once(Some(return_type.as_ref().clone())))
                    .collect(),
            ),
            TypeRef::Named { args, .. } if self.is_function_type() => {
                Some(args.iter().map(|arg| arg.ty.clone()).collect())
            }
            _ => None,
        }
    }

    /// Name of the declaration this reference points at, as used in member
    /// keys. Type parameters and unresolved references have none.
    pub fn declaration_name(&self) -> Option<String> {
        match self {
            TypeRef::Named { name, .. } => Some(name.clone()),
            TypeRef::Function {
                parameters,
                suspend,
                ..
            } => {
                let prefix = if *suspend {
                    SUSPEND_FUNCTION_PREFIX
                } else {
                    FUNCTION_PREFIX
                };
                Some(format!("{prefix}{}", parameters.len()))
            }
            TypeRef::Parameter { .. } | TypeRef::Unresolved { .. } => None,
        }
    }

    /// Replace type-parameter references using `lookup`. Nullability of the
    /// reference is merged into the substituted type.
    pub fn substitute(&self, lookup: &dyn Fn(&str) -> Option<TypeRef>) -> TypeRef {
        match self {
            TypeRef::Parameter { name, nullable } => match lookup(name) {
                Some(replacement) => {
                    let merged = *nullable || replacement.is_nullable();
                    replacement.with_nullability(merged)
                }
                None => self.clone(),
            },
            TypeRef::Named {
                name,
                args,
                nullable,
            } => TypeRef::Named {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| TypeArg {
                        variance: arg.variance,
                        ty: arg.ty.as_ref().map(|ty| ty.substitute(lookup)),
                    })
                    .collect(),
                nullable: *nullable,
            },
            TypeRef::Function {
                parameters,
                return_type,
                nullable,
                suspend,
            } => TypeRef::Function {
                parameters: parameters.iter().map(|p| p.substitute(lookup)).collect(),
                return_type: Box::new(return_type.substitute(lookup)),
                nullable: *nullable,
                suspend: *suspend,
            },
            TypeRef::Unresolved { .. } => self.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Interface,
    Class,
    EnumClass,
    Object,
    AnnotationClass,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ClassKind::Interface => "interface",
            ClassKind::Class => "class",
            ClassKind::EnumClass => "enum class",
            ClassKind::Object => "object",
            ClassKind::AnnotationClass => "annotation class",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Protected,
    Internal,
    Private,
    Abstract,
    Open,
    Final,
    Sealed,
    Data,
    Override,
    Suspend,
    Operator,
    Infix,
    Inline,
    Tailrec,
    External,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeParameter {
    pub name: String,
    #[serde(default)]
    pub variance: Variance,
    #[serde(default)]
    pub bounds: Vec<TypeRef>,
    #[serde(default)]
    pub reified: bool,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Invariant,
            bounds: Vec::new(),
            reified: false,
        }
    }

    pub fn with_bound(mut self, bound: TypeRef) -> Self {
        self.bounds.push(bound);
        self
    }
}

/// An annotation application. `types` is the class-list argument carried by
/// use-site markers; field markers leave it empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeRef>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            location: None,
        }
    }

    pub fn listing(name: impl Into<String>, types: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            name: name.into(),
            types: types.into_iter().collect(),
            location: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub location: Option<Location>,
}

impl ValueParameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
            location: None,
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constructor {
    #[serde(default)]
    pub parameters: Vec<ValueParameter>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub mutable: bool,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub setter_annotations: Vec<Annotation>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl PropertyDecl {
    pub fn val(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            mutable: false,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            setter_annotations: Vec::new(),
            location: None,
        }
    }

    pub fn var(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            mutable: true,
            ..Self::val(name, ty)
        }
    }

    pub fn abstract_member(mut self) -> Self {
        self.modifiers.push(Modifier::Abstract);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub parameters: Vec<ValueParameter>,
    #[serde(default = "FunctionDecl::unit")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl FunctionDecl {
    fn unit() -> TypeRef {
        TypeRef::named("kotlin.Unit")
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: Self::unit(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            location: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(ValueParameter::new(name, ty));
        self
    }

    pub fn with_type_parameter(mut self, param: TypeParameter) -> Self {
        self.type_parameters.push(param);
        self
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn abstract_member(self) -> Self {
        self.with_modifier(Modifier::Abstract)
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    pub name: String,
    pub kind: ClassKind,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub supertypes: Vec<TypeRef>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub primary_constructor: Option<Constructor>,
    /// Enum entries in source order.
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl ClassDecl {
    pub fn new(kind: ClassKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Vec::new(),
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            primary_constructor: None,
            entries: Vec::new(),
            annotations: Vec::new(),
            location: None,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(ClassKind::Interface, name)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(ClassKind::Class, name)
    }

    pub fn enum_class(name: impl Into<String>, entries: &[&str]) -> Self {
        let mut decl = Self::new(ClassKind::EnumClass, name);
        decl.entries = entries.iter().map(|entry| entry.to_string()).collect();
        decl
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_type_parameter(mut self, param: TypeParameter) -> Self {
        self.type_parameters.push(param);
        self
    }

    pub fn with_supertype(mut self, ty: TypeRef) -> Self {
        self.supertypes.push(ty);
        self
    }

    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_constructor(mut self, parameters: Vec<ValueParameter>) -> Self {
        self.primary_constructor = Some(Constructor { parameters });
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Interfaces, sealed classes and classes marked `abstract` cannot be
    /// instantiated directly.
    pub fn is_abstract(&self) -> bool {
        self.kind == ClassKind::Interface
            || self.modifiers.contains(&Modifier::Abstract)
            || self.modifiers.contains(&Modifier::Sealed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceFile {
    pub path: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Everything one round sees, as exported by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

impl Snapshot {
    pub fn new(files: impl IntoIterator<Item = SourceFile>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}
