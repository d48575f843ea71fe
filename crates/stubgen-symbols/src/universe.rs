use std::collections::{HashMap, HashSet};
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::model::{
    Annotation, ClassDecl, FunctionDecl, Location, PropertyDecl, Snapshot, SourceFile, TypeArg,
    TypeRef,
};

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("failed to read symbol snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse symbol snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{location}: duplicate declaration of {name}")]
    DuplicateDeclaration { name: String, location: String },
}

/// Index of a class declaration inside a [`SymbolUniverse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Index of a source file inside a [`SymbolUniverse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

/// A class declaration together with where it lives.
#[derive(Clone, Copy, Debug)]
pub struct ClassRef<'a> {
    pub id: ClassId,
    pub decl: &'a ClassDecl,
    pub package: &'a str,
    pub file: &'a str,
    qualified_name: &'a str,
}

impl<'a> ClassRef<'a> {
    pub fn qualified_name(&self) -> &'a str {
        self.qualified_name
    }

    pub fn simple_name(&self) -> &'a str {
        &self.decl.name
    }

    pub fn location(&self) -> Option<&'a Location> {
        self.decl.location.as_ref()
    }
}

/// A declaration site carrying a queried annotation.
#[derive(Clone, Copy, Debug)]
pub enum AnnotatedSymbol<'a> {
    File {
        file: &'a str,
        annotation: &'a Annotation,
    },
    Class {
        class: ClassRef<'a>,
        annotation: &'a Annotation,
    },
    Function {
        owner: Option<ClassRef<'a>>,
        file: &'a str,
        function: &'a FunctionDecl,
        annotation: &'a Annotation,
    },
    Property {
        owner: Option<ClassRef<'a>>,
        file: &'a str,
        property: &'a PropertyDecl,
        annotation: &'a Annotation,
    },
    Setter {
        owner: Option<ClassRef<'a>>,
        file: &'a str,
        property: &'a PropertyDecl,
        annotation: &'a Annotation,
    },
}

impl<'a> AnnotatedSymbol<'a> {
    pub fn annotation(&self) -> &'a Annotation {
        match self {
            AnnotatedSymbol::File { annotation, .. }
            | AnnotatedSymbol::Class { annotation, .. }
            | AnnotatedSymbol::Function { annotation, .. }
            | AnnotatedSymbol::Property { annotation, .. }
            | AnnotatedSymbol::Setter { annotation, .. } => annotation,
        }
    }

    /// Path of the file containing the annotated symbol.
    pub fn file(&self) -> &'a str {
        match self {
            AnnotatedSymbol::Class { class, .. } => class.file,
            AnnotatedSymbol::File { file, .. }
            | AnnotatedSymbol::Function { file, .. }
            | AnnotatedSymbol::Property { file, .. }
            | AnnotatedSymbol::Setter { file, .. } => file,
        }
    }

    /// Location of the annotated symbol, falling back to the annotation's own.
    pub fn location(&self) -> Option<&'a Location> {
        let symbol = match self {
            AnnotatedSymbol::File { .. } => None,
            AnnotatedSymbol::Class { class, .. } => class.location(),
            AnnotatedSymbol::Function { function, .. } => function.location.as_ref(),
            AnnotatedSymbol::Property { property, .. }
            | AnnotatedSymbol::Setter { property, .. } => property.location.as_ref(),
        };
        symbol.or(self.annotation().location.as_ref())
    }

    /// Short human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            AnnotatedSymbol::File { file, .. } => format!("file {file}"),
            AnnotatedSymbol::Class { class, .. } => {
                format!("{} {}", class.decl.kind, class.qualified_name())
            }
            AnnotatedSymbol::Function { function, .. } => format!("function {}", function.name),
            AnnotatedSymbol::Property { property, .. } => format!("property {}", property.name),
            AnnotatedSymbol::Setter { property, .. } => {
                format!("setter of property {}", property.name)
            }
        }
    }
}

/// Query interface over the frozen declaration universe of one round.
///
/// The processor only talks to the host through this trait; the in-memory
/// [`SymbolUniverse`] is the implementation used by the CLI and the tests.
pub trait Resolver {
    fn class(&self, id: ClassId) -> ClassRef<'_>;
    fn lookup(&self, qualified_name: &str) -> Option<ClassId>;
    fn symbols_with_annotation(&self, annotation: &str) -> Vec<AnnotatedSymbol<'_>>;

    /// Qualify a reference written in `file`. Named references that already
    /// resolve are returned unchanged.
    fn resolve_in_file(&self, ty: &TypeRef, file: &str) -> TypeRef;

    /// Declared and inherited properties, with supertype type arguments
    /// substituted. Member types are qualified against the file of the class
    /// that declares them.
    fn all_properties(&self, id: ClassId) -> Vec<PropertyDecl>;

    /// Declared and inherited functions, qualified and substituted like
    /// [`Resolver::all_properties`].
    fn all_functions(&self, id: ClassId) -> Vec<FunctionDecl>;

    /// The declaration a type reference points at, if it is in the universe.
    fn class_of(&self, ty: &TypeRef) -> Option<ClassId> {
        ty.qualified_name().and_then(|name| self.lookup(name))
    }
}

#[derive(Debug)]
struct ClassEntry {
    file: FileId,
    qualified_name: String,
    /// Path into `files[file].classes`.
    index: usize,
}

/// In-memory declaration arena built from a [`Snapshot`].
///
/// Classes are keyed by qualified name in insertion order so every query is
/// deterministic for a given snapshot.
#[derive(Debug, Default)]
pub struct SymbolUniverse {
    files: Vec<SourceFile>,
    classes: IndexMap<String, ClassId>,
    entries: Vec<ClassEntry>,
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

impl SymbolUniverse {
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SymbolError> {
        let mut universe = SymbolUniverse::default();
        for (file_index, file) in snapshot.files.iter().enumerate() {
            for (index, class) in file.classes.iter().enumerate() {
                let qualified_name = qualify(&file.package, &class.name);
                if universe.classes.contains_key(&qualified_name) {
                    return Err(SymbolError::DuplicateDeclaration {
                        name: qualified_name,
                        location: Location::describe(class.location.as_ref()),
                    });
                }
                let id = ClassId::new(universe.entries.len() as u32);
                universe.entries.push(ClassEntry {
                    file: FileId(file_index as u32),
                    qualified_name: qualified_name.clone(),
                    index,
                });
                universe.classes.insert(qualified_name, id);
            }
        }
        universe.files = snapshot.files;
        tracing::debug!(
            target: "stubgen.symbols",
            files = universe.files.len(),
            classes = universe.entries.len(),
            "loaded symbol universe"
        );
        Ok(universe)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SymbolError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        Self::from_snapshot(snapshot)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SymbolError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SymbolError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn class_count(&self) -> usize {
        self.entries.len()
    }

    fn class_ref<'a>(&'a self, id: ClassId, entry: &'a ClassEntry) -> ClassRef<'a> {
        let file = &self.files[entry.file.0 as usize];
        ClassRef {
            id,
            decl: &file.classes[entry.index],
            package: &file.package,
            file: &file.path,
            qualified_name: &entry.qualified_name,
        }
    }

    fn file_package(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.path == path)
            .map(|file| file.package.as_str())
    }

    fn resolve_property(&self, property: &PropertyDecl, file: &str) -> PropertyDecl {
        PropertyDecl {
            ty: self.resolve_in_file(&property.ty, file),
            ..property.clone()
        }
    }

    fn resolve_function(&self, function: &FunctionDecl, file: &str) -> FunctionDecl {
        let mut out = function.clone();
        for param in &mut out.parameters {
            param.ty = self.resolve_in_file(&param.ty, file);
        }
        for type_param in &mut out.type_parameters {
            type_param.bounds = type_param
                .bounds
                .iter()
                .map(|bound| self.resolve_in_file(bound, file))
                .collect();
        }
        out.return_type = self.resolve_in_file(&out.return_type, file);
        out
    }

    /// Walks `id` and its supertypes depth-first, handing each class and the
    /// substitution for its type parameters to `visit`.
    fn walk_hierarchy(
        &self,
        id: ClassId,
        substitution: &HashMap<String, TypeRef>,
        visited: &mut HashSet<ClassId>,
        visit: &mut dyn FnMut(ClassRef<'_>, &HashMap<String, TypeRef>),
    ) {
        if !visited.insert(id) {
            return;
        }
        let class = self.class(id);
        visit(class, substitution);

        for supertype in &class.decl.supertypes {
            let supertype = self
                .resolve_in_file(supertype, class.file)
                .substitute(&|name| substitution.get(name).cloned());
            let Some(super_id) = self.class_of(&supertype) else {
                tracing::debug!(
                    target: "stubgen.symbols",
                    class = class.qualified_name(),
                    supertype = ?supertype.qualified_name(),
                    "skipping supertype outside the universe"
                );
                continue;
            };
            let super_class = self.class(super_id);
            let args: &[TypeArg] = match &supertype {
                TypeRef::Named { args, .. } => args,
                _ => &[],
            };
            let inner = super_class
                .decl
                .type_parameters
                .iter()
                .zip(args.iter())
                .map(|(param, arg)| {
                    let ty = arg
                        .ty
                        .clone()
                        .unwrap_or_else(|| TypeRef::named("kotlin.Any").nullable());
                    (param.name.clone(), ty)
                })
                .collect::<HashMap<_, _>>();
            self.walk_hierarchy(super_id, &inner, visited, visit);
        }
    }
}

fn substitute_property(property: &PropertyDecl, substitution: &HashMap<String, TypeRef>) -> PropertyDecl {
    if substitution.is_empty() {
        return property.clone();
    }
    let lookup = |name: &str| substitution.get(name).cloned();
    PropertyDecl {
        ty: property.ty.substitute(&lookup),
        ..property.clone()
    }
}

fn substitute_function(function: &FunctionDecl, substitution: &HashMap<String, TypeRef>) -> FunctionDecl {
    // Function type parameters shadow class type parameters of the same name.
    let shadowed: HashSet<&str> = function
        .type_parameters
        .iter()
        .map(|param| param.name.as_str())
        .collect();
    let substitution: HashMap<String, TypeRef> = substitution
        .iter()
        .filter(|(name, _)| !shadowed.contains(name.as_str()))
        .map(|(name, ty)| (name.clone(), ty.clone()))
        .collect();
    if substitution.is_empty() {
        return function.clone();
    }
    let lookup = |name: &str| substitution.get(name).cloned();
    let mut out = function.clone();
    for param in &mut out.parameters {
        param.ty = param.ty.substitute(&lookup);
    }
    for type_param in &mut out.type_parameters {
        type_param.bounds = type_param
            .bounds
            .iter()
            .map(|bound| bound.substitute(&lookup))
            .collect();
    }
    out.return_type = out.return_type.substitute(&lookup);
    out
}

impl Resolver for SymbolUniverse {
    fn class(&self, id: ClassId) -> ClassRef<'_> {
        let entry = &self.entries[id.0 as usize];
        self.class_ref(id, entry)
    }

    fn lookup(&self, qualified_name: &str) -> Option<ClassId> {
        self.classes.get(qualified_name).copied()
    }

    fn symbols_with_annotation(&self, annotation: &str) -> Vec<AnnotatedSymbol<'_>> {
        let mut out = Vec::new();
        let mut next_class = 0usize;

        for file in &self.files {
            let path = file.path.as_str();
            for anno in file.annotations.iter().filter(|a| a.name == annotation) {
                out.push(AnnotatedSymbol::File {
                    file: path,
                    annotation: anno,
                });
            }

            for _ in &file.classes {
                let id = ClassId::new(next_class as u32);
                next_class += 1;
                let class = self.class(id);
                for anno in class.decl.annotations.iter().filter(|a| a.name == annotation) {
                    out.push(AnnotatedSymbol::Class {
                        class,
                        annotation: anno,
                    });
                }
                collect_member_sites(
                    &mut out,
                    annotation,
                    Some(class),
                    path,
                    &class.decl.properties,
                    &class.decl.functions,
                );
            }

            collect_member_sites(
                &mut out,
                annotation,
                None,
                path,
                &file.properties,
                &file.functions,
            );
        }
        out
    }

    fn resolve_in_file(&self, ty: &TypeRef, file: &str) -> TypeRef {
        match ty {
            TypeRef::Named {
                name,
                args,
                nullable,
            } => {
                let name = if self.lookup(name).is_none() && !name.contains('.') {
                    self.file_package(file)
                        .map(|package| qualify(package, name))
                        .filter(|qualified| self.lookup(qualified).is_some())
                        .unwrap_or_else(|| name.clone())
                } else {
                    name.clone()
                };
                TypeRef::Named {
                    name,
                    args: args
                        .iter()
                        .map(|arg| TypeArg {
                            variance: arg.variance,
                            ty: arg.ty.as_ref().map(|ty| self.resolve_in_file(ty, file)),
                        })
                        .collect(),
                    nullable: *nullable,
                }
            }
            TypeRef::Function {
                parameters,
                return_type,
                nullable,
                suspend,
            } => TypeRef::Function {
                parameters: parameters
                    .iter()
                    .map(|param| self.resolve_in_file(param, file))
                    .collect(),
                return_type: Box::new(self.resolve_in_file(return_type, file)),
                nullable: *nullable,
                suspend: *suspend,
            },
            TypeRef::Parameter { .. } | TypeRef::Unresolved { .. } => ty.clone(),
        }
    }

    fn all_properties(&self, id: ClassId) -> Vec<PropertyDecl> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.walk_hierarchy(id, &HashMap::new(), &mut HashSet::new(), &mut |class, subst| {
            for property in &class.decl.properties {
                if seen.insert(property.name.clone()) {
                    let property = self.resolve_property(property, class.file);
                    out.push(substitute_property(&property, subst));
                }
            }
        });
        out
    }

    fn all_functions(&self, id: ClassId) -> Vec<FunctionDecl> {
        let mut seen: HashSet<(String, Vec<TypeRef>)> = HashSet::new();
        let mut out = Vec::new();
        self.walk_hierarchy(id, &HashMap::new(), &mut HashSet::new(), &mut |class, subst| {
            for function in &class.decl.functions {
                let function = self.resolve_function(function, class.file);
                let function = substitute_function(&function, subst);
                let signature = (
                    function.name.clone(),
                    function.parameters.iter().map(|p| p.ty.clone()).collect(),
                );
                if seen.insert(signature) {
                    out.push(function);
                }
            }
        });
        out
    }
}

fn collect_member_sites<'a>(
    out: &mut Vec<AnnotatedSymbol<'a>>,
    annotation: &str,
    owner: Option<ClassRef<'a>>,
    file: &'a str,
    properties: &'a [PropertyDecl],
    functions: &'a [FunctionDecl],
) {
    for property in properties {
        for anno in property.annotations.iter().filter(|a| a.name == annotation) {
            out.push(AnnotatedSymbol::Property {
                owner,
                file,
                property,
                annotation: anno,
            });
        }
        for anno in property
            .setter_annotations
            .iter()
            .filter(|a| a.name == annotation)
        {
            out.push(AnnotatedSymbol::Setter {
                owner,
                file,
                property,
                annotation: anno,
            });
        }
    }
    for function in functions {
        for anno in function.annotations.iter().filter(|a| a.name == annotation) {
            out.push(AnnotatedSymbol::Function {
                owner,
                file,
                function,
                annotation: anno,
            });
        }
    }
}
