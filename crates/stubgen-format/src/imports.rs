use std::collections::{BTreeSet, HashMap, HashSet};

use crate::code::{
    Argument, Body, Callee, ClassDef, ClassName, Expr, FileDef, FunctionDef, Item, MemberName,
    Stmt, TypeArgument, TypeName, TypeVariable,
};

/// Packages whose declarations Kotlin imports implicitly.
pub const DEFAULT_IMPORT_PACKAGES: &[&str] = &[
    "kotlin",
    "kotlin.annotation",
    "kotlin.collections",
    "kotlin.comparisons",
    "kotlin.io",
    "kotlin.ranges",
    "kotlin.sequences",
    "kotlin.text",
];

/// Decides, for every name a file references, whether it prints short
/// (imported, implicit, or same package) or fully qualified.
#[derive(Debug, Default)]
pub(crate) struct ImportScope {
    imports: BTreeSet<String>,
    short_classes: HashSet<ClassName>,
    short_members: HashSet<MemberName>,
}

impl ImportScope {
    pub(crate) fn for_file(file: &FileDef) -> Self {
        let mut collector = Collector::default();
        for item in &file.items {
            collector.item(item);
        }

        let mut scope = ImportScope::default();
        let mut claimed: HashMap<String, String> = HashMap::new();

        // Names declared in this file always win.
        for item in &file.items {
            let name = match item {
                Item::Class(class) => &class.name,
                Item::Function(function) => &function.name,
            };
            claimed.insert(
                name.clone(),
                ClassName::new(file.package.clone(), name.clone()).canonical(),
            );
        }

        let implicit = |package: &str| {
            package == file.package || DEFAULT_IMPORT_PACKAGES.contains(&package)
        };

        // Implicitly visible classes claim their simple names before imports do.
        let (implicit_classes, imported_classes): (Vec<_>, Vec<_>) = collector
            .classes
            .into_iter()
            .partition(|name| implicit(&name.package));
        for name in implicit_classes.into_iter().chain(imported_classes) {
            let simple = name.simple_name().to_string();
            let canonical = name.canonical();
            match claimed.get(&simple) {
                Some(owner) if *owner != canonical => continue,
                Some(_) => {}
                None => {
                    claimed.insert(simple, canonical.clone());
                }
            }
            if !implicit(&name.package) {
                scope.imports.insert(canonical);
            }
            scope.short_classes.insert(name);
        }

        for member in collector.members {
            let canonical = member.canonical();
            match claimed.get(&member.name) {
                Some(owner) if *owner != canonical => continue,
                Some(_) => {}
                None => {
                    claimed.insert(member.name.clone(), canonical.clone());
                }
            }
            if !implicit(&member.package) {
                scope.imports.insert(canonical);
            }
            scope.short_members.insert(member);
        }

        scope
    }

    pub(crate) fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    pub(crate) fn class_name(&self, name: &ClassName) -> String {
        if self.short_classes.contains(&name.top_level()) {
            name.simple_names.join(".")
        } else {
            name.canonical()
        }
    }

    pub(crate) fn member_name(&self, name: &MemberName) -> String {
        if self.short_members.contains(name) {
            name.name.clone()
        } else {
            name.canonical()
        }
    }
}

/// Gathers referenced top-level classes and members in sorted order.
#[derive(Default)]
struct Collector {
    classes: BTreeSet<ClassName>,
    members: BTreeSet<MemberName>,
}

impl Collector {
    fn item(&mut self, item: &Item) {
        match item {
            Item::Class(class) => self.class(class),
            Item::Function(function) => self.function(function),
        }
    }

    fn class(&mut self, class: &ClassDef) {
        self.type_variables(&class.type_variables);
        for property in &class.constructor_properties {
            self.type_name(&property.ty);
        }
        for ty in &class.superinterfaces {
            self.type_name(ty);
        }
        for property in &class.properties {
            self.type_name(&property.ty);
            for accessor in property.getter.iter().chain(property.setter.iter()) {
                self.body(&accessor.body);
            }
        }
        for function in &class.functions {
            self.function(function);
        }
    }

    fn function(&mut self, function: &FunctionDef) {
        self.type_variables(&function.type_variables);
        if let Some(receiver) = &function.receiver {
            self.type_name(receiver);
        }
        for param in &function.parameters {
            self.type_name(&param.ty);
        }
        if let Some(ty) = &function.return_type {
            self.type_name(ty);
        }
        self.body(&function.body);
    }

    fn type_variables(&mut self, vars: &[TypeVariable]) {
        for var in vars {
            for bound in &var.bounds {
                self.type_name(bound);
            }
        }
    }

    fn type_name(&mut self, ty: &TypeName) {
        match ty {
            TypeName::Class { name, args, .. } => {
                self.classes.insert(name.top_level());
                for arg in args {
                    if let TypeArgument::Type(_, ty) = arg {
                        self.type_name(ty);
                    }
                }
            }
            TypeName::Function {
                parameters,
                return_type,
                ..
            } => {
                for param in parameters {
                    self.type_name(param);
                }
                self.type_name(return_type);
            }
            TypeName::Variable { .. } | TypeName::Raw(_) => {}
        }
    }

    fn body(&mut self, body: &Body) {
        match body {
            Body::Expression(expr) => self.expr(expr),
            Body::Block(stmts) => {
                for stmt in stmts {
                    match stmt {
                        Stmt::Return(expr) | Stmt::Expr(expr) => self.expr(expr),
                        Stmt::Assign { target, value } => {
                            self.expr(target);
                            self.expr(value);
                        }
                    }
                }
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) | Expr::Str(_) | Expr::Name(_) | Expr::This => {}
            Expr::Field(receiver, _) => self.expr(receiver),
            Expr::EnumEntry(class, _) => {
                self.classes.insert(class.top_level());
            }
            Expr::Call { callee, args } => {
                match callee {
                    Callee::Constructor(class) => {
                        self.classes.insert(class.top_level());
                    }
                    Callee::Function(member) => {
                        self.members.insert(member.clone());
                    }
                    Callee::Method(receiver, _) => self.expr(receiver),
                }
                for Argument { value, .. } in args {
                    self.expr(value);
                }
            }
        }
    }
}
