//! Kotlin rendering of [`FileDef`] values.

use std::collections::BTreeSet;

use crate::code::{
    AccessorDef, Argument, Body, Callee, ClassDef, ConstructorProperty, Expr, FileDef, FunctionDef,
    Item, KModifier, ParameterDef, Projection, PropertyDef, Stmt, TypeArgument, TypeName,
    TypeVariable,
};
use crate::doc::{print, Doc, PrintConfig};
use crate::imports::ImportScope;

pub const GENERATED_HEADER: &str = "// Generated by stubgen. Do not edit.";

const HARD_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// Backtick-quote identifiers that collide with Kotlin hard keywords.
pub fn escape_identifier(name: &str) -> String {
    if HARD_KEYWORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

/// Quote and escape `value` as a Kotlin string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a whole file: header, package, imports and items.
pub fn render_file(file: &FileDef, config: PrintConfig) -> String {
    let scope = ImportScope::for_file(file);
    let renderer = Renderer { scope: &scope };

    let mut sections: Vec<Doc<'static>> = vec![Doc::text(GENERATED_HEADER)];
    if !file.package.is_empty() {
        let package = file
            .package
            .split('.')
            .map(escape_identifier)
            .collect::<Vec<_>>()
            .join(".");
        sections.push(Doc::text(format!("package {package}")));
    }
    let imports: Vec<Doc<'static>> = scope
        .imports()
        .map(|import| Doc::text(format!("import {import}")))
        .collect();
    if !imports.is_empty() {
        sections.push(Doc::join(Doc::hardline(), imports));
    }
    for item in &file.items {
        sections.push(renderer.item(item));
    }

    let blank = Doc::concat([Doc::hardline(), Doc::hardline()]);
    let mut out = print(Doc::join(blank, sections), config);
    out.push_str(config.newline);
    out
}

struct Renderer<'s> {
    scope: &'s ImportScope,
}

fn modifiers_doc(modifiers: &BTreeSet<KModifier>) -> Doc<'static> {
    Doc::concat(
        modifiers
            .iter()
            .map(|modifier| Doc::text(format!("{} ", modifier.keyword()))),
    )
}

/// `open` + `items` separated by `,` + `close`, wrapping one item per line when too long.
fn delimited(open: &'static str, items: Vec<Doc<'static>>, close: &'static str) -> Doc<'static> {
    if items.is_empty() {
        return Doc::text(format!("{open}{close}"));
    }
    Doc::concat([
        Doc::text(open),
        Doc::concat([
            Doc::softline(),
            Doc::join(Doc::concat([Doc::text(","), Doc::line()]), items),
        ])
        .indent(),
        Doc::softline(),
        Doc::text(close),
    ])
    .group()
}

impl Renderer<'_> {
    fn item(&self, item: &Item) -> Doc<'static> {
        match item {
            Item::Class(class) => self.class(class),
            Item::Function(function) => self.function(function),
        }
    }

    fn type_name(&self, ty: &TypeName) -> String {
        match ty {
            TypeName::Class {
                name,
                args,
                nullable,
            } => {
                let mut out = self.scope.class_name(name);
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|arg| self.type_argument(arg)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                if *nullable {
                    out.push('?');
                }
                out
            }
            TypeName::Variable { name, nullable } => {
                if *nullable {
                    format!("{name}?")
                } else {
                    name.clone()
                }
            }
            TypeName::Function {
                parameters,
                return_type,
                nullable,
                suspend,
            } => {
                let params: Vec<String> = parameters.iter().map(|p| self.type_name(p)).collect();
                let mut out = format!("({}) -> {}", params.join(", "), self.type_name(return_type));
                if *suspend {
                    out = format!("suspend {out}");
                }
                if *nullable {
                    out = format!("({out})?");
                }
                out
            }
            TypeName::Raw(text) => text.clone(),
        }
    }

    fn type_argument(&self, arg: &TypeArgument) -> String {
        match arg {
            TypeArgument::Star => "*".to_string(),
            TypeArgument::Type(projection, ty) => {
                format!("{}{}", projection_prefix(*projection), self.type_name(ty))
            }
        }
    }

    fn type_variables(&self, vars: &[TypeVariable]) -> Doc<'static> {
        if vars.is_empty() {
            return Doc::nil();
        }
        let vars: Vec<String> = vars
            .iter()
            .map(|var| {
                let mut out = String::new();
                if var.reified {
                    out.push_str("reified ");
                }
                out.push_str(projection_prefix(var.projection));
                out.push_str(&var.name);
                if let [bound] = var.bounds.as_slice() {
                    out.push_str(" : ");
                    out.push_str(&self.type_name(bound));
                }
                out
            })
            .collect();
        Doc::text(format!("<{}>", vars.join(", ")))
    }

    /// Trailing `where` clause for variables with more than one bound.
    fn where_clause(&self, vars: &[TypeVariable]) -> Doc<'static> {
        let constraints: Vec<String> = vars
            .iter()
            .filter(|var| var.bounds.len() > 1)
            .flat_map(|var| {
                var.bounds
                    .iter()
                    .map(move |bound| format!("{} : {}", var.name, self.type_name(bound)))
            })
            .collect();
        if constraints.is_empty() {
            Doc::nil()
        } else {
            Doc::text(format!(" where {}", constraints.join(", ")))
        }
    }

    fn class(&self, class: &ClassDef) -> Doc<'static> {
        let mut header = vec![
            modifiers_doc(&class.modifiers),
            Doc::text(format!("class {}", escape_identifier(&class.name))),
            self.type_variables(&class.type_variables),
        ];
        if !class.constructor_properties.is_empty() {
            let params = class
                .constructor_properties
                .iter()
                .map(|property| self.constructor_property(property))
                .collect();
            header.push(delimited("(", params, ")"));
        }
        if !class.superinterfaces.is_empty() {
            let supers: Vec<String> = class
                .superinterfaces
                .iter()
                .map(|ty| self.type_name(ty))
                .collect();
            header.push(Doc::text(format!(" : {}", supers.join(", "))));
        }
        header.push(self.where_clause(&class.type_variables));

        let members: Vec<Doc<'static>> = class
            .properties
            .iter()
            .map(|property| self.property(property))
            .chain(class.functions.iter().map(|function| self.function(function)))
            .collect();
        if members.is_empty() {
            return Doc::concat(header);
        }

        let blank = Doc::concat([Doc::hardline(), Doc::hardline()]);
        header.push(Doc::text(" {"));
        header.push(Doc::concat([Doc::hardline(), Doc::join(blank, members)]).indent());
        header.push(Doc::hardline());
        header.push(Doc::text("}"));
        Doc::concat(header)
    }

    fn constructor_property(&self, property: &ConstructorProperty) -> Doc<'static> {
        Doc::concat([
            modifiers_doc(&property.modifiers),
            Doc::text(format!(
                "val {}: {}",
                escape_identifier(&property.name),
                self.type_name(&property.ty)
            )),
        ])
    }

    fn property(&self, property: &PropertyDef) -> Doc<'static> {
        let keyword = if property.mutable { "var" } else { "val" };
        let mut parts = vec![
            modifiers_doc(&property.modifiers),
            Doc::text(format!(
                "{keyword} {}: {}",
                escape_identifier(&property.name),
                self.type_name(&property.ty)
            )),
        ];
        let mut accessors = Vec::new();
        if let Some(getter) = &property.getter {
            accessors.push(self.accessor("get", getter));
        }
        if let Some(setter) = &property.setter {
            accessors.push(self.accessor("set", setter));
        }
        if !accessors.is_empty() {
            parts.push(
                Doc::concat([Doc::hardline(), Doc::join(Doc::hardline(), accessors)]).indent(),
            );
        }
        Doc::concat(parts)
    }

    fn accessor(&self, keyword: &str, accessor: &AccessorDef) -> Doc<'static> {
        let parameter = accessor
            .parameter
            .as_deref()
            .map(escape_identifier)
            .unwrap_or_default();
        Doc::concat([
            Doc::text(format!("{keyword}({parameter})")),
            self.body(&accessor.body),
        ])
    }

    fn function(&self, function: &FunctionDef) -> Doc<'static> {
        let mut signature = vec![modifiers_doc(&function.modifiers), Doc::text("fun ")];
        if !function.type_variables.is_empty() {
            signature.push(self.type_variables(&function.type_variables));
            signature.push(Doc::text(" "));
        }
        if let Some(receiver) = &function.receiver {
            signature.push(Doc::text(format!("{}.", self.type_name(receiver))));
        }
        signature.push(Doc::text(escape_identifier(&function.name)));
        let params = function
            .parameters
            .iter()
            .map(|param| self.parameter(param))
            .collect();
        signature.push(delimited("(", params, ")"));
        if let Some(ty) = function.return_type.as_ref().filter(|ty| !ty.is_unit()) {
            signature.push(Doc::text(format!(": {}", self.type_name(ty))));
        }
        signature.push(self.where_clause(&function.type_variables));
        signature.push(self.body(&function.body));
        Doc::concat(signature)
    }

    fn parameter(&self, param: &ParameterDef) -> Doc<'static> {
        Doc::text(format!(
            "{}: {}",
            escape_identifier(&param.name),
            self.type_name(&param.ty)
        ))
    }

    fn body(&self, body: &Body) -> Doc<'static> {
        match body {
            Body::Expression(expr) => Doc::concat([Doc::text(" = "), self.expr(expr)]),
            Body::Block(stmts) if stmts.is_empty() => Doc::text(" {}"),
            Body::Block(stmts) => Doc::concat([
                Doc::text(" {"),
                Doc::concat([
                    Doc::hardline(),
                    Doc::join(Doc::hardline(), stmts.iter().map(|stmt| self.stmt(stmt))),
                ])
                .indent(),
                Doc::hardline(),
                Doc::text("}"),
            ]),
        }
    }

    fn stmt(&self, stmt: &Stmt) -> Doc<'static> {
        match stmt {
            Stmt::Return(expr) => Doc::concat([Doc::text("return "), self.expr(expr)]),
            Stmt::Assign { target, value } => {
                Doc::concat([self.expr(target), Doc::text(" = "), self.expr(value)])
            }
            Stmt::Expr(expr) => self.expr(expr),
        }
    }

    fn expr(&self, expr: &Expr) -> Doc<'static> {
        match expr {
            Expr::Literal(text) => Doc::text(text.clone()),
            Expr::Str(value) => Doc::text(string_literal(value)),
            Expr::Name(name) => Doc::text(escape_identifier(name)),
            Expr::This => Doc::text("this"),
            Expr::Field(receiver, name) => Doc::concat([
                self.expr(receiver),
                Doc::text(format!(".{}", escape_identifier(name))),
            ]),
            Expr::EnumEntry(class, entry) => Doc::text(format!(
                "{}.{}",
                self.scope.class_name(class),
                escape_identifier(entry)
            )),
            Expr::Call { callee, args } => {
                let callee = match callee {
                    Callee::Constructor(class) => Doc::text(self.scope.class_name(class)),
                    Callee::Function(member) => Doc::text(self.scope.member_name(member)),
                    Callee::Method(receiver, name) => Doc::concat([
                        self.expr(receiver),
                        Doc::text(format!(".{}", escape_identifier(name))),
                    ]),
                };
                let args = args.iter().map(|arg| self.argument(arg)).collect();
                Doc::concat([callee, delimited("(", args, ")")])
            }
        }
    }

    fn argument(&self, arg: &Argument) -> Doc<'static> {
        match &arg.name {
            Some(name) => Doc::concat([
                Doc::text(format!("{} = ", escape_identifier(name))),
                self.expr(&arg.value),
            ]),
            None => self.expr(&arg.value),
        }
    }
}

fn projection_prefix(projection: Projection) -> &'static str {
    match projection {
        Projection::Invariant => "",
        Projection::In => "in ",
        Projection::Out => "out ",
    }
}
