//! Kotlin source model and printer used by stubgen.
//!
//! Output is deterministic: imports are collected from the model, sorted, and
//! names that would collide are printed fully qualified instead of imported.
//! Packages implicitly visible to Kotlin code (see [`DEFAULT_IMPORT_PACKAGES`])
//! and the file's own package are never imported.

mod code;
pub mod doc;
mod imports;
mod kotlin;

pub use code::{
    AccessorDef, Argument, Body, Callee, ClassDef, ClassName, ConstructorProperty, Expr, FileDef,
    FunctionDef, Item, KModifier, MemberName, ParameterDef, Projection, PropertyDef, Stmt,
    TypeArgument, TypeName, TypeVariable,
};
pub use doc::PrintConfig;
pub use imports::DEFAULT_IMPORT_PACKAGES;
pub use kotlin::{escape_identifier, render_file, string_literal, GENERATED_HEADER};
