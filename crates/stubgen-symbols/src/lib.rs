//! Frozen symbol universe consumed by the stubgen processor.
//!
//! A host exports every declaration of a compilation unit as a [`Snapshot`];
//! [`SymbolUniverse`] indexes it and answers the [`Resolver`] queries the
//! processor needs (annotated sites, declarations by name, inherited members).

mod model;
mod universe;

pub use model::{
    Annotation, ClassDecl, ClassKind, Constructor, FunctionDecl, Location, Modifier,
    PropertyDecl, Snapshot, SourceFile, TypeArg, TypeParameter, TypeRef, ValueParameter, Variance,
};
pub use universe::{
    AnnotatedSymbol, ClassId, ClassRef, FileId, Resolver, SymbolError, SymbolUniverse,
};
