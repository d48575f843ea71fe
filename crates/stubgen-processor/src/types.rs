//! Conversions from host type references to the code model.

use stubgen_format::{ClassName, KModifier, MemberName, Projection, TypeArgument, TypeName, TypeVariable};
use stubgen_symbols::{ClassRef, Modifier, Resolver, TypeArg, TypeParameter, TypeRef, Variance};

pub(crate) fn class_name(class: &ClassRef<'_>) -> ClassName {
    ClassName::new(class.package, class.simple_name())
}

/// Class name for a qualified name, preferring the universe's package split.
pub(crate) fn class_name_for<R: Resolver + ?Sized>(resolver: &R, qualified: &str) -> ClassName {
    match resolver.lookup(qualified) {
        Some(id) => class_name(&resolver.class(id)),
        None => ClassName::from_qualified(qualified),
    }
}

pub(crate) fn type_name<R: Resolver + ?Sized>(resolver: &R, ty: &TypeRef) -> TypeName {
    match ty {
        TypeRef::Named {
            name,
            args,
            nullable,
        } => TypeName::Class {
            name: class_name_for(resolver, name),
            args: args.iter().map(|arg| type_argument(resolver, arg)).collect(),
            nullable: *nullable,
        },
        TypeRef::Parameter { name, nullable } => TypeName::Variable {
            name: name.clone(),
            nullable: *nullable,
        },
        TypeRef::Function {
            parameters,
            return_type,
            nullable,
            suspend,
        } => TypeName::Function {
            parameters: parameters.iter().map(|p| type_name(resolver, p)).collect(),
            return_type: Box::new(type_name(resolver, return_type)),
            nullable: *nullable,
            suspend: *suspend,
        },
        TypeRef::Unresolved { text } => TypeName::Raw(text.clone()),
    }
}

fn type_argument<R: Resolver + ?Sized>(resolver: &R, arg: &TypeArg) -> TypeArgument {
    match (&arg.ty, arg.variance) {
        (None, _) | (_, Variance::Star) => TypeArgument::Star,
        (Some(ty), variance) => TypeArgument::Type(projection(variance), type_name(resolver, ty)),
    }
}

fn projection(variance: Variance) -> Projection {
    match variance {
        Variance::In => Projection::In,
        Variance::Out => Projection::Out,
        Variance::Invariant | Variance::Star => Projection::Invariant,
    }
}

/// Declaration-site variance is kept on classes and dropped on functions,
/// where Kotlin does not allow it.
pub(crate) fn type_variable<R: Resolver + ?Sized>(
    resolver: &R,
    param: &TypeParameter,
    keep_variance: bool,
) -> TypeVariable {
    TypeVariable {
        name: param.name.clone(),
        projection: if keep_variance {
            projection(param.variance)
        } else {
            Projection::Invariant
        },
        bounds: param
            .bounds
            .iter()
            .map(|bound| type_name(resolver, bound))
            .collect(),
        reified: param.reified,
    }
}

/// `Owner<A, B>` for a class with type parameters `A, B`.
pub(crate) fn self_type(class: &ClassRef<'_>) -> TypeName {
    TypeName::parameterized(
        class_name(class),
        class
            .decl
            .type_parameters
            .iter()
            .map(|param| TypeName::variable(param.name.clone())),
    )
}

/// `Owner<*, *>`, used where a generic owner is referenced without its parameters.
pub(crate) fn star_type(class: &ClassRef<'_>) -> TypeName {
    TypeName::Class {
        name: class_name(class),
        args: class
            .decl
            .type_parameters
            .iter()
            .map(|_| TypeArgument::Star)
            .collect(),
        nullable: false,
    }
}

/// Name used for a type inside member keys and mock-function matchers; `?`
/// when the type does not name a declaration.
pub(crate) fn key_name(ty: Option<&TypeRef>) -> String {
    ty.and_then(TypeRef::declaration_name)
        .unwrap_or_else(|| "?".to_string())
}

/// Human-readable spelling of a reference for diagnostics.
pub(crate) fn describe(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named { name, .. } => name.clone(),
        TypeRef::Parameter { name, .. } => format!("type parameter {name}"),
        TypeRef::Function { .. } => format!("function type {}", key_name(Some(ty))),
        TypeRef::Unresolved { text } => format!("unresolved type {text}"),
    }
}

/// Package and simple name of the declaration `ty` points at.
pub(crate) fn target_of<R: Resolver + ?Sized>(resolver: &R, ty: &TypeRef) -> Option<ClassName> {
    let qualified = ty.qualified_name()?;
    Some(class_name_for(resolver, qualified))
}

/// `com.example.Repo` -> `com.example.MockRepo`.
pub(crate) fn mock_class(target: &ClassName) -> ClassName {
    ClassName::new(target.package.clone(), format!("Mock{}", target.simple_name()))
}

/// `com.example.Team` -> `com.example.fakeTeam`.
pub(crate) fn fake_function(target: &ClassName) -> MemberName {
    MemberName::new(target.package.clone(), format!("fake{}", target.simple_name()))
}

/// Modifiers carried over from an abstract member onto its override.
pub(crate) fn preserved_modifier(modifier: Modifier) -> Option<KModifier> {
    Some(match modifier {
        Modifier::Public => KModifier::Public,
        Modifier::Protected => KModifier::Protected,
        Modifier::Internal => KModifier::Internal,
        Modifier::Private => KModifier::Private,
        Modifier::Open => KModifier::Open,
        Modifier::Final => KModifier::Final,
        Modifier::Override => KModifier::Override,
        Modifier::Suspend => KModifier::Suspend,
        Modifier::Operator => KModifier::Operator,
        Modifier::Infix => KModifier::Infix,
        Modifier::Inline => KModifier::Inline,
        Modifier::Tailrec => KModifier::Tailrec,
        Modifier::External => KModifier::External,
        Modifier::Abstract | Modifier::Sealed | Modifier::Data => return None,
    })
}
