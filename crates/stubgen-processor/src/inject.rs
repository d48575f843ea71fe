//! `<Owner>_injectMocks` files: an extension function assigning every
//! annotated field of the owner.

use stubgen_format::{
    Argument, Body, Callee, ClassName, Expr, FileDef, FunctionDef, Item, KModifier, MemberName,
    ParameterDef, Stmt, TypeName,
};
use stubgen_symbols::{ClassId, Resolver, TypeRef};

use crate::options::ProcessorOptions;
use crate::requests::{InjectionField, RequestKind};
use crate::types;

const DISPATCHER_PARAM: &str = "mocker";

pub(crate) fn synthesize<R: Resolver + ?Sized>(
    resolver: &R,
    options: &ProcessorOptions,
    owner: ClassId,
    fields: &[InjectionField],
) -> FileDef {
    let class = resolver.class(owner);

    let mut inject = FunctionDef::new("injectMocks");
    inject.modifiers.insert(KModifier::Internal);
    inject.receiver = Some(types::star_type(&class));
    inject.parameters.push(ParameterDef::new(
        DISPATCHER_PARAM,
        TypeName::class(options.dispatcher_class()),
    ));
    inject.body = Body::Block(
        fields
            .iter()
            .map(|field| Stmt::Assign {
                target: Expr::field(Expr::This, field.name.clone()),
                value: field_value(resolver, options, class.qualified_name(), field),
            })
            .collect(),
    );

    tracing::debug!(
        target: "stubgen.processor",
        owner = class.qualified_name(),
        fields = fields.len(),
        "synthesized injector"
    );
    FileDef::new(class.package, format!("{}_injectMocks", class.simple_name()))
        .with_item(Item::Function(inject))
}

fn dispatcher() -> Argument {
    Argument::positional(Expr::Name(DISPATCHER_PARAM.to_string()))
}

fn field_value<R: Resolver + ?Sized>(
    resolver: &R,
    options: &ProcessorOptions,
    owner: &str,
    field: &InjectionField,
) -> Expr {
    match field.kind {
        RequestKind::Mock => match field.ty.function_type_arguments() {
            Some(arguments) => mock_function(options, owner, field, &arguments),
            None => Expr::call(
                Callee::Constructor(types::mock_class(&target(resolver, &field.ty))),
                [dispatcher()],
            ),
        },
        RequestKind::Fake => match field
            .ty
            .qualified_name()
            .and_then(|name| options.builtins.get(name))
        {
            Some(builtin) => builtin.to_expr(),
            None => Expr::call(
                Callee::Function(types::fake_function(&target(resolver, &field.ty))),
                [],
            ),
        },
    }
}

/// `mockFunction<arity>(mocker, "P1", ..)`; the last type argument is the return type.
fn mock_function(
    options: &ProcessorOptions,
    owner: &str,
    field: &InjectionField,
    arguments: &[Option<TypeRef>],
) -> Expr {
    let arity = arguments.len().saturating_sub(1);
    let names: Vec<String> = arguments
        .iter()
        .map(|arg| types::key_name(arg.as_ref()))
        .collect();
    tracing::warn!(
        target: "stubgen.processor",
        owner,
        field = %field.name,
        type_arguments = %names.join(", "),
        "function-typed field is mocked with {}{arity}",
        options.mock_function_prefix
    );

    let mut args = vec![dispatcher()];
    args.extend(
        names
            .into_iter()
            .take(arity)
            .map(|name| Argument::positional(Expr::Str(name))),
    );
    Expr::call(
        Callee::Function(MemberName::new(
            options.runtime_package.clone(),
            format!("{}{arity}", options.mock_function_prefix),
        )),
        args,
    )
}

fn target<R: Resolver + ?Sized>(resolver: &R, ty: &TypeRef) -> ClassName {
    types::target_of(resolver, ty).unwrap_or_else(|| ClassName::from_qualified(&types::describe(ty)))
}
