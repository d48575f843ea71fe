//! `Mock<Name>` classes: every abstract member forwards to the dispatcher.

use std::collections::BTreeSet;

use stubgen_format::{
    AccessorDef, Argument, Body, ClassDef, ConstructorProperty, Expr, FileDef, FunctionDef, Item,
    KModifier, ParameterDef, PropertyDef, Stmt, TypeName,
};
use stubgen_symbols::{ClassId, FunctionDecl, PropertyDecl, Resolver};

use crate::options::ProcessorOptions;
use crate::types;

const DISPATCHER_FIELD: &str = "mocker";

pub(crate) fn synthesize<R: Resolver + ?Sized>(
    resolver: &R,
    id: ClassId,
    options: &ProcessorOptions,
) -> FileDef {
    let interface = resolver.class(id);
    let name = format!("Mock{}", interface.simple_name());

    let mut class = ClassDef::new(name.clone());
    class.modifiers.insert(KModifier::Internal);
    class.type_variables = interface
        .decl
        .type_parameters
        .iter()
        .map(|param| types::type_variable(resolver, param, true))
        .collect();
    class.superinterfaces.push(types::self_type(&interface));
    class.constructor_properties.push(ConstructorProperty {
        name: DISPATCHER_FIELD.to_string(),
        ty: TypeName::class(options.dispatcher_class()),
        modifiers: BTreeSet::from([KModifier::Private]),
    });

    class.properties = resolver
        .all_properties(id)
        .iter()
        .filter(|property| property.is_abstract())
        .map(|property| mock_property(resolver, property))
        .collect();
    class.functions = resolver
        .all_functions(id)
        .iter()
        .filter(|function| function.is_abstract())
        .map(|function| mock_function(resolver, function))
        .collect();

    tracing::debug!(
        target: "stubgen.processor",
        interface = interface.qualified_name(),
        properties = class.properties.len(),
        functions = class.functions.len(),
        "synthesized mock"
    );
    FileDef::new(interface.package, name).with_item(Item::Class(class))
}

/// `this.mocker.register(this, "<key>", args...)`
fn register(key: String, args: impl IntoIterator<Item = Expr>) -> Expr {
    let mut arguments = vec![
        Argument::positional(Expr::This),
        Argument::positional(Expr::Str(key)),
    ];
    arguments.extend(args.into_iter().map(Argument::positional));
    Expr::method(Expr::field(Expr::This, DISPATCHER_FIELD), "register", arguments)
}

fn mock_property<R: Resolver + ?Sized>(resolver: &R, property: &PropertyDecl) -> PropertyDef {
    let getter = AccessorDef {
        parameter: None,
        body: Body::Expression(register(format!("get:{}", property.name), [])),
    };
    let setter = property.mutable.then(|| AccessorDef {
        parameter: Some("value".to_string()),
        body: Body::Block(vec![Stmt::Return(register(
            format!("set:{}", property.name),
            [Expr::Name("value".to_string())],
        ))]),
    });
    PropertyDef {
        name: property.name.clone(),
        ty: types::type_name(resolver, &property.ty),
        modifiers: BTreeSet::from([KModifier::Override]),
        mutable: property.mutable,
        getter: Some(getter),
        setter,
    }
}

/// Dispatcher key of a function: `name(param.Type, other.Type)`.
pub(crate) fn function_key(function: &FunctionDecl) -> String {
    let params: Vec<String> = function
        .parameters
        .iter()
        .map(|param| types::key_name(Some(&param.ty)))
        .collect();
    format!("{}({})", function.name, params.join(", "))
}

fn mock_function<R: Resolver + ?Sized>(resolver: &R, function: &FunctionDecl) -> FunctionDef {
    let mut def = FunctionDef::new(function.name.clone());
    def.modifiers.insert(KModifier::Override);
    def.modifiers.extend(
        function
            .modifiers
            .iter()
            .filter_map(|modifier| types::preserved_modifier(*modifier)),
    );
    def.type_variables = function
        .type_parameters
        .iter()
        .map(|param| types::type_variable(resolver, param, false))
        .collect();
    def.parameters = function
        .parameters
        .iter()
        .map(|param| ParameterDef::new(param.name.clone(), types::type_name(resolver, &param.ty)))
        .collect();
    def.return_type = Some(types::type_name(resolver, &function.return_type));
    def.body = Body::Block(vec![Stmt::Return(register(
        function_key(function),
        function
            .parameters
            .iter()
            .map(|param| Expr::Name(param.name.clone())),
    ))]);
    def
}
