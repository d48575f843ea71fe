//! `fake<Name>()` factories returning a minimally valid instance.

use stubgen_format::{Argument, Body, Callee, Expr, FileDef, FunctionDef, Item, KModifier};
use stubgen_symbols::{ClassId, ClassKind, Location, Resolver};

use crate::builtins::Builtins;
use crate::error::ProcessError;
use crate::types;

pub(crate) fn synthesize<R: Resolver + ?Sized>(
    resolver: &R,
    builtins: &Builtins,
    id: ClassId,
) -> Result<FileDef, ProcessError> {
    let class = resolver.class(id);
    let name = format!("fake{}", class.simple_name());
    let location = || Location::describe(class.location());
    let class_name = types::class_name(&class);

    let value = match class.decl.kind {
        ClassKind::Class => match &class.decl.primary_constructor {
            None => Expr::call(Callee::Constructor(class_name), []),
            Some(constructor) => {
                let mut args = Vec::new();
                for param in constructor.parameters.iter().filter(|param| !param.has_default) {
                    let ty = resolver.resolve_in_file(&param.ty, class.file);
                    let value = if ty.is_nullable() {
                        Expr::null()
                    } else if let Some(builtin) =
                        ty.qualified_name().and_then(|name| builtins.get(name))
                    {
                        builtin.to_expr()
                    } else if let Some(target) = types::target_of(resolver, &ty) {
                        Expr::call(Callee::Function(types::fake_function(&target)), [])
                    } else {
                        return Err(ProcessError::invalid_target(
                            Location::describe(param.location.as_ref().or(class.location())),
                            format!(
                                "Cannot generate fake for {}: parameter {} has {}",
                                class.qualified_name(),
                                param.name,
                                types::describe(&ty)
                            ),
                        ));
                    };
                    args.push(Argument::named(param.name.clone(), value));
                }
                Expr::call(Callee::Constructor(class_name), args)
            }
        },
        ClassKind::EnumClass => {
            let Some(entry) = class.decl.entries.first() else {
                return Err(ProcessError::invalid_target(
                    location(),
                    format!("Cannot fake empty enum class {}", class.qualified_name()),
                ));
            };
            Expr::EnumEntry(class_name, entry.clone())
        }
        kind => {
            return Err(ProcessError::unsupported_kind(
                location(),
                format!("Cannot process {kind} {}", class.qualified_name()),
            ));
        }
    };

    let mut factory = FunctionDef::new(name.clone());
    factory.modifiers.insert(KModifier::Internal);
    factory.type_variables = class
        .decl
        .type_parameters
        .iter()
        .map(|param| types::type_variable(resolver, param, false))
        .collect();
    factory.return_type = Some(types::self_type(&class));
    factory.body = Body::Expression(value);

    tracing::debug!(
        target: "stubgen.processor",
        class = class.qualified_name(),
        "synthesized fake"
    );
    Ok(FileDef::new(class.package, name).with_item(Item::Function(factory)))
}
