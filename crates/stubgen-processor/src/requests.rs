//! Request classification: which declarations get a mock, a fake, or an injector.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use stubgen_symbols::{ClassId, ClassKind, ClassRef, Location, Modifier, Resolver, TypeRef};

use crate::builtins::Builtins;
use crate::error::ProcessError;
use crate::types;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Mock,
    Fake,
}

/// One annotated field an injector assigns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectionField {
    pub kind: RequestKind,
    pub name: String,
    /// Declared type, qualified against the owner's file.
    pub ty: TypeRef,
    pub location: Option<Location>,
}

/// Everything a round decided to generate, in discovery order.
///
/// Values of `mocks` and `fakes` are the originating source files of each
/// request, which the host needs for incremental rebuilds.
#[derive(Clone, Debug, Default)]
pub struct Requests {
    pub mocks: IndexMap<ClassId, IndexSet<String>>,
    pub fakes: IndexMap<ClassId, IndexSet<String>>,
    pub injections: IndexMap<ClassId, Vec<InjectionField>>,
}

impl Requests {
    /// Name-based view of the requests, for reports.
    pub fn summary<R: Resolver + ?Sized>(&self, resolver: &R) -> RequestSummary {
        let targets = |map: &IndexMap<ClassId, IndexSet<String>>| {
            map.iter()
                .map(|(id, origins)| TargetSummary {
                    target: resolver.class(*id).qualified_name().to_string(),
                    origins: origins.iter().cloned().collect(),
                })
                .collect()
        };
        RequestSummary {
            mocks: targets(&self.mocks),
            fakes: targets(&self.fakes),
            injections: self
                .injections
                .iter()
                .map(|(owner, fields)| InjectionSummary {
                    owner: resolver.class(*owner).qualified_name().to_string(),
                    fields: fields
                        .iter()
                        .map(|field| FieldSummary {
                            name: field.name.clone(),
                            kind: field.kind,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub mocks: Vec<TargetSummary>,
    pub fakes: Vec<TargetSummary>,
    pub injections: Vec<InjectionSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub target: String,
    pub origins: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InjectionSummary {
    pub owner: String,
    pub fields: Vec<FieldSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub kind: RequestKind,
}

/// Accumulates validated requests and the errors found while validating.
pub(crate) struct Classifier<'r, R: ?Sized> {
    pub(crate) resolver: &'r R,
    pub(crate) builtins: &'r Builtins,
    pub(crate) requests: Requests,
    pub(crate) errors: Vec<ProcessError>,
}

impl<'r, R: Resolver + ?Sized> Classifier<'r, R> {
    pub(crate) fn new(resolver: &'r R, builtins: &'r Builtins) -> Self {
        Self {
            resolver,
            builtins,
            requests: Requests::default(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn add<'f>(
        &mut self,
        kind: RequestKind,
        ty: &TypeRef,
        files: impl IntoIterator<Item = &'f str>,
        location: Option<&Location>,
    ) -> Option<ClassId> {
        match kind {
            RequestKind::Mock => self.add_mock(ty, files, location),
            RequestKind::Fake => self.add_fake(ty, files, location),
        }
    }

    /// Request a mock of `ty`. Function types are skipped: injectors stand
    /// them in with mock functions instead.
    pub(crate) fn add_mock<'f>(
        &mut self,
        ty: &TypeRef,
        files: impl IntoIterator<Item = &'f str>,
        location: Option<&Location>,
    ) -> Option<ClassId> {
        if ty.is_function_type() {
            return None;
        }
        let Some(id) = self.resolver.class_of(ty) else {
            self.reject(location, unresolvable("mock", ty));
            return None;
        };
        let class = self.resolver.class(id);
        if class.decl.kind != ClassKind::Interface {
            self.reject(
                location,
                format!(
                    "Cannot generate mock for non interface {} {}",
                    describe_kind(&class),
                    class.qualified_name()
                ),
            );
            return None;
        }
        record(&mut self.requests.mocks, "mock", &class, files);
        Some(id)
    }

    /// Request a fake of `ty`. Builtins need no fake and are skipped.
    pub(crate) fn add_fake<'f>(
        &mut self,
        ty: &TypeRef,
        files: impl IntoIterator<Item = &'f str>,
        location: Option<&Location>,
    ) -> Option<ClassId> {
        if ty
            .qualified_name()
            .is_some_and(|name| self.builtins.contains(name))
        {
            return None;
        }
        let Some(id) = self
            .resolver
            .class_of(ty)
            .filter(|_| !ty.is_function_type())
        else {
            self.reject(location, unresolvable("fake", ty));
            return None;
        };
        let class = self.resolver.class(id);
        let concrete = matches!(class.decl.kind, ClassKind::Class | ClassKind::EnumClass)
            && !class.decl.is_abstract();
        if !concrete {
            self.reject(
                location,
                format!(
                    "Cannot generate fake for non concrete {} {}",
                    describe_kind(&class),
                    class.qualified_name()
                ),
            );
            return None;
        }
        record(&mut self.requests.fakes, "fake", &class, files);
        Some(id)
    }

    fn reject(&mut self, location: Option<&Location>, message: String) {
        self.errors
            .push(ProcessError::invalid_target(Location::describe(location), message));
    }
}

fn record<'f>(
    map: &mut IndexMap<ClassId, IndexSet<String>>,
    kind: &'static str,
    class: &ClassRef<'_>,
    files: impl IntoIterator<Item = &'f str>,
) {
    let origins = map.entry(class.id).or_insert_with(|| {
        tracing::debug!(
            target: "stubgen.processor",
            kind,
            class = class.qualified_name(),
            "request added"
        );
        IndexSet::new()
    });
    origins.extend(files.into_iter().map(str::to_string));
}

fn unresolvable(kind: &str, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named { name, .. } if !ty.is_function_type() => {
            format!("Cannot generate {kind} for unknown type {name}")
        }
        _ => format!("Cannot generate {kind} for {}", types::describe(ty)),
    }
}

/// `interface`, `abstract class`, `enum class`, ...
fn describe_kind(class: &ClassRef<'_>) -> String {
    let decl = class.decl;
    if decl.kind == ClassKind::Class {
        if decl.modifiers.contains(&Modifier::Sealed) {
            return "sealed class".to_string();
        }
        if decl.modifiers.contains(&Modifier::Abstract) {
            return "abstract class".to_string();
        }
    }
    decl.kind.to_string()
}
