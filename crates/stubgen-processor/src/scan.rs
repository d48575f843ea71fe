//! Discovery of annotated sites.

use indexmap::IndexMap;
use stubgen_symbols::{AnnotatedSymbol, ClassId, ClassRef, Location, PropertyDecl, Resolver, TypeRef};

use crate::error::ProcessError;
use crate::options::{short_annotation, ProcessorOptions};
use crate::requests::{InjectionField, RequestKind};

/// A type some site asked to mock or fake, before validation.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub(crate) kind: RequestKind,
    pub(crate) ty: TypeRef,
    pub(crate) files: Vec<String>,
    pub(crate) location: Option<Location>,
}

/// What a field marker was found on.
pub(crate) enum FieldSite<'a> {
    Property {
        owner: Option<ClassRef<'a>>,
        property: &'a PropertyDecl,
    },
    Setter {
        owner: Option<ClassRef<'a>>,
        property: &'a PropertyDecl,
    },
    Other,
}

impl<'a> From<&AnnotatedSymbol<'a>> for FieldSite<'a> {
    fn from(symbol: &AnnotatedSymbol<'a>) -> Self {
        match *symbol {
            AnnotatedSymbol::Property {
                owner, property, ..
            } => FieldSite::Property { owner, property },
            AnnotatedSymbol::Setter {
                owner, property, ..
            } => FieldSite::Setter { owner, property },
            AnnotatedSymbol::File { .. }
            | AnnotatedSymbol::Class { .. }
            | AnnotatedSymbol::Function { .. } => FieldSite::Other,
        }
    }
}

#[derive(Default)]
pub(crate) struct Scan {
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) injections: IndexMap<ClassId, Vec<InjectionField>>,
    pub(crate) errors: Vec<ProcessError>,
}

/// Collect every candidate in a fixed order: mock fields, fake fields,
/// mock use-sites, fake use-sites.
pub(crate) fn scan<R: Resolver + ?Sized>(resolver: &R, options: &ProcessorOptions) -> Scan {
    let mut scan = Scan::default();
    scan.fields(resolver, &options.mock_annotation, RequestKind::Mock);
    scan.fields(resolver, &options.fake_annotation, RequestKind::Fake);
    scan.uses(resolver, &options.uses_mocks_annotation, RequestKind::Mock);
    scan.uses(resolver, &options.uses_fakes_annotation, RequestKind::Fake);
    scan
}

impl Scan {
    fn fields<R: Resolver + ?Sized>(&mut self, resolver: &R, annotation: &str, kind: RequestKind) {
        for symbol in resolver.symbols_with_annotation(annotation) {
            let location = Location::describe(symbol.location());
            let (owner, property) = match FieldSite::from(&symbol) {
                FieldSite::Setter { owner, property } => (owner, property),
                FieldSite::Property { owner, property } => {
                    if !property.mutable {
                        self.errors.push(ProcessError::configuration(
                            location,
                            format!(
                                "{} is immutable but is annotated with @{}",
                                symbol.describe(),
                                short_annotation(annotation)
                            ),
                        ));
                        continue;
                    }
                    (owner, property)
                }
                FieldSite::Other => {
                    self.errors.push(ProcessError::configuration(
                        location,
                        format!(
                            "{} is not a property nor a property setter but is annotated with @{}",
                            symbol.describe(),
                            short_annotation(annotation)
                        ),
                    ));
                    continue;
                }
            };
            let Some(owner) = owner else {
                self.errors.push(ProcessError::configuration(
                    location,
                    format!(
                        "Cannot generate injector for property {} as it is not inside a class",
                        property.name
                    ),
                ));
                continue;
            };

            let ty = resolver.resolve_in_file(&property.ty, owner.file);
            self.injections
                .entry(owner.id)
                .or_default()
                .push(InjectionField {
                    kind,
                    name: property.name.clone(),
                    ty: ty.clone(),
                    location: symbol.location().cloned(),
                });
            self.candidates.push(Candidate {
                kind,
                ty,
                files: vec![owner.file.to_string()],
                location: symbol.location().cloned(),
            });
        }
    }

    fn uses<R: Resolver + ?Sized>(&mut self, resolver: &R, annotation: &str, kind: RequestKind) {
        for symbol in resolver.symbols_with_annotation(annotation) {
            let file = symbol.file();
            for ty in &symbol.annotation().types {
                self.candidates.push(Candidate {
                    kind,
                    ty: resolver.resolve_in_file(ty, file),
                    files: vec![file.to_string()],
                    location: symbol.location().cloned(),
                });
            }
        }
    }
}
