//! Transitive closure of fake requests over required constructor parameters.

use std::collections::{HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};
use stubgen_symbols::{ClassId, ClassRef, Location, Resolver, TypeRef, ValueParameter};

use crate::builtins::Builtins;
use crate::error::ProcessError;
use crate::requests::Classifier;

/// Constructor parameters a fake has to supply a fake for: no default, not
/// nullable, not a builtin. Types are qualified against the class's file.
pub(crate) fn required_dependencies<'a, R: Resolver + ?Sized>(
    resolver: &'a R,
    builtins: &'a Builtins,
    class: ClassRef<'a>,
) -> impl Iterator<Item = (&'a ValueParameter, TypeRef)> + 'a {
    class
        .decl
        .primary_constructor
        .iter()
        .flat_map(|constructor| constructor.parameters.iter())
        .filter(|param| !param.has_default)
        .map(move |param| (param, resolver.resolve_in_file(&param.ty, class.file)))
        .filter(move |(_, ty)| {
            !ty.is_nullable()
                && !ty
                    .qualified_name()
                    .is_some_and(|name| builtins.contains(name))
        })
}

/// Add a fake request for every type a requested fake needs, until nothing new turns up.
pub(crate) fn expand<R: Resolver + ?Sized>(classifier: &mut Classifier<'_, R>) {
    let resolver = classifier.resolver;
    let builtins = classifier.builtins;
    let mut queue: VecDeque<(ClassId, IndexSet<String>)> = classifier
        .requests
        .fakes
        .iter()
        .map(|(id, files)| (*id, files.clone()))
        .collect();

    while let Some((id, files)) = queue.pop_front() {
        let class = resolver.class(id);
        for (param, ty) in required_dependencies(resolver, builtins, class) {
            let known = resolver
                .class_of(&ty)
                .is_some_and(|dep| classifier.requests.fakes.contains_key(&dep));
            if known {
                continue;
            }
            let location = param.location.as_ref().or(class.location());
            if let Some(dep) = classifier.add_fake(&ty, files.iter().map(String::as_str), location) {
                tracing::debug!(
                    target: "stubgen.processor",
                    class = class.qualified_name(),
                    parameter = %param.name,
                    dependency = resolver.class(dep).qualified_name(),
                    "fake required by constructor parameter"
                );
                queue.push_back((dep, files.clone()));
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Report every cycle among the fakes' required constructor parameters.
///
/// Depth-first over an explicit stack; a dependency met while still marked
/// in progress closes a cycle.
pub(crate) fn find_cycles<R: Resolver + ?Sized>(
    resolver: &R,
    builtins: &Builtins,
    fakes: &IndexMap<ClassId, IndexSet<String>>,
) -> Vec<ProcessError> {
    let edges: IndexMap<ClassId, Vec<ClassId>> = fakes
        .keys()
        .map(|&id| {
            let deps = required_dependencies(resolver, builtins, resolver.class(id))
                .filter_map(|(_, ty)| resolver.class_of(&ty))
                .filter(|dep| fakes.contains_key(dep))
                .collect();
            (id, deps)
        })
        .collect();

    let mut errors = Vec::new();
    let mut marks: HashMap<ClassId, Mark> = HashMap::new();
    for &root in edges.keys() {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root, Mark::InProgress);
        let mut path: Vec<(ClassId, usize)> = vec![(root, 0)];

        while let Some(&(node, next)) = path.last() {
            let Some(&dep) = edges[&node].get(next) else {
                marks.insert(node, Mark::Done);
                path.pop();
                continue;
            };
            if let Some(top) = path.last_mut() {
                top.1 += 1;
            }
            match marks.get(&dep) {
                None => {
                    marks.insert(dep, Mark::InProgress);
                    path.push((dep, 0));
                }
                Some(Mark::InProgress) => {
                    let start = path.iter().position(|(id, _)| *id == dep).unwrap_or(0);
                    let chain: Vec<&str> = path[start..]
                        .iter()
                        .map(|(id, _)| resolver.class(*id).qualified_name())
                        .chain(std::iter::once(resolver.class(dep).qualified_name()))
                        .collect();
                    let head = resolver.class(dep);
                    errors.push(ProcessError::invalid_target(
                        Location::describe(head.location()),
                        format!(
                            "Cannot generate fake for {}: required constructor parameters form a cycle {}",
                            head.qualified_name(),
                            chain.join(" -> ")
                        ),
                    ));
                }
                Some(Mark::Done) => {}
            }
        }
    }
    errors
}
