//! Mock, fake, and injector generation over a frozen symbol universe.
//!
//! A round runs in fixed stages:
//!
//! 1. scan the universe for the four marker annotations,
//! 2. classify every requested type (interfaces are mocked, concrete classes
//!    and enums are faked),
//! 3. expand fake requests over required constructor parameters and reject
//!    constructor cycles,
//! 4. synthesize `Mock<Name>` classes, `fake<Name>()` factories, and
//!    `<Owner>_injectMocks` extension functions.
//!
//! A round either returns every artifact or fails with every diagnostic it
//! found; nothing is handed to an [`ArtifactWriter`] for a failed round.
//! Output is deterministic: requests are kept in discovery order and
//! rendering is a pure function of the requests.

mod artifact;
mod builtins;
mod error;
mod expand;
mod fake;
mod inject;
mod mock;
mod options;
mod requests;
mod scan;
mod types;

use indexmap::IndexSet;
use stubgen_format::{render_file, FileDef, PrintConfig};
use stubgen_symbols::Resolver;

pub use artifact::{ArtifactKind, ArtifactWriter, GeneratedArtifact, MemoryWriter};
pub use builtins::{BuiltinValue, Builtins};
pub use error::ProcessError;
pub use options::{
    ProcessorOptions, DEFAULT_DISPATCHER, DEFAULT_MOCK_FUNCTION_PREFIX, DEFAULT_RUNTIME_PACKAGE,
};
pub use requests::{
    FieldSummary, InjectionField, InjectionSummary, RequestKind, RequestSummary, Requests,
    TargetSummary,
};

use crate::requests::Classifier;

pub const GENERATED_EXTENSION: &str = "kt";

#[derive(Clone, Debug, Default)]
pub struct Processor {
    options: ProcessorOptions,
    print: PrintConfig,
}

impl Processor {
    pub fn new(options: ProcessorOptions) -> Self {
        Self {
            options,
            print: PrintConfig::default(),
        }
    }

    pub fn with_print_config(mut self, print: PrintConfig) -> Self {
        self.print = print;
        self
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Scan, classify, and expand, without synthesizing anything.
    pub fn analyze<R: Resolver + ?Sized>(&self, resolver: &R) -> Result<Requests, ProcessError> {
        let scan = scan::scan(resolver, &self.options);
        let mut classifier = Classifier::new(resolver, &self.options.builtins);
        classifier.errors = scan.errors;
        for candidate in &scan.candidates {
            classifier.add(
                candidate.kind,
                &candidate.ty,
                candidate.files.iter().map(String::as_str),
                candidate.location.as_ref(),
            );
        }
        classifier.requests.injections = scan.injections;
        expand::expand(&mut classifier);

        if !classifier.errors.is_empty() {
            return Err(ProcessError::from_many(classifier.errors));
        }
        let cycles = expand::find_cycles(
            resolver,
            &self.options.builtins,
            &classifier.requests.fakes,
        );
        if !cycles.is_empty() {
            return Err(ProcessError::from_many(cycles));
        }
        Ok(classifier.requests)
    }

    /// Run a full round: mocks first, then fakes, then injectors.
    pub fn run<R: Resolver + ?Sized>(
        &self,
        resolver: &R,
    ) -> Result<Vec<GeneratedArtifact>, ProcessError> {
        let span = tracing::info_span!(
            "stubgen.round",
            mocks = tracing::field::Empty,
            fakes = tracing::field::Empty,
            injectors = tracing::field::Empty
        );
        let _guard = span.enter();

        let requests = self.analyze(resolver).inspect_err(|err| {
            tracing::debug!(target: "stubgen.processor", error = %err, "round rejected");
        })?;
        span.record("mocks", requests.mocks.len());
        span.record("fakes", requests.fakes.len());
        span.record("injectors", requests.injections.len());

        let mut artifacts = Vec::new();
        let mut errors = Vec::new();

        for (id, origins) in &requests.mocks {
            let file = mock::synthesize(resolver, *id, &self.options);
            artifacts.push(self.artifact(ArtifactKind::Mock, file, origins.clone()));
        }
        for (id, origins) in &requests.fakes {
            match fake::synthesize(resolver, &self.options.builtins, *id) {
                Ok(file) => artifacts.push(self.artifact(ArtifactKind::Fake, file, origins.clone())),
                Err(err) => errors.push(err),
            }
        }
        for (owner, fields) in &requests.injections {
            let file = inject::synthesize(resolver, &self.options, *owner, fields);
            let origins = IndexSet::from([resolver.class(*owner).file.to_string()]);
            artifacts.push(self.artifact(ArtifactKind::Injector, file, origins));
        }

        if !errors.is_empty() {
            return Err(ProcessError::from_many(errors));
        }
        tracing::info!(
            target: "stubgen.processor",
            artifacts = artifacts.len(),
            "round complete"
        );
        Ok(artifacts)
    }

    /// Run a round and hand every artifact to `writer` once the round has succeeded.
    pub fn run_and_write<R, W>(
        &self,
        resolver: &R,
        writer: &mut W,
    ) -> Result<Vec<GeneratedArtifact>, ProcessError>
    where
        R: Resolver + ?Sized,
        W: ArtifactWriter + ?Sized,
    {
        let artifacts = self.run(resolver)?;
        for artifact in &artifacts {
            writer
                .write(artifact)
                .map_err(|source| ProcessError::Write {
                    path: artifact.relative_path().display().to_string(),
                    source,
                })?;
        }
        Ok(artifacts)
    }

    fn artifact(&self, kind: ArtifactKind, file: FileDef, origins: IndexSet<String>) -> GeneratedArtifact {
        let contents = render_file(&file, self.print);
        tracing::debug!(
            target: "stubgen.processor",
            package = %file.package,
            name = %file.name,
            bytes = contents.len(),
            "generated artifact"
        );
        GeneratedArtifact {
            kind,
            package: file.package,
            name: file.name,
            extension: GENERATED_EXTENSION.to_string(),
            contents,
            origins,
            aggregating: false,
        }
    }
}
