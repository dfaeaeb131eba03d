//! Trait definition for platform builders.

use crate::writer::PlannedFile;
use crate::Result;
use std::path::Path;
use taptik_core::{
    ContextBuilder, FileSystem, PersonalData, Platform, ProjectData, PromptsData, TaptikContext,
    TaptikError, ToolsData, ValidationResult, ValidationWarning,
};
use taptik_validate::SizeLimits;
use tracing::{debug, info, warn};

/// Output of a builder's inverse mapping, plus anything it could not carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted<T> {
    pub data: T,
    pub warnings: Vec<String>,
}

impl<T> Converted<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }
}

pub type ConversionResult<T> = Result<Converted<T>>;

/// The platform-neutral sections a builder derives from its own payload.
///
/// Absent sections stay `None`; they are never defaulted to empty values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    pub project: Option<ProjectData>,
    pub prompts: Option<PromptsData>,
    pub tools: Option<ToolsData>,
    pub personal: Option<PersonalData>,
}

impl Sections {
    pub fn apply(self, builder: ContextBuilder) -> ContextBuilder {
        builder
            .project(self.project)
            .prompts(self.prompts)
            .tools(self.tools)
            .personal(self.personal)
    }
}

/// Reads one platform's project into a [`TaptikContext`] and back.
///
/// The stages are separate methods so the pipeline can record how far a run
/// got; [`build`](PlatformBuilder::build) composes them.
pub trait PlatformBuilder: Send + Sync {
    /// Platform payload as read from disk.
    type Raw: Clone + Send;

    fn platform(&self) -> Platform;

    fn fs(&self) -> &dyn FileSystem;

    fn limits(&self) -> &SizeLimits;

    /// Files or directories whose presence identifies the platform, relative to the root.
    fn markers(&self) -> &'static [&'static str];

    /// True when any marker exists. Filesystem errors count as "not detected".
    fn detect(&self, root: &Path) -> bool {
        self.markers().iter().any(|marker| {
            let path = root.join(marker);
            match self.fs().exists(&path) {
                Ok(found) => found,
                Err(err) => {
                    debug!(
                        platform = %self.platform(),
                        path = %path.display(),
                        error = %err,
                        "Treating unreadable marker as absent"
                    );
                    false
                }
            }
        })
    }

    /// Fails with [`TaptikError::NotAPlatformProject`] unless [`detect`](Self::detect) passes.
    fn require_detected(&self, root: &Path) -> Result<()> {
        if self.detect(root) {
            Ok(())
        } else {
            Err(TaptikError::NotAPlatformProject {
                platform: self.platform(),
                path: root.to_path_buf(),
            })
        }
    }

    /// Reads workspace and user-level sources and merges them.
    fn extract(&self, root: &Path) -> Result<Self::Raw>;

    /// Drops sub-records that cannot be carried (e.g. unnamed hooks), one warning each.
    fn sanitize(&self, raw: Self::Raw) -> (Self::Raw, Vec<ValidationWarning>);

    /// Pure mapping from the raw payload to a context. No I/O.
    fn normalize(&self, raw: &Self::Raw, name: &str) -> TaptikContext;

    /// Structural and security checks over the context's payload for this platform.
    fn validate(&self, context: &TaptikContext) -> ValidationResult;

    fn build(&self, root: &Path) -> Result<TaptikContext> {
        self.build_with_report(root).map(|(context, _)| context)
    }

    /// Like [`build`](Self::build), also returning the (valid) validation result.
    fn build_with_report(&self, root: &Path) -> Result<(TaptikContext, ValidationResult)> {
        let raw = self.extract(root)?;
        let (raw, dropped) = self.sanitize(raw);
        let context = self.normalize(&raw, &project_name(root));

        let mut validation = ValidationResult::new();
        for warning in dropped {
            validation.add_warning(warning);
        }
        validation.merge(self.validate(&context));

        if !validation.valid {
            return Err(TaptikError::ValidationFailed {
                platform: self.platform(),
                errors: validation.errors,
            });
        }
        for warning in &validation.warnings {
            warn!(platform = %self.platform(), field = %warning.field, "{}", warning.message);
        }
        info!(
            platform = %self.platform(),
            root = %root.display(),
            warnings = validation.warning_count(),
            "Built context"
        );
        Ok((context, validation))
    }

    /// Inverse mapping: the payload this platform's files should be rendered from.
    fn convert(&self, context: &TaptikContext) -> ConversionResult<Self::Raw>;

    /// Native files for `raw`, relative to the project root.
    ///
    /// Only sub-fields that are present produce files.
    fn render(&self, raw: &Self::Raw) -> Vec<PlannedFile>;
}

/// Context name for a project root: its last path component.
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("project")
        .to_string()
}
