// Publishing
// Writes serialized pipeline definitions to their target files through an output sink

use crate::config::PublishConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::model::PipelineDocument;
use crate::serializer;
use crate::utils::find_repo_root;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while publishing
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Serialization failed: {0}")]
    Serialize(#[from] PipelineError),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No git repository found above {}", .0.display())]
    RepositoryRootNotFound(PathBuf),

    #[error("{} is out of date; regenerate it", path.display())]
    Stale { path: PathBuf },
}

impl PublishError {
    fn io(path: &Path, source: io::Error) -> Self {
        PublishError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// =============================================================================
// Targets and sinks
// =============================================================================

/// How a target path is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetPathType {
    /// Relative to the root of the enclosing git repository
    #[default]
    RelativeToGitRoot,
    /// Relative to the directory of the caller
    RelativeToCaller,
}

/// Destination of one generated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub path_type: TargetPathType,
}

impl Target {
    pub fn new(path: impl Into<PathBuf>, path_type: TargetPathType) -> Self {
        Self {
            path: path.into(),
            path_type,
        }
    }
}

/// Destination for generated YAML
pub trait OutputSink {
    /// Current contents of the target, `None` if it does not exist yet
    fn read(&self, target: &Target) -> Result<Option<String>, PublishError>;

    /// Replaces the target's contents in a single write
    fn write(&self, target: &Target, contents: &str) -> Result<(), PublishError>;

    /// Where the target lives, for messages
    fn describe(&self, target: &Target) -> PathBuf {
        target.path.clone()
    }
}

/// Filesystem sink writing through a temp file in the target directory
#[derive(Debug, Clone)]
pub struct FileSink {
    caller_dir: PathBuf,
}

impl FileSink {
    pub fn new(caller_dir: impl Into<PathBuf>) -> Self {
        Self {
            caller_dir: caller_dir.into(),
        }
    }

    pub fn resolve(&self, target: &Target) -> Result<PathBuf, PublishError> {
        let base = match target.path_type {
            TargetPathType::RelativeToCaller => self.caller_dir.clone(),
            TargetPathType::RelativeToGitRoot => find_repo_root(&self.caller_dir)
                .ok_or_else(|| PublishError::RepositoryRootNotFound(self.caller_dir.clone()))?,
        };
        Ok(base.join(&target.path))
    }
}

impl OutputSink for FileSink {
    fn read(&self, target: &Target) -> Result<Option<String>, PublishError> {
        let path = self.resolve(target)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PublishError::io(&path, e)),
        }
    }

    fn write(&self, target: &Target, contents: &str) -> Result<(), PublishError> {
        let path = self.resolve(target)?;
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| PublishError::io(dir, e))?;

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| PublishError::io(dir, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| PublishError::io(file.path(), e))?;
        file.persist(&path)
            .map_err(|e| PublishError::io(&path, e.error))?;
        Ok(())
    }

    fn describe(&self, target: &Target) -> PathBuf {
        self.resolve(target).unwrap_or_else(|_| target.path.clone())
    }
}

// =============================================================================
// Definitions and publisher
// =============================================================================

/// A pipeline definition that knows where its YAML belongs
pub trait PipelineDefinition {
    /// Target file, e.g. `.azure/pipelines/build.yml`
    fn target_file(&self) -> PathBuf;

    fn target_path_type(&self) -> TargetPathType {
        TargetPathType::RelativeToGitRoot
    }

    /// Builds the document; fails when a parameter reference is malformed
    fn document(&self) -> PipelineResult<PipelineDocument>;

    fn target(&self) -> Target {
        Target::new(self.target_file(), self.target_path_type())
    }
}

/// Result of publishing one definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Written,
    Unchanged,
}

/// Serializes definitions and writes them to a sink when their YAML changed
pub struct Publisher<S: OutputSink> {
    sink: S,
    config: PublishConfig,
}

impl<S: OutputSink> Publisher<S> {
    pub fn new(sink: S, config: PublishConfig) -> Self {
        Self { sink, config }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn publish(&self, definition: &dyn PipelineDefinition) -> Result<PublishOutcome, PublishError> {
        let document = definition.document()?;
        self.publish_document(&definition.target(), &document)
    }

    /// Publishes every definition, stopping at the first failure
    pub fn publish_all<'a, I>(&self, definitions: I) -> Result<Vec<PublishOutcome>, PublishError>
    where
        I: IntoIterator<Item = &'a dyn PipelineDefinition>,
    {
        definitions
            .into_iter()
            .map(|definition| self.publish(definition))
            .collect()
    }

    pub fn publish_document(
        &self,
        target: &Target,
        document: &PipelineDocument,
    ) -> Result<PublishOutcome, PublishError> {
        let yaml = serializer::to_yaml_with(document, &self.config.serializer)?;
        let location = self.sink.describe(target);

        if self.sink.read(target)?.as_deref() == Some(yaml.as_str()) {
            info!(path = %location.display(), "pipeline definition unchanged");
            return Ok(PublishOutcome::Unchanged);
        }

        if self.config.fail_if_changed {
            warn!(path = %location.display(), "pipeline definition is out of date");
            return Err(PublishError::Stale { path: location });
        }

        self.sink.write(target, &yaml)?;
        info!(path = %location.display(), bytes = yaml.len(), "wrote pipeline definition");
        Ok(PublishOutcome::Written)
    }
}
