// YAML Document Serializer
// Compiles a pipeline tree into Azure DevOps YAML: the tree is first projected onto
// ordered nodes (validating as it goes) and only then rendered, so a failure yields no output

mod emitter;
mod project;
mod scalar;

use crate::config::SerializerConfig;
use crate::error::PipelineResult;
use crate::model::PipelineDocument;

use tracing::debug;

/// Serialize a document with the default configuration
pub fn to_yaml(document: &PipelineDocument) -> PipelineResult<String> {
    to_yaml_with(document, &SerializerConfig::default())
}

/// Serialize a document.
///
/// Returns the first structural error found, carrying the offending node's tree path.
pub fn to_yaml_with(document: &PipelineDocument, config: &SerializerConfig) -> PipelineResult<String> {
    let sections = project::project_document(document)?;
    let yaml = emitter::render(&sections, config);
    debug!(
        shape = document.shape(),
        sections = sections.len(),
        bytes = yaml.len(),
        "serialized pipeline document"
    );
    Ok(yaml)
}
