// Pipeline Core Library
// Typed Azure DevOps pipeline model compiled to YAML, with first-class ${{ if }} blocks

pub mod codegen;
pub mod condition;
pub mod conditioned;
pub mod config;
pub mod error;
pub mod model;
pub mod parameters;
pub mod publish;
pub mod serializer;
pub mod utils;
pub mod value;

// Re-export commonly used types
pub use condition::{Condition, Operand};
pub use conditioned::{Branch, ConditionBuilder, Conditioned, ElseBuilder};
pub use config::{ConfigError, PublishConfig, SerializerConfig};
pub use error::{PipelineError, PipelineResult};
pub use value::{OrderedMap, ParameterReference, Scalar, Value};

// Re-export tree types
pub use model::{
    items, Fragment, ItemKind, Job, ListItem, MultiStagePipeline, PipelineDocument, PipelineItem,
    SingleStagePipeline, Stage, Step, Template, TemplateReference, Variable,
};

// Re-export generation and publishing types
pub use codegen::render_accessors;
pub use parameters::{Accessor, AccessorGroup, MemberKind, MemberSchema, ParametersSchema, RecordSchema};
pub use publish::{
    FileSink, OutputSink, PipelineDefinition, PublishError, PublishOutcome, Publisher, Target,
    TargetPathType,
};

/// Everything needed to write pipeline definitions, including the block builder traits
pub mod prelude {
    pub use crate::condition::{Condition, Operand};
    pub use crate::conditioned::{BranchBuilder, JobBranch, StageBranch, StepBranch, VariableBranch};
    pub use crate::model::*;
    pub use crate::publish::{PipelineDefinition, TargetPathType};
    pub use crate::value::{OrderedMap, ParameterReference, Scalar, Value};
    pub use crate::{PipelineError, PipelineResult};
}
