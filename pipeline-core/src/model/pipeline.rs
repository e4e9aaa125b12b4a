// Pipeline documents
// The closed set of document shapes: single-stage, multi-stage and template files

use crate::config::SerializerConfig;
use crate::error::PipelineResult;
use crate::model::{Job, ListItem, Pool, PrTrigger, Schedule, Stage, Step, Trigger, Variable};
use crate::serializer;
use crate::value::{ParameterReference, Value};

// =============================================================================
// Parameters
// =============================================================================

/// Declaration of a pipeline or template parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
    pub name: String,
    pub display_name: Option<String>,
    pub kind: ParameterKind,
    pub default: Option<Value>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterKind {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    Step,
    StepList,
    Job,
    JobList,
    Stage,
    StageList,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Number => "number",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Object => "object",
            ParameterKind::Step => "step",
            ParameterKind::StepList => "stepList",
            ParameterKind::Job => "job",
            ParameterKind::JobList => "jobList",
            ParameterKind::Stage => "stage",
            ParameterKind::StageList => "stageList",
        }
    }
}

impl TemplateParameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            kind,
            default: None,
            values: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::String)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Boolean)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_allowed_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Reference to this parameter for use in values and conditions
    pub fn reference(&self) -> PipelineResult<ParameterReference> {
        ParameterReference::new(self.name.clone())
    }
}

// =============================================================================
// Document shapes
// =============================================================================

/// Pipeline whose jobs run in one implicit stage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SingleStagePipeline {
    pub name: Option<String>,
    pub trigger: Option<Trigger>,
    pub pr: Option<PrTrigger>,
    pub schedules: Vec<Schedule>,
    pub parameters: Vec<TemplateParameter>,
    pub variables: Vec<ListItem<Variable>>,
    pub pool: Option<Pool>,
    pub jobs: Vec<ListItem<Job>>,
}

/// Pipeline made of explicit stages
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiStagePipeline {
    pub name: Option<String>,
    pub trigger: Option<Trigger>,
    pub pr: Option<PrTrigger>,
    pub schedules: Vec<Schedule>,
    pub parameters: Vec<TemplateParameter>,
    pub variables: Vec<ListItem<Variable>>,
    pub pool: Option<Pool>,
    pub stages: Vec<ListItem<Stage>>,
}

/// Template file: declared parameters plus one list of items
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub parameters: Vec<TemplateParameter>,
    pub body: TemplateBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateBody {
    Steps(Vec<ListItem<Step>>),
    Jobs(Vec<ListItem<Job>>),
    Stages(Vec<ListItem<Stage>>),
    Variables(Vec<ListItem<Variable>>),
}

impl Template {
    pub fn steps(steps: Vec<ListItem<Step>>) -> Self {
        Self {
            parameters: Vec::new(),
            body: TemplateBody::Steps(steps),
        }
    }

    pub fn jobs(jobs: Vec<ListItem<Job>>) -> Self {
        Self {
            parameters: Vec::new(),
            body: TemplateBody::Jobs(jobs),
        }
    }

    pub fn stages(stages: Vec<ListItem<Stage>>) -> Self {
        Self {
            parameters: Vec::new(),
            body: TemplateBody::Stages(stages),
        }
    }

    pub fn variables(variables: Vec<ListItem<Variable>>) -> Self {
        Self {
            parameters: Vec::new(),
            body: TemplateBody::Variables(variables),
        }
    }

    pub fn with_parameter(mut self, parameter: TemplateParameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// Root of every serializable document. Each shape owns its top-level key order.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineDocument {
    SingleStage(SingleStagePipeline),
    MultiStage(MultiStagePipeline),
    Template(Template),
}

impl PipelineDocument {
    /// Short name of the document shape, for logs
    pub fn shape(&self) -> &'static str {
        match self {
            PipelineDocument::SingleStage(_) => "single-stage",
            PipelineDocument::MultiStage(_) => "multi-stage",
            PipelineDocument::Template(t) => match t.body {
                TemplateBody::Steps(_) => "step-template",
                TemplateBody::Jobs(_) => "job-template",
                TemplateBody::Stages(_) => "stage-template",
                TemplateBody::Variables(_) => "variable-template",
            },
        }
    }

    /// Serialize with the default configuration
    pub fn to_yaml(&self) -> PipelineResult<String> {
        serializer::to_yaml(self)
    }

    pub fn to_yaml_with(&self, config: &SerializerConfig) -> PipelineResult<String> {
        serializer::to_yaml_with(self, config)
    }
}

impl From<SingleStagePipeline> for PipelineDocument {
    fn from(pipeline: SingleStagePipeline) -> Self {
        PipelineDocument::SingleStage(pipeline)
    }
}

impl From<MultiStagePipeline> for PipelineDocument {
    fn from(pipeline: MultiStagePipeline) -> Self {
        PipelineDocument::MultiStage(pipeline)
    }
}

impl From<Template> for PipelineDocument {
    fn from(template: Template) -> Self {
        PipelineDocument::Template(template)
    }
}
