// Pipeline Tree
// Typed Azure DevOps pipeline structure: stages, jobs, steps and variables,
// where any list position may hold a conditioned block, a template or a fragment

pub mod job;
pub mod pipeline;
pub mod stage;
pub mod step;
pub mod trigger;
pub mod variable;

pub use job::{DependsOn, HostedPool, Job, Pool, Strategy, WorkspaceClean};
pub use pipeline::{
    MultiStagePipeline, ParameterKind, PipelineDocument, SingleStagePipeline, Template,
    TemplateBody, TemplateParameter,
};
pub use stage::Stage;
pub use step::{
    CheckoutSource, CheckoutStep, DownloadStep, PowershellStep, PublishStep, ScriptStep, Step,
    StepAction, SubmoduleOption,
};
pub use trigger::{Filter, PrTrigger, PrTriggerConfig, Schedule, Trigger, TriggerConfig};
pub use variable::Variable;

use crate::conditioned::Conditioned;
use crate::value::{OrderedMap, Value};

use std::fmt;

/// The four kinds of items that pipeline lists hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Variable,
    Step,
    Job,
    Stage,
}

impl ItemKind {
    /// YAML key of a list of this kind
    pub fn list_key(&self) -> &'static str {
        match self {
            ItemKind::Variable => "variables",
            ItemKind::Step => "steps",
            ItemKind::Job => "jobs",
            ItemKind::Stage => "stages",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Variable => write!(f, "variable"),
            ItemKind::Step => write!(f, "step"),
            ItemKind::Job => write!(f, "job"),
            ItemKind::Stage => write!(f, "stage"),
        }
    }
}

/// A domain item type that can be listed in a pipeline
pub trait PipelineItem: Sized {
    const KIND: ItemKind;

    /// The items of a fragment, if the fragment holds this kind
    fn fragment_items(fragment: &Fragment) -> Option<&[ListItem<Self>]>;
}

/// One entry of a variables/steps/jobs/stages list
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem<T> {
    /// A plain item
    Item(T),
    /// `${{ if }}` / `${{ elseif }}` / `${{ else }}` block of items of the same kind
    Conditioned(Conditioned<T>),
    /// `- template: path` reference
    Template(TemplateReference),
    /// Pre-built items spliced in place
    Fragment(Fragment),
}

impl<T> From<Conditioned<T>> for ListItem<T> {
    fn from(block: Conditioned<T>) -> Self {
        ListItem::Conditioned(block)
    }
}

impl<T> From<TemplateReference> for ListItem<T> {
    fn from(template: TemplateReference) -> Self {
        ListItem::Template(template)
    }
}

impl<T> From<Fragment> for ListItem<T> {
    fn from(fragment: Fragment) -> Self {
        ListItem::Fragment(fragment)
    }
}

macro_rules! pipeline_item {
    ($ty:ident, $kind:ident, $variant:ident) => {
        impl PipelineItem for $ty {
            const KIND: ItemKind = ItemKind::$kind;

            fn fragment_items(fragment: &Fragment) -> Option<&[ListItem<Self>]> {
                match fragment {
                    Fragment::$variant(items) => Some(items.as_slice()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ListItem<$ty> {
            fn from(item: $ty) -> Self {
                ListItem::Item(item)
            }
        }
    };
}

pipeline_item!(Variable, Variable, Variables);
pipeline_item!(Step, Step, Steps);
pipeline_item!(Job, Job, Jobs);
pipeline_item!(Stage, Stage, Stages);

/// Collects anything convertible into list items
pub fn items<T, I, V>(values: I) -> Vec<ListItem<T>>
where
    I: IntoIterator<Item = V>,
    V: Into<ListItem<T>>,
{
    values.into_iter().map(Into::into).collect()
}

// =============================================================================
// Fragments
// =============================================================================

/// A pre-built run of items of one kind, e.g. the steps a task catalog expands to.
///
/// The kind is only checked when the fragment is serialized, so a fragment placed
/// in a list of another kind is reported as an unsupported item at that point.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Variables(Vec<ListItem<Variable>>),
    Steps(Vec<ListItem<Step>>),
    Jobs(Vec<ListItem<Job>>),
    Stages(Vec<ListItem<Stage>>),
}

impl Fragment {
    pub fn kind(&self) -> ItemKind {
        match self {
            Fragment::Variables(_) => ItemKind::Variable,
            Fragment::Steps(_) => ItemKind::Step,
            Fragment::Jobs(_) => ItemKind::Job,
            Fragment::Stages(_) => ItemKind::Stage,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Fragment::Variables(items) => items.len(),
            Fragment::Steps(items) => items.len(),
            Fragment::Jobs(items) => items.len(),
            Fragment::Stages(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Template references
// =============================================================================

/// `template: path` with its `parameters`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateReference {
    pub path: String,
    pub parameters: OrderedMap,
}

impl TemplateReference {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            parameters: OrderedMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_kind() {
        let fragment = Fragment::Stages(vec![Stage::new("Deploy").into()]);
        assert_eq!(fragment.kind(), ItemKind::Stage);
        assert_eq!(fragment.len(), 1);
        assert!(Step::fragment_items(&fragment).is_none());
        assert!(Stage::fragment_items(&fragment).is_some());
    }

    #[test]
    fn test_items_helper_converts() {
        let list: Vec<ListItem<Variable>> = items([
            Variable::new("a", "1"),
            Variable::group("shared"),
        ]);
        assert_eq!(list.len(), 2);
        assert!(matches!(list[1], ListItem::Item(Variable::Group(_))));
    }

    #[test]
    fn test_item_kind_list_key() {
        assert_eq!(ItemKind::Step.list_key(), "steps");
        assert_eq!(ItemKind::Stage.to_string(), "stage");
    }
}
