// Job definitions
// Jobs, agent pools, dependencies and execution strategies

use crate::condition::Condition;
use crate::model::{ListItem, Step, Variable};
use crate::value::OrderedMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Job identifier
    pub name: String,

    /// Display name in UI
    pub display_name: Option<String>,

    /// Dependency on other jobs
    pub depends_on: DependsOn,

    /// Runtime condition for running this job
    pub condition: Option<Condition>,

    /// Continue pipeline on error
    pub continue_on_error: bool,

    /// Job timeout
    pub timeout_in_minutes: Option<u32>,

    /// Cancel timeout
    pub cancel_timeout_in_minutes: Option<u32>,

    /// Execution strategy (matrix, parallel)
    pub strategy: Option<Strategy>,

    /// Agent pool for this job
    pub pool: Option<Pool>,

    /// Container image to run the job in
    pub container: Option<String>,

    /// Workspace cleaning
    pub workspace: Option<WorkspaceClean>,

    /// Job-level variables
    pub variables: Vec<ListItem<Variable>>,

    /// Steps to execute
    pub steps: Vec<ListItem<Step>>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            depends_on: DependsOn::Default,
            condition: None,
            continue_on_error: false,
            timeout_in_minutes: None,
            cancel_timeout_in_minutes: None,
            strategy: None,
            pool: None,
            container: None,
            workspace: None,
            variables: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_depends_on(mut self, depends_on: DependsOn) -> Self {
        self.depends_on = depends_on;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn with_timeout_in_minutes(mut self, minutes: u32) -> Self {
        self.timeout_in_minutes = Some(minutes);
        self
    }

    pub fn with_cancel_timeout_in_minutes(mut self, minutes: u32) -> Self {
        self.cancel_timeout_in_minutes = Some(minutes);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_pool(mut self, pool: impl Into<Pool>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn with_container(mut self, image: impl Into<String>) -> Self {
        self.container = Some(image.into());
        self
    }

    pub fn with_workspace(mut self, clean: WorkspaceClean) -> Self {
        self.workspace = Some(clean);
        self
    }

    pub fn with_variable(mut self, variable: impl Into<ListItem<Variable>>) -> Self {
        self.variables.push(variable.into());
        self
    }

    pub fn with_step(mut self, step: impl Into<ListItem<Step>>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ListItem<Step>>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }
}

// =============================================================================
// Pool
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Pool {
    /// Named pool: `pool: my-pool`
    Name(String),
    /// Full pool definition
    Hosted(HostedPool),
}

impl Pool {
    pub fn named(name: impl Into<String>) -> Self {
        Pool::Name(name.into())
    }
}

/// Pool selected by name and/or VM image
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostedPool {
    pub name: Option<String>,
    pub vm_image: Option<String>,
    pub demands: Vec<String>,
}

impl HostedPool {
    pub fn new(name: impl Into<String>, vm_image: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            vm_image: Some(vm_image.into()),
            demands: Vec::new(),
        }
    }

    /// Microsoft-hosted agent with the given image, e.g. `ubuntu-latest`
    pub fn vm_image(vm_image: impl Into<String>) -> Self {
        Self {
            name: None,
            vm_image: Some(vm_image.into()),
            demands: Vec::new(),
        }
    }

    pub fn with_demand(mut self, demand: impl Into<String>) -> Self {
        self.demands.push(demand.into());
        self
    }
}

impl From<HostedPool> for Pool {
    fn from(pool: HostedPool) -> Self {
        Pool::Hosted(pool)
    }
}

// =============================================================================
// DependsOn
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DependsOn {
    /// Not specified (depends on previous)
    #[default]
    Default,
    /// Explicitly no dependencies: `dependsOn: []`
    None,
    /// Single dependency
    Single(String),
    /// Multiple dependencies
    Multiple(Vec<String>),
}

impl DependsOn {
    pub fn on(name: impl Into<String>) -> Self {
        DependsOn::Single(name.into())
    }

    pub fn all<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DependsOn::Multiple(names.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Strategy / workspace
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Strategy {
    /// Matrix legs: leg name to its variables
    pub matrix: OrderedMap,

    /// Parallel jobs count
    pub parallel: Option<u32>,

    /// Maximum parallel jobs
    pub max_parallel: Option<u32>,
}

impl Strategy {
    pub fn matrix() -> Self {
        Self::default()
    }

    pub fn with_leg(mut self, name: impl Into<String>, variables: OrderedMap) -> Self {
        self.matrix.insert(name, variables);
        self
    }

    pub fn with_max_parallel(mut self, max_parallel: u32) -> Self {
        self.max_parallel = Some(max_parallel);
        self
    }

    pub fn parallel(count: u32) -> Self {
        Self {
            parallel: Some(count),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceClean {
    Outputs,
    Resources,
    All,
}

impl WorkspaceClean {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceClean::Outputs => "outputs",
            WorkspaceClean::Resources => "resources",
            WorkspaceClean::All => "all",
        }
    }
}
