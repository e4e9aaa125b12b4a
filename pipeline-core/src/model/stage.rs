// Stage definitions

use crate::condition::Condition;
use crate::model::{DependsOn, Job, ListItem, Pool, Variable};

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Stage identifier
    pub name: String,

    /// Display name in UI
    pub display_name: Option<String>,

    /// Dependency on other stages
    pub depends_on: DependsOn,

    /// Runtime condition for running this stage
    pub condition: Option<Condition>,

    /// Pool override for all jobs
    pub pool: Option<Pool>,

    /// Stage-level variables
    pub variables: Vec<ListItem<Variable>>,

    /// Jobs in this stage
    pub jobs: Vec<ListItem<Job>>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            depends_on: DependsOn::Default,
            condition: None,
            pool: None,
            variables: Vec::new(),
            jobs: Vec::new(),
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

    pub fn with_pool(mut self, pool: impl Into<Pool>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn with_variable(mut self, variable: impl Into<ListItem<Variable>>) -> Self {
        self.variables.push(variable.into());
        self
    }

    pub fn with_job(mut self, job: impl Into<ListItem<Job>>) -> Self {
        self.jobs.push(job.into());
        self
    }
}
