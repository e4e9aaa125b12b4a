// Step definitions
// Common step settings plus the action a step performs (task, script, checkout, ...)

use crate::condition::Condition;
use crate::value::{OrderedMap, Scalar, Value};

/// A single step of a job
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The action to perform
    pub action: StepAction,

    /// Display name in UI
    pub display_name: Option<String>,

    /// Step name for output references
    pub name: Option<String>,

    /// Runtime condition for running this step
    pub condition: Option<Condition>,

    /// Continue job on step failure
    pub continue_on_error: bool,

    /// Enable/disable step
    pub enabled: bool,

    /// Step timeout
    pub timeout_in_minutes: Option<u32>,

    /// Retry count on failure
    pub retry_count_on_task_failure: Option<u32>,

    /// Task inputs; only valid on task steps
    pub inputs: OrderedMap,

    /// Step-level environment variables
    pub env: OrderedMap,
}

/// The specific action a step performs
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// `- task: Name@Version`
    Task(String),
    /// `- script: ...`
    Script(ScriptStep),
    /// `- bash: ...`
    Bash(ScriptStep),
    /// PowerShell Core: `- pwsh: ...`
    Pwsh(PowershellStep),
    /// Windows PowerShell: `- powershell: ...`
    Powershell(PowershellStep),
    /// `- checkout: self`
    Checkout(CheckoutStep),
    /// `- download: current`
    Download(DownloadStep),
    /// `- publish: path`
    Publish(PublishStep),
}

impl StepAction {
    /// YAML key that introduces the step
    pub fn key(&self) -> &'static str {
        match self {
            StepAction::Task(_) => "task",
            StepAction::Script(_) => "script",
            StepAction::Bash(_) => "bash",
            StepAction::Pwsh(_) => "pwsh",
            StepAction::Powershell(_) => "powershell",
            StepAction::Checkout(_) => "checkout",
            StepAction::Download(_) => "download",
            StepAction::Publish(_) => "publish",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptStep {
    pub contents: String,
    pub working_directory: Option<String>,
    pub fail_on_stderr: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PowershellStep {
    pub contents: String,
    pub working_directory: Option<String>,
    pub fail_on_stderr: bool,
    pub error_action_preference: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutStep {
    pub source: CheckoutSource,
    pub clean: Option<bool>,
    pub fetch_depth: Option<u32>,
    pub lfs: Option<bool>,
    pub submodules: Option<SubmoduleOption>,
    pub path: Option<String>,
    pub persist_credentials: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutSource {
    /// checkout: self
    SelfRepo,
    /// checkout: none
    None,
    /// checkout: repository-name
    Repository(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleOption {
    True,
    Recursive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadStep {
    /// `current`, `none` or a pipeline resource name
    pub source: String,
    pub artifact: Option<String>,
    pub patterns: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishStep {
    pub path: String,
    pub artifact: Option<String>,
}

impl Step {
    pub fn new(action: StepAction) -> Self {
        Self {
            action,
            display_name: None,
            name: None,
            condition: None,
            continue_on_error: false,
            enabled: true,
            timeout_in_minutes: None,
            retry_count_on_task_failure: None,
            inputs: OrderedMap::new(),
            env: OrderedMap::new(),
        }
    }

    pub fn task(name: impl Into<String>) -> Self {
        Self::new(StepAction::Task(name.into()))
    }

    pub fn script(contents: impl Into<String>) -> Self {
        Self::new(StepAction::Script(ScriptStep {
            contents: contents.into(),
            ..Default::default()
        }))
    }

    pub fn bash(contents: impl Into<String>) -> Self {
        Self::new(StepAction::Bash(ScriptStep {
            contents: contents.into(),
            ..Default::default()
        }))
    }

    pub fn pwsh(contents: impl Into<String>) -> Self {
        Self::new(StepAction::Pwsh(PowershellStep {
            contents: contents.into(),
            ..Default::default()
        }))
    }

    pub fn powershell(contents: impl Into<String>) -> Self {
        Self::new(StepAction::Powershell(PowershellStep {
            contents: contents.into(),
            ..Default::default()
        }))
    }

    pub fn checkout(source: CheckoutSource) -> Self {
        Self::new(StepAction::Checkout(CheckoutStep::new(source)))
    }

    pub fn download(source: impl Into<String>) -> Self {
        Self::new(StepAction::Download(DownloadStep {
            source: source.into(),
            artifact: None,
            patterns: None,
            path: None,
        }))
    }

    pub fn publish(path: impl Into<String>, artifact: Option<String>) -> Self {
        Self::new(StepAction::Publish(PublishStep {
            path: path.into(),
            artifact,
        }))
    }

    /// `UseDotNet@2` installing the given SDK version
    pub fn use_dotnet_sdk(version: impl Into<Scalar>) -> Self {
        Self::task("UseDotNet@2")
            .with_input("packageType", "sdk")
            .with_input("version", Value::Scalar(version.into()))
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_timeout_in_minutes(mut self, minutes: u32) -> Self {
        self.timeout_in_minutes = Some(minutes);
        self
    }

    pub fn with_retry_count(mut self, retries: u32) -> Self {
        self.retry_count_on_task_failure = Some(retries);
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name, value);
        self
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.env.insert(name, value);
        self
    }

    /// Sets the working directory of script-like steps; other actions are unchanged
    pub fn with_working_directory(mut self, directory: impl Into<String>) -> Self {
        let directory = Some(directory.into());
        match &mut self.action {
            StepAction::Script(s) | StepAction::Bash(s) => s.working_directory = directory,
            StepAction::Pwsh(s) | StepAction::Powershell(s) => s.working_directory = directory,
            _ => {}
        }
        self
    }

    /// Fails script-like steps that write to stderr; other actions are unchanged
    pub fn fail_on_stderr(mut self) -> Self {
        match &mut self.action {
            StepAction::Script(s) | StepAction::Bash(s) => s.fail_on_stderr = true,
            StepAction::Pwsh(s) | StepAction::Powershell(s) => s.fail_on_stderr = true,
            _ => {}
        }
        self
    }
}

impl CheckoutStep {
    pub fn new(source: CheckoutSource) -> Self {
        Self {
            source,
            clean: None,
            fetch_depth: None,
            lfs: None,
            submodules: None,
            path: None,
            persist_credentials: None,
        }
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = Some(clean);
        self
    }

    pub fn with_fetch_depth(mut self, depth: u32) -> Self {
        self.fetch_depth = Some(depth);
        self
    }

    pub fn with_submodules(mut self, submodules: SubmoduleOption) -> Self {
        self.submodules = Some(submodules);
        self
    }
}

impl From<CheckoutStep> for Step {
    fn from(checkout: CheckoutStep) -> Self {
        Step::new(StepAction::Checkout(checkout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_dotnet_sdk_inputs() {
        let step = Step::use_dotnet_sdk(Scalar::variable("DotnetVersion"));
        assert_eq!(step.action, StepAction::Task("UseDotNet@2".to_string()));
        assert_eq!(step.inputs.keys().collect::<Vec<_>>(), vec!["packageType", "version"]);
    }

    #[test]
    fn test_working_directory_only_touches_scripts() {
        let script = Step::bash("make").with_working_directory("src");
        match script.action {
            StepAction::Bash(s) => assert_eq!(s.working_directory.as_deref(), Some("src")),
            other => panic!("unexpected action {:?}", other),
        }

        let task = Step::task("Npm@1").with_working_directory("src");
        assert_eq!(task.action, StepAction::Task("Npm@1".to_string()));
    }

    #[test]
    fn test_step_defaults() {
        let step = Step::script("echo hi");
        assert!(step.enabled);
        assert!(!step.continue_on_error);
        assert_eq!(step.action.key(), "script");
    }
}
