// Schema projection
// Maps the typed pipeline tree onto ordered YAML nodes using Azure DevOps key names,
// validating required fields and tracking the tree path of every node

use crate::conditioned::Conditioned;
use crate::error::{PipelineError, PipelineResult};
use crate::model::{
    CheckoutSource, DependsOn, Filter, Job, ListItem, MultiStagePipeline, PipelineDocument,
    PipelineItem, Pool, PrTrigger, Schedule, SingleStagePipeline, Stage, Step, StepAction,
    Strategy, SubmoduleOption, Template, TemplateBody, TemplateParameter, TemplateReference,
    Trigger, Variable,
};
use crate::value::{OrderedMap, Scalar, Value};

/// YAML node in emission order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Scalar(Scalar),
    Seq(Vec<Node>),
    Map(Vec<(String, Node)>),
}

impl Node {
    fn text(text: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(text.into()))
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Scalar(scalar) => Node::Scalar(scalar.clone()),
            Value::Sequence(items) => Node::Seq(items.iter().map(Node::from).collect()),
            Value::Map(map) => map_node(map),
        }
    }
}

fn map_node(map: &OrderedMap) -> Node {
    Node::Map(
        map.iter()
            .map(|(key, value)| (key.to_string(), Node::from(value)))
            .collect(),
    )
}

/// Collects mapping entries, skipping absent optional fields
#[derive(Default)]
struct Entries(Vec<(String, Node)>);

impl Entries {
    fn node(mut self, key: &str, node: Node) -> Self {
        self.0.push((key.to_string(), node));
        self
    }

    fn text(self, key: &str, value: &str) -> Self {
        self.node(key, Node::text(value))
    }

    fn opt_text(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.text(key, value),
            None => self,
        }
    }

    fn opt_node(self, key: &str, node: Option<Node>) -> Self {
        match node {
            Some(node) => self.node(key, node),
            None => self,
        }
    }

    fn opt_bool(self, key: &str, value: Option<bool>) -> Self {
        self.opt_node(key, value.map(|b| Node::Scalar(Scalar::Bool(b))))
    }

    /// Emits `key: true` only when set
    fn flag(self, key: &str, value: bool) -> Self {
        if value {
            self.node(key, Node::Scalar(Scalar::Bool(true)))
        } else {
            self
        }
    }

    fn opt_number(self, key: &str, value: Option<u32>) -> Self {
        self.opt_node(key, value.map(|n| Node::Scalar(Scalar::Integer(n.into()))))
    }

    fn map(self, key: &str, map: &OrderedMap) -> Self {
        if map.is_empty() {
            self
        } else {
            self.node(key, map_node(map))
        }
    }

    fn seq(self, key: &str, items: Vec<Node>) -> Self {
        if items.is_empty() {
            self
        } else {
            self.node(key, Node::Seq(items))
        }
    }

    fn into_node(self) -> Node {
        Node::Map(self.0)
    }
}

fn require(path: &str, value: &str, message: &str) -> PipelineResult<()> {
    if value.trim().is_empty() {
        Err(PipelineError::schema_violation(path, message))
    } else {
        Ok(())
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Projects a document into its ordered top-level sections
pub(crate) fn project_document(document: &PipelineDocument) -> PipelineResult<Vec<(String, Node)>> {
    match document {
        PipelineDocument::SingleStage(pipeline) => project_single_stage(pipeline),
        PipelineDocument::MultiStage(pipeline) => project_multi_stage(pipeline),
        PipelineDocument::Template(template) => project_template(template),
    }
}

struct Header<'a> {
    name: Option<&'a str>,
    trigger: Option<&'a Trigger>,
    pr: Option<&'a PrTrigger>,
    schedules: &'a [Schedule],
    parameters: &'a [TemplateParameter],
    variables: &'a [ListItem<Variable>],
    pool: Option<&'a Pool>,
}

fn project_header(header: Header<'_>) -> PipelineResult<Entries> {
    let mut entries = Entries::default().opt_text("name", header.name);
    if let Some(trigger) = header.trigger {
        entries = entries.node("trigger", project_trigger(trigger));
    }
    if let Some(pr) = header.pr {
        entries = entries.node("pr", project_pr(pr));
    }

    let schedules = header
        .schedules
        .iter()
        .enumerate()
        .map(|(i, schedule)| project_schedule(schedule, &format!("schedules[{}]", i)))
        .collect::<PipelineResult<Vec<_>>>()?;

    let entries = entries
        .seq("schedules", schedules)
        .seq("parameters", project_parameters(header.parameters)?)
        .seq("variables", project_list(header.variables, "variables")?);

    Ok(match header.pool {
        Some(pool) => entries.node("pool", project_pool(pool, "pool")?),
        None => entries,
    })
}

fn project_single_stage(pipeline: &SingleStagePipeline) -> PipelineResult<Vec<(String, Node)>> {
    if pipeline.jobs.is_empty() {
        return Err(PipelineError::schema_violation("jobs", "pipeline has no jobs"));
    }
    let entries = project_header(Header {
        name: pipeline.name.as_deref(),
        trigger: pipeline.trigger.as_ref(),
        pr: pipeline.pr.as_ref(),
        schedules: &pipeline.schedules,
        parameters: &pipeline.parameters,
        variables: &pipeline.variables,
        pool: pipeline.pool.as_ref(),
    })?
    .node("jobs", Node::Seq(project_list(&pipeline.jobs, "jobs")?));
    Ok(entries.0)
}

fn project_multi_stage(pipeline: &MultiStagePipeline) -> PipelineResult<Vec<(String, Node)>> {
    if pipeline.stages.is_empty() {
        return Err(PipelineError::schema_violation("stages", "pipeline has no stages"));
    }
    let entries = project_header(Header {
        name: pipeline.name.as_deref(),
        trigger: pipeline.trigger.as_ref(),
        pr: pipeline.pr.as_ref(),
        schedules: &pipeline.schedules,
        parameters: &pipeline.parameters,
        variables: &pipeline.variables,
        pool: pipeline.pool.as_ref(),
    })?
    .node("stages", Node::Seq(project_list(&pipeline.stages, "stages")?));
    Ok(entries.0)
}

fn project_template(template: &Template) -> PipelineResult<Vec<(String, Node)>> {
    let entries = Entries::default().seq("parameters", project_parameters(&template.parameters)?);
    let entries = match &template.body {
        TemplateBody::Steps(items) => entries.node("steps", Node::Seq(project_list(items, "steps")?)),
        TemplateBody::Jobs(items) => entries.node("jobs", Node::Seq(project_list(items, "jobs")?)),
        TemplateBody::Stages(items) => {
            entries.node("stages", Node::Seq(project_list(items, "stages")?))
        }
        TemplateBody::Variables(items) => {
            entries.node("variables", Node::Seq(project_list(items, "variables")?))
        }
    };
    Ok(entries.0)
}

fn project_parameters(parameters: &[TemplateParameter]) -> PipelineResult<Vec<Node>> {
    parameters
        .iter()
        .enumerate()
        .map(|(i, parameter)| {
            let path = format!("parameters[{}]", i);
            require(&path, &parameter.name, "parameter name is empty")?;
            Ok(Entries::default()
                .text("name", &parameter.name)
                .opt_text("displayName", parameter.display_name.as_deref())
                .text("type", parameter.kind.as_str())
                .opt_node("default", parameter.default.as_ref().map(Node::from))
                .seq("values", parameter.values.iter().map(Node::from).collect())
                .into_node())
        })
        .collect()
}

// =============================================================================
// Triggers
// =============================================================================

fn project_filter(filter: &Filter) -> Node {
    let text_seq = |items: &[String]| -> Vec<Node> {
        items.iter().map(|s| Node::text(s.as_str())).collect()
    };
    Entries::default()
        .seq("include", text_seq(&filter.include))
        .seq("exclude", text_seq(&filter.exclude))
        .into_node()
}

fn project_trigger(trigger: &Trigger) -> Node {
    match trigger {
        Trigger::None => Node::text("none"),
        Trigger::Config(config) => Entries::default()
            .opt_bool("batch", config.batch)
            .opt_node("branches", config.branches.as_ref().map(project_filter))
            .opt_node("paths", config.paths.as_ref().map(project_filter))
            .opt_node("tags", config.tags.as_ref().map(project_filter))
            .into_node(),
    }
}

fn project_pr(pr: &PrTrigger) -> Node {
    match pr {
        PrTrigger::None => Node::text("none"),
        PrTrigger::Config(config) => Entries::default()
            .opt_bool("autoCancel", config.auto_cancel)
            .opt_node("branches", config.branches.as_ref().map(project_filter))
            .opt_node("paths", config.paths.as_ref().map(project_filter))
            .opt_bool("drafts", config.drafts)
            .into_node(),
    }
}

fn project_schedule(schedule: &Schedule, path: &str) -> PipelineResult<Node> {
    require(path, &schedule.cron, "schedule cron expression is empty")?;
    Ok(Entries::default()
        .text("cron", &schedule.cron)
        .opt_text("displayName", schedule.display_name.as_deref())
        .node("branches", project_filter(&schedule.branches))
        .flag("always", schedule.always)
        .flag("batch", schedule.batch)
        .into_node())
}

// =============================================================================
// Lists and conditioned blocks
// =============================================================================

/// Per-kind projection of a plain list item
pub(crate) trait Project: PipelineItem {
    fn project(&self, path: &str) -> PipelineResult<Node>;
}

/// Projects a list; `path` names the list and each entry appends its declared index
pub(crate) fn project_list<T: Project>(items: &[ListItem<T>], path: &str) -> PipelineResult<Vec<Node>> {
    let mut nodes = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        project_list_item(item, &format!("{}[{}]", path, i), &mut nodes)?;
    }
    Ok(nodes)
}

fn project_list_item<T: Project>(
    item: &ListItem<T>,
    path: &str,
    nodes: &mut Vec<Node>,
) -> PipelineResult<()> {
    match item {
        ListItem::Item(item) => nodes.push(item.project(path)?),
        ListItem::Conditioned(block) => nodes.extend(project_conditioned(block, path)?),
        ListItem::Template(template) => nodes.push(project_template_reference(template, path)?),
        ListItem::Fragment(fragment) => {
            let items = T::fragment_items(fragment).ok_or_else(|| {
                PipelineError::unsupported_item(
                    path,
                    format!(
                        "a {} fragment cannot be placed in a {} list",
                        fragment.kind(),
                        T::KIND.list_key()
                    ),
                )
            })?;
            // Spliced in place
            for (j, item) in items.iter().enumerate() {
                project_list_item(item, &format!("{}.fragment[{}]", path, j), nodes)?;
            }
        }
    }
    Ok(())
}

/// One single-key mapping per branch, in declared order
fn project_conditioned<T: Project>(block: &Conditioned<T>, path: &str) -> PipelineResult<Vec<Node>> {
    let mut nodes = Vec::with_capacity(block.branch_count());

    let key = format!("${{{{ if {} }}}}", block.condition());
    let items = project_list(block.items(), &format!("{}.if", path))?;
    nodes.push(Node::Map(vec![(key, Node::Seq(items))]));

    for (k, branch) in block.else_ifs().iter().enumerate() {
        let key = format!("${{{{ elseif {} }}}}", branch.condition);
        let items = project_list(&branch.items, &format!("{}.elseif[{}]", path, k))?;
        nodes.push(Node::Map(vec![(key, Node::Seq(items))]));
    }

    if let Some(else_items) = block.else_items() {
        let items = project_list(else_items, &format!("{}.else", path))?;
        nodes.push(Node::Map(vec![("${{ else }}".to_string(), Node::Seq(items))]));
    }

    Ok(nodes)
}

fn project_template_reference(template: &TemplateReference, path: &str) -> PipelineResult<Node> {
    require(path, &template.path, "template path is empty")?;
    Ok(Entries::default()
        .text("template", &template.path)
        .map("parameters", &template.parameters)
        .into_node())
}

// =============================================================================
// Items
// =============================================================================

impl Project for Variable {
    fn project(&self, path: &str) -> PipelineResult<Node> {
        match self {
            Variable::Value {
                name,
                value,
                readonly,
            } => {
                require(path, name, "variable name is empty")?;
                Ok(Entries::default()
                    .text("name", name)
                    .node("value", Node::Scalar(value.clone()))
                    .flag("readonly", *readonly)
                    .into_node())
            }
            Variable::Group(group) => {
                require(path, group, "variable group name is empty")?;
                Ok(Entries::default().text("group", group).into_node())
            }
        }
    }
}

impl Project for Step {
    fn project(&self, path: &str) -> PipelineResult<Node> {
        let action = match &self.action {
            StepAction::Task(name) => {
                require(path, name, "task name is empty")?;
                Node::text(name.as_str())
            }
            StepAction::Script(script) | StepAction::Bash(script) => {
                require(path, &script.contents, "script body is empty")?;
                Node::text(script.contents.as_str())
            }
            StepAction::Pwsh(script) | StepAction::Powershell(script) => {
                require(path, &script.contents, "script body is empty")?;
                Node::text(script.contents.as_str())
            }
            StepAction::Checkout(checkout) => match &checkout.source {
                CheckoutSource::SelfRepo => Node::text("self"),
                CheckoutSource::None => Node::text("none"),
                CheckoutSource::Repository(repository) => {
                    require(path, repository, "checkout repository is empty")?;
                    Node::text(repository.as_str())
                }
            },
            StepAction::Download(download) => {
                require(path, &download.source, "download source is empty")?;
                Node::text(download.source.as_str())
            }
            StepAction::Publish(publish) => {
                require(path, &publish.path, "publish path is empty")?;
                Node::text(publish.path.as_str())
            }
        };

        if !self.inputs.is_empty() && !matches!(self.action, StepAction::Task(_)) {
            return Err(PipelineError::schema_violation(
                path,
                format!("inputs are only valid on task steps, not '{}'", self.action.key()),
            ));
        }

        let entries = Entries::default()
            .node(self.action.key(), action)
            .opt_text("displayName", self.display_name.as_deref())
            .opt_text("name", self.name.as_deref())
            .opt_text("condition", self.condition.as_ref().map(|c| c.as_str()))
            .flag("continueOnError", self.continue_on_error)
            .opt_bool("enabled", (!self.enabled).then_some(false))
            .opt_number("timeoutInMinutes", self.timeout_in_minutes)
            .opt_number("retryCountOnTaskFailure", self.retry_count_on_task_failure)
            .map("inputs", &self.inputs);

        let entries = match &self.action {
            StepAction::Task(_) => entries,
            StepAction::Script(script) | StepAction::Bash(script) => entries
                .opt_text("workingDirectory", script.working_directory.as_deref())
                .flag("failOnStderr", script.fail_on_stderr),
            StepAction::Pwsh(script) | StepAction::Powershell(script) => entries
                .opt_text("workingDirectory", script.working_directory.as_deref())
                .flag("failOnStderr", script.fail_on_stderr)
                .opt_text("errorActionPreference", script.error_action_preference.as_deref()),
            StepAction::Checkout(checkout) => entries
                .opt_bool("clean", checkout.clean)
                .opt_number("fetchDepth", checkout.fetch_depth)
                .opt_bool("lfs", checkout.lfs)
                .opt_node(
                    "submodules",
                    checkout.submodules.map(|option| match option {
                        SubmoduleOption::True => Node::Scalar(Scalar::Bool(true)),
                        SubmoduleOption::Recursive => Node::text("recursive"),
                    }),
                )
                .opt_text("path", checkout.path.as_deref())
                .opt_bool("persistCredentials", checkout.persist_credentials),
            StepAction::Download(download) => entries
                .opt_text("artifact", download.artifact.as_deref())
                .opt_text("patterns", download.patterns.as_deref())
                .opt_text("path", download.path.as_deref()),
            StepAction::Publish(publish) => entries.opt_text("artifact", publish.artifact.as_deref()),
        };

        Ok(entries.map("env", &self.env).into_node())
    }
}

impl Project for Job {
    fn project(&self, path: &str) -> PipelineResult<Node> {
        require(path, &self.name, "job name is empty")?;
        if self.steps.is_empty() {
            return Err(PipelineError::schema_violation(
                path,
                format!("job '{}' has no steps", self.name),
            ));
        }

        let pool = match &self.pool {
            Some(pool) => Some(project_pool(pool, &format!("{}.pool", path))?),
            None => None,
        };

        Ok(Entries::default()
            .text("job", &self.name)
            .opt_text("displayName", self.display_name.as_deref())
            .opt_node("dependsOn", project_depends_on(&self.depends_on))
            .opt_text("condition", self.condition.as_ref().map(|c| c.as_str()))
            .flag("continueOnError", self.continue_on_error)
            .opt_number("timeoutInMinutes", self.timeout_in_minutes)
            .opt_number("cancelTimeoutInMinutes", self.cancel_timeout_in_minutes)
            .opt_node("strategy", self.strategy.as_ref().map(project_strategy))
            .opt_node("pool", pool)
            .opt_text("container", self.container.as_deref())
            .opt_node(
                "workspace",
                self.workspace
                    .map(|clean| Entries::default().text("clean", clean.as_str()).into_node()),
            )
            .seq(
                "variables",
                project_list(&self.variables, &format!("{}.variables", path))?,
            )
            .node(
                "steps",
                Node::Seq(project_list(&self.steps, &format!("{}.steps", path))?),
            )
            .into_node())
    }
}

impl Project for Stage {
    fn project(&self, path: &str) -> PipelineResult<Node> {
        require(path, &self.name, "stage name is empty")?;
        if self.jobs.is_empty() {
            return Err(PipelineError::schema_violation(
                path,
                format!("stage '{}' has no jobs", self.name),
            ));
        }

        let pool = match &self.pool {
            Some(pool) => Some(project_pool(pool, &format!("{}.pool", path))?),
            None => None,
        };

        Ok(Entries::default()
            .text("stage", &self.name)
            .opt_text("displayName", self.display_name.as_deref())
            .opt_node("dependsOn", project_depends_on(&self.depends_on))
            .opt_text("condition", self.condition.as_ref().map(|c| c.as_str()))
            .opt_node("pool", pool)
            .seq(
                "variables",
                project_list(&self.variables, &format!("{}.variables", path))?,
            )
            .node(
                "jobs",
                Node::Seq(project_list(&self.jobs, &format!("{}.jobs", path))?),
            )
            .into_node())
    }
}

fn project_pool(pool: &Pool, path: &str) -> PipelineResult<Node> {
    match pool {
        Pool::Name(name) => {
            require(path, name, "pool name is empty")?;
            Ok(Node::text(name.as_str()))
        }
        Pool::Hosted(hosted) => {
            if hosted.name.is_none() && hosted.vm_image.is_none() {
                return Err(PipelineError::schema_violation(
                    path,
                    "pool has neither a name nor a vmImage",
                ));
            }
            Ok(Entries::default()
                .opt_text("name", hosted.name.as_deref())
                .opt_text("vmImage", hosted.vm_image.as_deref())
                .seq(
                    "demands",
                    hosted.demands.iter().map(|d| Node::text(d.as_str())).collect(),
                )
                .into_node())
        }
    }
}

fn project_depends_on(depends_on: &DependsOn) -> Option<Node> {
    match depends_on {
        DependsOn::Default => None,
        DependsOn::None => Some(Node::Seq(Vec::new())),
        DependsOn::Single(name) => Some(Node::text(name.as_str())),
        DependsOn::Multiple(names) => Some(Node::Seq(
            names.iter().map(|name| Node::text(name.as_str())).collect(),
        )),
    }
}

fn project_strategy(strategy: &Strategy) -> Node {
    Entries::default()
        .map("matrix", &strategy.matrix)
        .opt_number("parallel", strategy.parallel)
        .opt_number("maxParallel", strategy.max_parallel)
        .into_node()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::conditioned::StepBranch;
    use crate::model::{Fragment, HostedPool};

    fn keys(node: &Node) -> Vec<&str> {
        match node {
            Node::Map(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            other => panic!("expected a mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_step_key_order() {
        let step = Step::task("DotNetCoreCLI@2")
            .with_input("command", "test")
            .with_env("DOTNET_NOLOGO", "1")
            .with_display_name("Build and test")
            .with_condition(Condition::succeeded())
            .with_timeout_in_minutes(10)
            .disabled();
        let node = step.project("steps[0]").unwrap();
        assert_eq!(
            keys(&node),
            vec![
                "task",
                "displayName",
                "condition",
                "enabled",
                "timeoutInMinutes",
                "inputs",
                "env"
            ]
        );
    }

    #[test]
    fn test_inputs_on_script_step_are_rejected() {
        let step = Step::script("echo hi").with_input("x", "y");
        let err = step.project("jobs[0].steps[1]").unwrap_err();
        assert!(matches!(err, PipelineError::SchemaViolation { .. }));
        assert_eq!(err.path(), Some("jobs[0].steps[1]"));
    }

    #[test]
    fn test_hosted_pool_needs_name_or_image() {
        let err = project_pool(&Pool::Hosted(HostedPool::default()), "pool").unwrap_err();
        assert_eq!(err.path(), Some("pool"));

        let node = project_pool(&HostedPool::vm_image("ubuntu-latest").into(), "pool").unwrap();
        assert_eq!(keys(&node), vec!["vmImage"]);
    }

    #[test]
    fn test_conditioned_paths_use_declared_indices() {
        let job = Job::new("Build").with_step(Step::script("echo 1")).with_step(
            Condition::is_pull_request()
                .step(Step::script("echo pr"))
                .else_if(Condition::is_tag_build())
                .step(Step::script("echo tag"))
                .step(Step::task(""))
                .else_()
                .step(Step::script("echo ci")),
        );

        let err = job.project("jobs[0]").unwrap_err();
        assert_eq!(err.path(), Some("jobs[0].steps[1].elseif[0][1]"));
    }

    #[test]
    fn test_fragment_items_are_spliced() {
        let steps = vec![
            ListItem::Item(Step::script("echo a")),
            ListItem::Fragment(Fragment::Steps(vec![
                Step::script("echo b").into(),
                Step::script("echo c").into(),
            ])),
        ];
        let nodes = project_list(&steps, "steps").unwrap();
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_fragment_of_other_kind_is_unsupported() {
        let steps: Vec<ListItem<Step>> =
            vec![ListItem::Fragment(Fragment::Stages(vec![Stage::new("Deploy").into()]))];
        let err = project_list(&steps, "jobs[0].steps").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedItem { .. }));
        assert_eq!(err.path(), Some("jobs[0].steps[0]"));
    }

    #[test]
    fn test_depends_on_forms() {
        assert_eq!(project_depends_on(&DependsOn::Default), None);
        assert_eq!(project_depends_on(&DependsOn::None), Some(Node::Seq(Vec::new())));
        assert_eq!(
            project_depends_on(&DependsOn::on("Build")),
            Some(Node::text("Build"))
        );
    }
}
