// Conditioned Node
// `${{ if }}` / `${{ elseif }}` / `${{ else }}` blocks over items of one kind,
// with fluent builders that refuse further branches once `else` is reached

use crate::condition::Condition;
use crate::error::{PipelineError, PipelineResult};
use crate::model::{Job, ListItem, Stage, Step, Variable};
use crate::value::Scalar;

/// One `${{ elseif }}` branch
#[derive(Debug, Clone, PartialEq)]
pub struct Branch<T> {
    pub condition: Condition,
    pub items: Vec<ListItem<T>>,
}

/// Items that exist only when the orchestrator evaluates `condition` to true,
/// followed by alternative branches in declared order.
///
/// The condition is never evaluated here; the block is only re-emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditioned<T> {
    condition: Condition,
    items: Vec<ListItem<T>>,
    else_ifs: Vec<Branch<T>>,
    else_items: Option<Vec<ListItem<T>>>,
}

impl<T> Conditioned<T> {
    pub fn new(condition: Condition, items: Vec<ListItem<T>>) -> Self {
        Self {
            condition,
            items,
            else_ifs: Vec::new(),
            else_items: None,
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn items(&self) -> &[ListItem<T>] {
        &self.items
    }

    pub fn else_ifs(&self) -> &[Branch<T>] {
        &self.else_ifs
    }

    pub fn else_items(&self) -> Option<&[ListItem<T>]> {
        self.else_items.as_deref()
    }

    /// Number of sibling entries the block serializes to
    pub fn branch_count(&self) -> usize {
        1 + self.else_ifs.len() + usize::from(self.else_items.is_some())
    }

    /// Appends an `elseif` branch. Fails once the chain ends with `else`.
    pub fn push_else_if(
        &mut self,
        condition: Condition,
        items: Vec<ListItem<T>>,
    ) -> PipelineResult<&mut Self> {
        if self.else_items.is_some() {
            return Err(PipelineError::InvalidBranchChain(format!(
                "cannot add 'elseif {}' after 'else'",
                condition
            )));
        }
        self.else_ifs.push(Branch { condition, items });
        Ok(self)
    }

    /// Sets the `else` branch. A chain has at most one.
    pub fn set_else(&mut self, items: Vec<ListItem<T>>) -> PipelineResult<&mut Self> {
        if self.else_items.is_some() {
            return Err(PipelineError::InvalidBranchChain(format!(
                "'if {}' already has an 'else' branch",
                self.condition
            )));
        }
        self.else_items = Some(items);
        Ok(self)
    }
}

// =============================================================================
// Fluent builders
// =============================================================================

/// Builder positioned on the `if` branch or the latest `elseif` branch
#[derive(Debug, Clone)]
#[must_use = "a conditioned block does nothing until it is added to a list"]
pub struct ConditionBuilder<T> {
    block: Conditioned<T>,
}

/// Builder positioned on the `else` branch; no further branches can follow
#[derive(Debug, Clone)]
#[must_use = "a conditioned block does nothing until it is added to a list"]
pub struct ElseBuilder<T> {
    block: Conditioned<T>,
}

impl<T> ConditionBuilder<T> {
    fn new(condition: Condition) -> Self {
        Self {
            block: Conditioned::new(condition, Vec::new()),
        }
    }

    fn current(&mut self) -> &mut Vec<ListItem<T>> {
        match self.block.else_ifs.last_mut() {
            Some(branch) => &mut branch.items,
            None => &mut self.block.items,
        }
    }

    /// Starts an `elseif` branch
    pub fn else_if(mut self, condition: Condition) -> Self {
        self.block.else_ifs.push(Branch {
            condition,
            items: Vec::new(),
        });
        self
    }

    /// Starts the final `else` branch
    pub fn else_(mut self) -> ElseBuilder<T> {
        self.block.else_items = Some(Vec::new());
        ElseBuilder { block: self.block }
    }

    /// Freezes the branch list
    pub fn build(self) -> Conditioned<T> {
        self.block
    }
}

impl<T> ElseBuilder<T> {
    /// Freezes the branch list
    pub fn build(self) -> Conditioned<T> {
        self.block
    }
}

/// Adding items to whichever branch a builder is positioned on
pub trait BranchBuilder<T>: Sized {
    fn item(self, item: impl Into<ListItem<T>>) -> Self;

    fn items<I, V>(self, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ListItem<T>>,
    {
        items.into_iter().fold(self, |builder, item| builder.item(item))
    }
}

impl<T> BranchBuilder<T> for ConditionBuilder<T> {
    fn item(mut self, item: impl Into<ListItem<T>>) -> Self {
        self.current().push(item.into());
        self
    }
}

impl<T> BranchBuilder<T> for ElseBuilder<T> {
    fn item(mut self, item: impl Into<ListItem<T>>) -> Self {
        if let Some(items) = self.block.else_items.as_mut() {
            items.push(item.into());
        }
        self
    }
}

/// `variable`/`group` shorthands on variable branches
pub trait VariableBranch: BranchBuilder<Variable> {
    fn variable(self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.item(Variable::new(name, value))
    }

    fn group(self, name: impl Into<String>) -> Self {
        self.item(Variable::group(name))
    }
}

impl<B: BranchBuilder<Variable>> VariableBranch for B {}

/// `step` shorthand on step branches
pub trait StepBranch: BranchBuilder<Step> {
    fn step(self, step: impl Into<ListItem<Step>>) -> Self {
        self.item(step)
    }
}

impl<B: BranchBuilder<Step>> StepBranch for B {}

/// `job` shorthand on job branches
pub trait JobBranch: BranchBuilder<Job> {
    fn job(self, job: impl Into<ListItem<Job>>) -> Self {
        self.item(job)
    }
}

impl<B: BranchBuilder<Job>> JobBranch for B {}

/// `stage` shorthand on stage branches
pub trait StageBranch: BranchBuilder<Stage> {
    fn stage(self, stage: impl Into<ListItem<Stage>>) -> Self {
        self.item(stage)
    }
}

impl<B: BranchBuilder<Stage>> StageBranch for B {}

impl<T> From<ConditionBuilder<T>> for ListItem<T> {
    fn from(builder: ConditionBuilder<T>) -> Self {
        ListItem::Conditioned(builder.build())
    }
}

impl<T> From<ElseBuilder<T>> for ListItem<T> {
    fn from(builder: ElseBuilder<T>) -> Self {
        ListItem::Conditioned(builder.build())
    }
}

// =============================================================================
// Starting a block from a condition
// =============================================================================

impl Condition {
    /// Starts a block whose item kind is inferred from the first item
    pub fn item<T>(self, item: impl Into<ListItem<T>>) -> ConditionBuilder<T> {
        ConditionBuilder::new(self).item(item)
    }

    pub fn items<T, I, V>(self, items: I) -> ConditionBuilder<T>
    where
        I: IntoIterator<Item = V>,
        V: Into<ListItem<T>>,
    {
        ConditionBuilder::new(self).items(items)
    }

    /// Starts an empty block of the given kind
    pub fn block<T>(self) -> ConditionBuilder<T> {
        ConditionBuilder::new(self)
    }

    pub fn variable(self, name: impl Into<String>, value: impl Into<Scalar>) -> ConditionBuilder<Variable> {
        ConditionBuilder::new(self).variable(name, value)
    }

    pub fn group(self, name: impl Into<String>) -> ConditionBuilder<Variable> {
        ConditionBuilder::new(self).group(name)
    }

    pub fn step(self, step: impl Into<ListItem<Step>>) -> ConditionBuilder<Step> {
        ConditionBuilder::new(self).step(step)
    }

    pub fn job(self, job: impl Into<ListItem<Job>>) -> ConditionBuilder<Job> {
        ConditionBuilder::new(self).job(job)
    }

    pub fn stage(self, stage: impl Into<ListItem<Stage>>) -> ConditionBuilder<Stage> {
        ConditionBuilder::new(self).stage(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branches_append_in_call_order() {
        let block = Condition::is_branch("main")
            .variable("Channel", "stable")
            .else_if(Condition::is_branch("next"))
            .variable("Channel", "preview")
            .group("preview-secrets")
            .else_if(Condition::is_tag_build())
            .variable("Channel", "release")
            .else_()
            .variable("Channel", "dev")
            .build();

        assert_eq!(block.items().len(), 1);
        assert_eq!(block.else_ifs().len(), 2);
        assert_eq!(block.else_ifs()[0].condition, Condition::is_branch("next"));
        assert_eq!(block.else_ifs()[0].items.len(), 2);
        assert_eq!(block.else_ifs()[1].condition, Condition::is_tag_build());
        assert_eq!(block.else_items().map(|items| items.len()), Some(1));
        assert_eq!(block.branch_count(), 4);
    }

    #[test]
    fn test_push_else_if_after_else_is_rejected() {
        let mut block: Conditioned<Step> =
            Conditioned::new(Condition::is_pull_request(), vec![Step::script("echo pr").into()]);
        block.set_else(vec![Step::script("echo ci").into()]).unwrap();

        let err = block
            .push_else_if(Condition::is_tag_build(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidBranchChain(_)));
        assert_eq!(block.else_ifs().len(), 0);
    }

    #[test]
    fn test_second_else_is_rejected() {
        let mut block: Conditioned<Variable> = Condition::is_branch("main")
            .variable("A", "1")
            .else_()
            .variable("A", "2")
            .build();

        assert!(block.set_else(Vec::new()).is_err());
        assert_eq!(block.else_items().map(|items| items.len()), Some(1));
    }

    #[test]
    fn test_push_else_if_before_else() {
        let mut block: Conditioned<Job> = Condition::is_pull_request().block().build();
        block
            .push_else_if(Condition::is_tag_build(), vec![Job::new("Release").into()])
            .unwrap()
            .set_else(Vec::new())
            .unwrap();
        assert_eq!(block.branch_count(), 3);
    }

    #[test]
    fn test_nested_blocks() {
        let inner = Condition::is_pull_request().step(Step::script("echo nested"));
        let outer = Condition::is_branch("main")
            .step(Step::script("echo main"))
            .step(inner)
            .build();

        assert_eq!(outer.items().len(), 2);
        assert!(matches!(outer.items()[1], ListItem::Conditioned(_)));
    }

    #[test]
    fn test_builder_converts_into_list_item() {
        let item: ListItem<Stage> = Condition::is_tag_build().stage(Stage::new("Release")).into();
        match item {
            ListItem::Conditioned(block) => assert_eq!(block.branch_count(), 1),
            other => panic!("unexpected item {:?}", other),
        }
    }
}
