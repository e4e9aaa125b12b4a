// Condition Expression Compiler
// Builds Azure DevOps expression strings from condition macros; never evaluates them

use crate::value::ParameterReference;

use std::fmt;

/// A pre-rendered Azure DevOps expression, e.g.
/// `eq(variables['Build.SourceBranch'], 'refs/heads/main')`.
///
/// Used both as the condition of `${{ if }}` blocks and as the runtime
/// `condition:` of steps, jobs and stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition(String);

/// An argument of an expression function
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// String literal, rendered single-quoted
    Literal(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    /// `variables['Name']`
    Variable(String),
    /// `parameters.path`
    Parameter(ParameterReference),
    /// A nested expression
    Expression(Condition),
}

impl Operand {
    pub fn variable(name: impl Into<String>) -> Self {
        Operand::Variable(name.into())
    }

    fn render(&self) -> String {
        match self {
            Operand::Literal(s) => quote_literal(s),
            Operand::Number(n) => {
                if *n == 0.0 {
                    "0".to_string()
                } else if n.fract() == 0.0 && n.is_finite() {
                    format!("{:.0}", n)
                } else {
                    n.to_string()
                }
            }
            Operand::Integer(n) => n.to_string(),
            Operand::Bool(b) => b.to_string(),
            Operand::Variable(name) => format!("variables['{}']", name.replace('\'', "''")),
            Operand::Parameter(reference) => reference.expression(),
            Operand::Expression(condition) => condition.0.clone(),
        }
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Literal(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Literal(s)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Integer(n)
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<ParameterReference> for Operand {
    fn from(reference: ParameterReference) -> Self {
        Operand::Parameter(reference)
    }
}

impl From<&ParameterReference> for Operand {
    fn from(reference: &ParameterReference) -> Self {
        Operand::Parameter(reference.clone())
    }
}

impl From<Condition> for Operand {
    fn from(condition: Condition) -> Self {
        Operand::Expression(condition)
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

const SOURCE_BRANCH: &str = "Build.SourceBranch";
const BUILD_REASON: &str = "Build.Reason";

impl Condition {
    /// Wraps a hand-written expression verbatim
    pub fn raw(expression: impl Into<String>) -> Self {
        Condition(expression.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders `name(arg1, arg2, ...)`
    pub fn function<I, O>(name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Operand>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.into().render()).collect();
        Condition(format!("{}({})", name, args.join(", ")))
    }

    // =========================================================================
    // Branch / build-reason macros
    // =========================================================================

    /// Build runs for exactly this branch. Short names get the `refs/heads/` prefix.
    pub fn is_branch(branch: &str) -> Self {
        Self::equals(Operand::variable(SOURCE_BRANCH), branch_ref(branch))
    }

    pub fn is_not_branch(branch: &str) -> Self {
        Self::not_equals(Operand::variable(SOURCE_BRANCH), branch_ref(branch))
    }

    pub fn is_pull_request() -> Self {
        Self::equals(Operand::variable(BUILD_REASON), "PullRequest")
    }

    pub fn is_not_pull_request() -> Self {
        Self::not_equals(Operand::variable(BUILD_REASON), "PullRequest")
    }

    /// Build runs for exactly this tag
    pub fn is_tag(tag: &str) -> Self {
        let tag = if tag.starts_with("refs/") {
            tag.to_string()
        } else {
            format!("refs/tags/{}", tag)
        };
        Self::equals(Operand::variable(SOURCE_BRANCH), tag)
    }

    /// Build runs for any tag
    pub fn is_tag_build() -> Self {
        Self::starts_with(Operand::variable(SOURCE_BRANCH), "refs/tags/")
    }

    pub fn variable_equals(name: &str, value: impl Into<Operand>) -> Self {
        Self::equals(Operand::variable(name), value)
    }

    pub fn variable_not_equals(name: &str, value: impl Into<Operand>) -> Self {
        Self::not_equals(Operand::variable(name), value)
    }

    // =========================================================================
    // Comparison and string functions
    // =========================================================================

    pub fn equals(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::function("eq", [left.into(), right.into()])
    }

    pub fn not_equals(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::function("ne", [left.into(), right.into()])
    }

    pub fn contains(haystack: impl Into<Operand>, needle: impl Into<Operand>) -> Self {
        Self::function("contains", [haystack.into(), needle.into()])
    }

    pub fn starts_with(value: impl Into<Operand>, prefix: impl Into<Operand>) -> Self {
        Self::function("startsWith", [value.into(), prefix.into()])
    }

    pub fn ends_with(value: impl Into<Operand>, suffix: impl Into<Operand>) -> Self {
        Self::function("endsWith", [value.into(), suffix.into()])
    }

    /// `in(needle, candidate1, candidate2, ...)`
    pub fn in_<I, O>(needle: impl Into<Operand>, candidates: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Operand>,
    {
        let args = std::iter::once(needle.into()).chain(candidates.into_iter().map(Into::into));
        Self::function("in", args)
    }

    // =========================================================================
    // Status functions
    // =========================================================================

    pub fn succeeded() -> Self {
        Condition::raw("succeeded()")
    }

    pub fn failed() -> Self {
        Condition::raw("failed()")
    }

    pub fn canceled() -> Self {
        Condition::raw("canceled()")
    }

    pub fn always() -> Self {
        Condition::raw("always()")
    }

    pub fn succeeded_or_failed() -> Self {
        Condition::raw("succeededOrFailed()")
    }

    // =========================================================================
    // Logical combinators
    // =========================================================================

    /// `and(first, rest...)`; a single operand is returned unchanged
    pub fn and(first: Condition, rest: impl IntoIterator<Item = Condition>) -> Self {
        Self::combine("and", first, rest)
    }

    /// `or(first, rest...)`; a single operand is returned unchanged
    pub fn or(first: Condition, rest: impl IntoIterator<Item = Condition>) -> Self {
        Self::combine("or", first, rest)
    }

    pub fn xor(left: Condition, right: Condition) -> Self {
        Self::function("xor", [left, right])
    }

    pub fn not(condition: Condition) -> Self {
        Self::function("not", [condition])
    }

    /// `and(self, other)`
    pub fn and_also(self, other: Condition) -> Self {
        Self::and(self, [other])
    }

    /// `or(self, other)`
    pub fn or_else(self, other: Condition) -> Self {
        Self::or(self, [other])
    }

    fn combine(name: &str, first: Condition, rest: impl IntoIterator<Item = Condition>) -> Self {
        let mut operands = vec![first];
        operands.extend(rest);
        if operands.len() == 1 {
            return operands.remove(0);
        }
        Self::function(name, operands)
    }
}

fn branch_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{}", branch)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Condition {
    fn from(s: &str) -> Self {
        Condition::raw(s)
    }
}

impl From<String> for Condition {
    fn from(s: String) -> Self {
        Condition::raw(s)
    }
}
