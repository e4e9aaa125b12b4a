// Variable declarations

use crate::value::Scalar;

/// A single entry of a `variables:` list
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    /// `- name: foo` / `value: bar`
    Value {
        name: String,
        value: Scalar,
        readonly: bool,
    },
    /// `- group: my-group`
    Group(String),
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Variable::Value {
            name: name.into(),
            value: value.into(),
            readonly: false,
        }
    }

    /// A variable that queue-time settings and scripts cannot overwrite
    pub fn readonly(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Variable::Value {
            name: name.into(),
            value: value.into(),
            readonly: true,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Variable::Group(name.into())
    }

    /// Variable name, or group name for group references
    pub fn name(&self) -> &str {
        match self {
            Variable::Value { name, .. } => name,
            Variable::Group(group) => group,
        }
    }
}
