// Value Model
// Leaf values of the pipeline tree: scalars, ordered maps, sequences and parameter references

use crate::error::{PipelineError, PipelineResult};

use indexmap::IndexMap;
use std::fmt;

// =============================================================================
// Parameter references
// =============================================================================

/// Handle to a (possibly nested) template parameter, e.g. `settings.configuration`.
///
/// The path is validated on construction: it is a non-empty, dot-separated list of
/// segments, each starting with an ASCII letter or `_` and containing only ASCII
/// alphanumerics, `_` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterReference {
    path: String,
}

impl ParameterReference {
    pub fn new(path: impl Into<String>) -> PipelineResult<Self> {
        let path = path.into();
        validate_reference_path(&path)?;
        Ok(Self { path })
    }

    /// Dotted path, e.g. `settings.configuration`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Expression form used inside conditions, e.g. `parameters.settings.configuration`
    pub fn expression(&self) -> String {
        format!("parameters.{}", self.path)
    }

    /// Reference to a member of this (record-typed) parameter
    pub fn member(&self, name: &str) -> PipelineResult<ParameterReference> {
        ParameterReference::new(format!("{}.{}", self.path, name))
    }

    /// Dotted path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }
}

/// Renders the compile-time template token, e.g. `${{ parameters.version }}`
impl fmt::Display for ParameterReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{{ parameters.{} }}}}", self.path)
    }
}

fn validate_reference_path(path: &str) -> PipelineResult<()> {
    if path.trim().is_empty() {
        return Err(PipelineError::invalid_reference(path, "path is empty"));
    }

    for segment in path.split('.') {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            return Err(PipelineError::invalid_reference(path, "path has an empty segment"));
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(PipelineError::invalid_reference(
                path,
                format!("segment '{}' must start with a letter or '_'", segment),
            ));
        }
        if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-')) {
            return Err(PipelineError::invalid_reference(
                path,
                format!("segment '{}' contains invalid character '{}'", segment, bad),
            ));
        }
    }

    Ok(())
}

// =============================================================================
// Scalars
// =============================================================================

/// A single leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Runtime macro variable, rendered as `$(Name)`
    Variable(String),
    /// Template parameter, rendered as `${{ parameters.name }}`
    Parameter(ParameterReference),
}

impl Scalar {
    /// Shorthand for a `$(name)` macro reference
    pub fn variable(name: impl Into<String>) -> Self {
        Scalar::Variable(name.into())
    }

    /// Text the scalar stands for in YAML, before quoting
    pub fn as_string(&self) -> String {
        match self {
            Scalar::String(s) => s.clone(),
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{:.1}", n)
                } else {
                    n.to_string()
                }
            }
            Scalar::Bool(b) => b.to_string(),
            Scalar::Variable(name) => format!("$({})", name),
            Scalar::Parameter(reference) => reference.to_string(),
        }
    }

    /// Whether the scalar is a typed (non-string) YAML value that must be emitted bare
    pub fn is_typed(&self) -> bool {
        matches!(self, Scalar::Integer(_) | Scalar::Float(_) | Scalar::Bool(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&String> for Scalar {
    fn from(s: &String) -> Self {
        Scalar::String(s.clone())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Integer(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Integer(n as i64)
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Scalar::Integer(n as i64)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

impl From<ParameterReference> for Scalar {
    fn from(reference: ParameterReference) -> Self {
        Scalar::Parameter(reference)
    }
}

impl From<&ParameterReference> for Scalar {
    fn from(reference: &ParameterReference) -> Self {
        Scalar::Parameter(reference.clone())
    }
}

// =============================================================================
// Ordered maps and composite values
// =============================================================================

/// Map whose insertion order is its serialization order.
///
/// Keys are unique; inserting an existing key replaces the value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap {
    entries: IndexMap<String, Value>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder form of [`OrderedMap::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for OrderedMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Any value that can appear as a leaf or subtree of a pipeline field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Map(OrderedMap),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OrderedMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

macro_rules! value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(value.into())
                }
            }
        )*
    };
}

value_from_scalar!(&str, String, &String, bool, i64, i32, u32, f64, ParameterReference, &ParameterReference);

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<OrderedMap> for Value {
    fn from(map: OrderedMap) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = PipelineError;

    /// Converts a parsed YAML value, keeping mapping order.
    /// Null becomes an empty string; tagged values keep their inner value.
    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Scalar(Scalar::String(String::new())),
            serde_yaml::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Scalar(Scalar::Integer(i))
                } else {
                    Value::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_yaml::Value::String(s) => Value::Scalar(Scalar::String(s)),
            serde_yaml::Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = OrderedMap::new();
                for (key, value) in mapping {
                    let key = match key {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Number(n) => n.to_string(),
                        other => {
                            return Err(PipelineError::schema_violation(
                                "value",
                                format!("unsupported mapping key: {:?}", other),
                            ))
                        }
                    };
                    map.insert(key, Value::try_from(value)?);
                }
                Value::Map(map)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_paths() {
        let reference = ParameterReference::new("settings.configuration").unwrap();
        assert_eq!(reference.path(), "settings.configuration");
        assert_eq!(reference.expression(), "parameters.settings.configuration");
        assert_eq!(
            reference.to_string(),
            "${{ parameters.settings.configuration }}"
        );
        assert_eq!(
            reference.segments().collect::<Vec<_>>(),
            vec!["settings", "configuration"]
        );
    }

    #[test]
    fn test_reference_member_nests_under_parent() {
        let outer = ParameterReference::new("outer").unwrap();
        let inner = outer.member("inner").unwrap();
        assert_eq!(inner.path(), "outer.inner");
    }

    #[test]
    fn test_reference_rejects_malformed_paths() {
        for bad in ["", "  ", "a..b", ".a", "a.", "1abc", "a b", "a.$b"] {
            let err = ParameterReference::new(bad).unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidReference { .. }),
                "expected InvalidReference for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_reference_accepts_dashes_and_underscores() {
        assert!(ParameterReference::new("_private.run-tests").is_ok());
    }

    #[test]
    fn test_scalar_as_string() {
        assert_eq!(Scalar::from("hello").as_string(), "hello");
        assert_eq!(Scalar::Integer(42).as_string(), "42");
        assert_eq!(Scalar::Float(2.0).as_string(), "2.0");
        assert_eq!(Scalar::Float(3.25).as_string(), "3.25");
        assert_eq!(Scalar::Bool(true).as_string(), "true");
        assert_eq!(Scalar::variable("DotnetVersion").as_string(), "$(DotnetVersion)");
    }

    #[test]
    fn test_ordered_map_keeps_insertion_order() {
        let mut map = OrderedMap::new();
        map.insert("name", "Azure Pipelines");
        map.insert("vmImage", "windows-latest");
        map.insert("demands", "msbuild");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "vmImage", "demands"]);

        // Re-inserting keeps the original position
        map.insert("name", "Other");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "vmImage", "demands"]);
        assert_eq!(map.len(), 3);
        assert_eq!(
            map.get("name").and_then(Value::as_scalar),
            Some(&Scalar::from("Other"))
        );
    }

    #[test]
    fn test_from_yaml_value_preserves_order() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("b: 1\na: [x, true]\nc: {d: 2.5}").unwrap();
        let value = Value::try_from(yaml).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(
            map.get("a"),
            Some(&Value::Sequence(vec![Value::from("x"), Value::from(true)]))
        );
    }
}
