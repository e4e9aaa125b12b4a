// Parameter Schema
// Structural description of template parameter records and their flattening into
// nested parameter references

use crate::error::{PipelineError, PipelineResult};
use crate::value::ParameterReference;

use serde::Deserialize;
use std::collections::HashSet;

// =============================================================================
// Schema
// =============================================================================

/// Record types a pipeline's parameters are declared with
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ParametersSchema {
    #[serde(default)]
    pub records: Vec<RecordSchema>,
}

/// One record type: its own members plus an optional base record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordSchema {
    pub name: String,

    /// Record whose members are inherited after the own members
    #[serde(default)]
    pub base: Option<String>,

    #[serde(default)]
    pub members: Vec<MemberSchema>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberSchema {
    /// Member name as declared on the record
    pub name: String,

    /// Serialized parameter name, when it differs from `name`
    #[serde(default)]
    pub alias: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: MemberKind,

    /// Compiler-generated members (e.g. equality contracts) get no accessor
    #[serde(default)]
    pub synthesized: bool,
}

/// Member type. Anything other than a builtin names another record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum MemberKind {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    Record(String),
}

impl From<String> for MemberKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "string" => MemberKind::String,
            "number" => MemberKind::Number,
            "boolean" => MemberKind::Boolean,
            "object" => MemberKind::Object,
            _ => MemberKind::Record(kind),
        }
    }
}

impl MemberSchema {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind,
            synthesized: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn synthesized(mut self) -> Self {
        self.synthesized = true;
        self
    }

    /// Name the parameter is serialized under
    pub fn serialized_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            members: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_member(mut self, member: MemberSchema) -> Self {
        self.members.push(member);
        self
    }
}

// =============================================================================
// Flattened accessors
// =============================================================================

/// Accessors of one record at one position of the parameter tree
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorGroup {
    pub record: String,
    pub members: Vec<Accessor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    /// Declared member name
    pub member: String,
    pub kind: MemberKind,
    pub reference: ParameterReference,
    /// Accessors of a record-typed member, nested under `reference`
    pub nested: Option<AccessorGroup>,
}

impl AccessorGroup {
    pub fn get(&self, member: &str) -> Option<&Accessor> {
        self.members.iter().find(|accessor| accessor.member == member)
    }

    /// Every reference in the group, depth first
    pub fn references(&self) -> Vec<&ParameterReference> {
        let mut references = Vec::new();
        for accessor in &self.members {
            references.push(&accessor.reference);
            if let Some(nested) = &accessor.nested {
                references.extend(nested.references());
            }
        }
        references
    }
}

impl ParametersSchema {
    pub fn from_yaml_str(content: &str) -> PipelineResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| PipelineError::InvalidParameterSchema(format!("failed to parse schema: {}", e)))
    }

    pub fn with_record(mut self, record: RecordSchema) -> Self {
        self.records.push(record);
        self
    }

    pub fn record(&self, name: &str) -> Option<&RecordSchema> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Flattens `root` into accessors: own members first, then each base's,
    /// skipping synthesized members
    pub fn accessors(&self, root: &str) -> PipelineResult<AccessorGroup> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.records.iter().find(|r| !seen.insert(r.name.as_str())) {
            return Err(PipelineError::InvalidParameterSchema(format!(
                "record '{}' is declared more than once",
                duplicate.name
            )));
        }

        self.group(root, None, &mut Vec::new())
    }

    fn group(
        &self,
        record: &str,
        parent: Option<&ParameterReference>,
        containing: &mut Vec<String>,
    ) -> PipelineResult<AccessorGroup> {
        if containing.iter().any(|name| name == record) {
            return Err(PipelineError::InvalidParameterSchema(format!(
                "record '{}' contains itself through {}",
                record,
                containing.join(" -> ")
            )));
        }
        containing.push(record.to_string());

        let mut members = Vec::new();
        let mut names = HashSet::new();
        for member in self.members_of(record)? {
            if member.synthesized {
                continue;
            }

            let serialized = member.serialized_name();
            if !names.insert(serialized) {
                return Err(PipelineError::InvalidParameterSchema(format!(
                    "record '{}' has more than one member serialized as '{}'",
                    record, serialized
                )));
            }

            let reference = match parent {
                Some(parent) => parent.member(serialized)?,
                None => ParameterReference::new(serialized)?,
            };
            let nested = match &member.kind {
                MemberKind::Record(name) => Some(self.group(name, Some(&reference), containing)?),
                _ => None,
            };

            members.push(Accessor {
                member: member.name.clone(),
                kind: member.kind.clone(),
                reference,
                nested,
            });
        }

        containing.pop();
        Ok(AccessorGroup {
            record: record.to_string(),
            members,
        })
    }

    /// Members of `record` followed by the members of each ancestor
    fn members_of(&self, record: &str) -> PipelineResult<Vec<&MemberSchema>> {
        let mut members = Vec::new();
        let mut chain: Vec<&str> = Vec::new();
        let mut current = Some(record);

        while let Some(name) = current {
            if chain.contains(&name) {
                return Err(PipelineError::InvalidParameterSchema(format!(
                    "inheritance cycle: {} -> {}",
                    chain.join(" -> "),
                    name
                )));
            }
            let schema = self.record(name).ok_or_else(|| {
                PipelineError::InvalidParameterSchema(format!("unknown record '{}'", name))
            })?;
            chain.push(name);
            members.extend(schema.members.iter());
            current = schema.base.as_deref();
        }

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(group: &AccessorGroup) -> Vec<&str> {
        group.references().into_iter().map(|r| r.path()).collect()
    }

    #[test]
    fn test_primitive_members_are_single_segment() {
        let schema = ParametersSchema::default().with_record(
            RecordSchema::new("BuildParameters")
                .with_member(MemberSchema::new("Configuration", MemberKind::String))
                .with_member(MemberSchema::new("RunTests", MemberKind::Boolean).with_alias("runTests")),
        );

        let group = schema.accessors("BuildParameters").unwrap();
        assert_eq!(paths(&group), vec!["Configuration", "runTests"]);
        assert_eq!(group.get("RunTests").unwrap().reference.expression(), "parameters.runTests");
    }

    #[test]
    fn test_nested_record_references_share_parent_prefix() {
        let schema = ParametersSchema::default()
            .with_record(
                RecordSchema::new("Outer")
                    .with_member(MemberSchema::new("outer", MemberKind::Record("Inner".into()))),
            )
            .with_record(
                RecordSchema::new("Inner").with_member(MemberSchema::new("inner", MemberKind::String)),
            );

        let group = schema.accessors("Outer").unwrap();
        let outer = group.get("outer").unwrap();
        let inner = outer.nested.as_ref().unwrap().get("inner").unwrap();
        assert_eq!(inner.reference.path(), "outer.inner");
        assert_eq!(inner.reference.to_string(), "${{ parameters.outer.inner }}");
    }

    #[test]
    fn test_inherited_members_follow_own_members() {
        let schema = ParametersSchema::default()
            .with_record(
                RecordSchema::new("Deploy")
                    .with_base("Common")
                    .with_member(MemberSchema::new("environment", MemberKind::String))
                    .with_member(MemberSchema::new("EqualityContract", MemberKind::Object).synthesized()),
            )
            .with_record(
                RecordSchema::new("Common")
                    .with_base("Root")
                    .with_member(MemberSchema::new("verbose", MemberKind::Boolean)),
            )
            .with_record(RecordSchema::new("Root").with_member(MemberSchema::new("retries", MemberKind::Number)));

        let group = schema.accessors("Deploy").unwrap();
        assert_eq!(paths(&group), vec!["environment", "verbose", "retries"]);
    }

    #[test]
    fn test_aliases_prefix_nested_paths() {
        let schema = ParametersSchema::default()
            .with_record(RecordSchema::new("Root").with_member(
                MemberSchema::new("Settings", MemberKind::Record("Settings".into())).with_alias("settings"),
            ))
            .with_record(
                RecordSchema::new("Settings").with_member(MemberSchema::new("Region", MemberKind::String)),
            );

        let group = schema.accessors("Root").unwrap();
        assert_eq!(paths(&group), vec!["settings", "settings.Region"]);
    }

    #[test]
    fn test_schema_errors() {
        let unknown = ParametersSchema::default().accessors("Missing").unwrap_err();
        assert!(unknown.to_string().contains("unknown record 'Missing'"));

        let cycle = ParametersSchema::default()
            .with_record(RecordSchema::new("A").with_base("B"))
            .with_record(RecordSchema::new("B").with_base("A"))
            .accessors("A")
            .unwrap_err();
        assert!(cycle.to_string().contains("inheritance cycle"));

        let recursive = ParametersSchema::default()
            .with_record(
                RecordSchema::new("Node").with_member(MemberSchema::new("child", MemberKind::Record("Node".into()))),
            )
            .accessors("Node")
            .unwrap_err();
        assert!(recursive.to_string().contains("contains itself"));

        let duplicate = ParametersSchema::default()
            .with_record(
                RecordSchema::new("A")
                    .with_member(MemberSchema::new("a", MemberKind::String))
                    .with_member(MemberSchema::new("b", MemberKind::String).with_alias("a")),
            )
            .accessors("A")
            .unwrap_err();
        assert!(matches!(duplicate, PipelineError::InvalidParameterSchema(_)));
    }

    #[test]
    fn test_sibling_records_of_same_type_are_allowed() {
        let schema = ParametersSchema::default()
            .with_record(
                RecordSchema::new("Root")
                    .with_member(MemberSchema::new("primary", MemberKind::Record("Region".into())))
                    .with_member(MemberSchema::new("fallback", MemberKind::Record("Region".into()))),
            )
            .with_record(RecordSchema::new("Region").with_member(MemberSchema::new("name", MemberKind::String)));

        let group = schema.accessors("Root").unwrap();
        assert_eq!(
            paths(&group),
            vec!["primary", "primary.name", "fallback", "fallback.name"]
        );
    }

    #[test]
    fn test_from_yaml() {
        let schema = ParametersSchema::from_yaml_str(
            r#"
records:
  - name: BuildParameters
    base: CommonParameters
    members:
      - name: Settings
        alias: settings
        type: DeploySettings
      - name: EqualityContract
        type: object
        synthesized: true
  - name: CommonParameters
    members:
      - name: verbose
        type: boolean
  - name: DeploySettings
    members:
      - name: region
"#,
        )
        .unwrap();

        assert_eq!(
            schema.record("BuildParameters").unwrap().members[0].kind,
            MemberKind::Record("DeploySettings".to_string())
        );
        let group = schema.accessors("BuildParameters").unwrap();
        assert_eq!(paths(&group), vec!["settings", "settings.region", "verbose"]);
    }
}
