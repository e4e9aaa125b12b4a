// Accessor Code Generation
// Renders flattened parameter accessors as Rust source, run as an explicit build step

use crate::error::{PipelineError, PipelineResult};
use crate::parameters::AccessorGroup;

use std::collections::HashSet;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Renders one zero-sized accessor struct per record position.
///
/// The root struct is `<Record>Reference`; a record-typed member gets a struct named
/// after its parent plus the member, so the same record type used twice yields two
/// structs with different prefixes. Fails when two members map to the same method
/// or struct identifier.
pub fn render_accessors(group: &AccessorGroup) -> PipelineResult<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "// Parameter accessors for `{}`\n// Generated by azpipe; do not edit by hand\n\n",
        group.record
    ));
    out.push_str("use pipeline_core::ParameterReference;\n");

    let root = format!("{}Reference", pascal_case(&group.record));
    let mut structs = HashSet::new();
    structs.insert(root.clone());
    render_group(&mut out, group, &root, None, &mut structs)?;
    Ok(out)
}

fn render_group(
    out: &mut String,
    group: &AccessorGroup,
    struct_name: &str,
    own_path: Option<&str>,
    structs: &mut HashSet<String>,
) -> PipelineResult<()> {
    out.push_str(&format!(
        "\n/// Parameters of record `{}`\n#[derive(Debug, Clone, Copy, Default)]\npub struct {};\n\nimpl {} {{\n",
        group.record, struct_name, struct_name
    ));

    let mut methods = HashSet::new();
    if let Some(path) = own_path {
        methods.insert("reference".to_string());
        out.push_str(&format!(
            "    /// The whole `{}` parameter\n    pub fn reference(&self) -> ParameterReference {{\n        {}\n    }}\n",
            path,
            reference_expr(path)
        ));
    }

    let mut nested = Vec::new();
    for (i, accessor) in group.members.iter().enumerate() {
        if i > 0 || own_path.is_some() {
            out.push('\n');
        }
        let method = method_name(&accessor.member);
        if !methods.insert(method.clone()) {
            return Err(PipelineError::InvalidParameterSchema(format!(
                "member '{}' of record '{}' generates the method `{}` twice",
                accessor.member, group.record, method
            )));
        }
        match &accessor.nested {
            Some(child) => {
                let prefix = struct_name.strip_suffix("Reference").unwrap_or(struct_name);
                let child_name = format!("{}{}Reference", prefix, pascal_case(&accessor.member));
                if !structs.insert(child_name.clone()) {
                    return Err(PipelineError::InvalidParameterSchema(format!(
                        "parameter '{}' generates the struct `{}` twice",
                        accessor.reference.path(),
                        child_name
                    )));
                }
                out.push_str(&format!(
                    "    /// `{}`\n    pub fn {}(&self) -> {} {{\n        {}\n    }}\n",
                    accessor.reference.path(),
                    method,
                    child_name,
                    child_name
                ));
                nested.push((child, child_name, accessor));
            }
            None => out.push_str(&format!(
                "    /// `{}`\n    pub fn {}(&self) -> ParameterReference {{\n        {}\n    }}\n",
                accessor.reference.path(),
                method,
                reference_expr(accessor.reference.path())
            )),
        }
    }
    out.push_str("}\n");

    for (child, child_name, accessor) in nested {
        render_group(out, child, &child_name, Some(accessor.reference.path()), structs)?;
    }
    Ok(())
}

fn reference_expr(path: &str) -> String {
    format!(
        "ParameterReference::new(\"{}\").expect(\"accessor paths are validated when generated\")",
        path
    )
}

fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        // Split `dotnetVersion` and `HTTPServer` at the case change
        let boundary = c.is_ascii_uppercase()
            && i > 0
            && (chars[i - 1].is_ascii_lowercase()
                || chars[i - 1].is_ascii_digit()
                || (chars[i - 1].is_ascii_uppercase()
                    && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase())));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn method_name(member: &str) -> String {
    let mut name = words(member)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if RUST_KEYWORDS.contains(&name.as_str()) {
        format!("r#{}", name)
    } else {
        name
    }
}

fn pascal_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{MemberKind, MemberSchema, ParametersSchema, RecordSchema};

    #[test]
    fn test_method_names() {
        assert_eq!(method_name("DotnetVersion"), "dotnet_version");
        assert_eq!(method_name("runTests"), "run_tests");
        assert_eq!(method_name("run-tests"), "run_tests");
        assert_eq!(method_name("HTTPServer"), "http_server");
        assert_eq!(method_name("type"), "r#type");
        assert_eq!(method_name("2fa"), "_2fa");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("BuildParameters"), "BuildParameters");
        assert_eq!(pascal_case("deploy_settings"), "DeploySettings");
    }

    #[test]
    fn test_render_nested_accessors() {
        let schema = ParametersSchema::default()
            .with_record(
                RecordSchema::new("BuildParameters")
                    .with_member(MemberSchema::new("Configuration", MemberKind::String).with_alias("configuration"))
                    .with_member(MemberSchema::new("Deploy", MemberKind::Record("DeploySettings".into())).with_alias("deploy")),
            )
            .with_record(
                RecordSchema::new("DeploySettings").with_member(MemberSchema::new("region", MemberKind::String)),
            );
        let source = render_accessors(&schema.accessors("BuildParameters").unwrap()).unwrap();

        assert!(source.contains("use pipeline_core::ParameterReference;"));
        assert!(source.contains("pub struct BuildParametersReference;"));
        assert!(source.contains(
            "    pub fn configuration(&self) -> ParameterReference {\n        ParameterReference::new(\"configuration\")"
        ));
        assert!(source.contains("    pub fn deploy(&self) -> BuildParametersDeployReference {\n        BuildParametersDeployReference\n    }"));
        assert!(source.contains("pub struct BuildParametersDeployReference;"));
        assert!(source.contains("ParameterReference::new(\"deploy.region\")"));
        assert!(source.contains("    pub fn reference(&self) -> ParameterReference {\n        ParameterReference::new(\"deploy\")"));
    }

    #[test]
    fn test_members_colliding_as_methods_are_rejected() {
        let schema = ParametersSchema::default().with_record(
            RecordSchema::new("P")
                .with_member(MemberSchema::new("runTests", MemberKind::Boolean))
                .with_member(MemberSchema::new("run_tests", MemberKind::Boolean)),
        );
        let err = render_accessors(&schema.accessors("P").unwrap()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameterSchema(_)));
        assert!(err.to_string().contains("run_tests"));
    }

    #[test]
    fn test_member_named_reference_clashes_in_nested_struct() {
        let schema = ParametersSchema::default()
            .with_record(RecordSchema::new("Root").with_member(MemberSchema::new("deploy", MemberKind::Record("Deploy".into()))))
            .with_record(RecordSchema::new("Deploy").with_member(MemberSchema::new("reference", MemberKind::String)));
        let err = render_accessors(&schema.accessors("Root").unwrap()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameterSchema(_)));
    }

    #[test]
    fn test_nested_struct_names_must_be_unique() {
        let schema = ParametersSchema::default()
            .with_record(
                RecordSchema::new("Root")
                    .with_member(MemberSchema::new("a", MemberKind::Record("A".into())))
                    .with_member(MemberSchema::new("aB", MemberKind::Record("Leaf".into()))),
            )
            .with_record(RecordSchema::new("A").with_member(MemberSchema::new("b", MemberKind::Record("Leaf".into()))))
            .with_record(RecordSchema::new("Leaf").with_member(MemberSchema::new("x", MemberKind::String)));
        let err = render_accessors(&schema.accessors("Root").unwrap()).unwrap_err();
        assert!(err.to_string().contains("RootABReference"));
    }

    #[test]
    fn test_generated_identifiers_are_unique() {
        let schema = ParametersSchema::default()
            .with_record(
                RecordSchema::new("Root")
                    .with_member(MemberSchema::new("first", MemberKind::Record("Leaf".into())))
                    .with_member(MemberSchema::new("second", MemberKind::Record("Leaf".into())))
                    .with_member(MemberSchema::new("type", MemberKind::String)),
            )
            .with_record(RecordSchema::new("Leaf").with_member(MemberSchema::new("x", MemberKind::String)));
        let source = render_accessors(&schema.accessors("Root").unwrap()).unwrap();

        let structs: Vec<&str> = source
            .lines()
            .filter_map(|line| line.strip_prefix("pub struct "))
            .collect();
        assert_eq!(structs, vec!["RootReference;", "RootFirstReference;", "RootSecondReference;"]);
        assert!(source.contains("pub fn r#type(&self)"));
    }
}
