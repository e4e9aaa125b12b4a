use crate::output;

use std::fs;
use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use tracing::{debug, info};

use pipeline_core::{render_accessors, AccessorGroup, MemberKind, ParametersSchema};

/// Generate typed parameter accessors from a parameters schema
#[derive(Args, Debug)]
pub struct AccessorsArgs {
    /// Path to the parameters schema YAML file
    pub schema: PathBuf,

    /// Record to generate accessors for
    #[arg(long, value_name = "NAME")]
    pub root: String,

    /// Write the generated source here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// List the flattened parameter paths instead of generating source
    #[arg(long, conflicts_with = "output")]
    pub list: bool,
}

pub fn execute(args: AccessorsArgs) -> Result<()> {
    if !args.schema.exists() {
        bail!("Schema file not found: {}", args.schema.display());
    }

    let content = fs::read_to_string(&args.schema)
        .wrap_err_with(|| format!("Failed to read {}", args.schema.display()))?;
    let group = load_group(&content, &args.root)?;
    debug!(record = %group.record, members = group.members.len(), "flattened parameters");

    if args.list {
        for (path, kind) in listing(&group) {
            output::row(&path, &kind);
        }
        return Ok(());
    }

    let source = render_accessors(&group)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
            }
            if fs::read_to_string(path).ok().as_deref() == Some(source.as_str()) {
                info!(path = %path.display(), "accessors unchanged");
                return Ok(());
            }
            fs::write(path, &source).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            output::status("Generated", &format!("{}", path.display()));
            output::success(&format!("{} accessors for '{}'", group.references().len(), args.root));
        }
        None => print!("{}", source),
    }

    Ok(())
}

fn load_group(content: &str, root: &str) -> Result<AccessorGroup> {
    let schema = ParametersSchema::from_yaml_str(content)?;
    if schema.record(root).is_none() {
        bail!("Record '{}' is not declared in the schema", root);
    }
    Ok(schema.accessors(root)?)
}

/// Parameter path and kind of every accessor, depth first
fn listing(group: &AccessorGroup) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    for accessor in &group.members {
        let kind = match &accessor.kind {
            MemberKind::String => "string".to_string(),
            MemberKind::Number => "number".to_string(),
            MemberKind::Boolean => "boolean".to_string(),
            MemberKind::Object => "object".to_string(),
            MemberKind::Record(name) => name.clone(),
        };
        rows.push((accessor.reference.path().to_string(), kind));
        if let Some(nested) = &accessor.nested {
            rows.extend(listing(nested));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
records:
  - name: BuildParameters
    base: CommonParameters
    members:
      - name: Configuration
        alias: configuration
      - name: Deploy
        alias: deploy
        type: DeploySettings
  - name: CommonParameters
    members:
      - name: runTests
        type: boolean
      - name: EqualityContract
        type: object
        synthesized: true
  - name: DeploySettings
    members:
      - name: region
"#;

    #[test]
    fn test_listing_flattens_nested_records() {
        let group = load_group(SCHEMA, "BuildParameters").unwrap();
        let rows = listing(&group);
        let paths: Vec<&str> = rows.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(paths, vec!["configuration", "deploy", "deploy.region", "runTests"]);
        assert_eq!(rows[1].1, "DeploySettings");
        assert_eq!(rows[3].1, "boolean");
    }

    #[test]
    fn test_unknown_root_record() {
        let err = load_group(SCHEMA, "Missing").unwrap_err();
        assert!(err.to_string().contains("'Missing' is not declared"));
    }

    #[test]
    fn test_writes_generated_source() {
        let temp = tempfile::tempdir().unwrap();
        let schema = temp.path().join("parameters.yml");
        fs::write(&schema, SCHEMA).unwrap();
        let output = temp.path().join("generated").join("parameters.rs");

        execute(AccessorsArgs {
            schema,
            root: "BuildParameters".to_string(),
            output: Some(output.clone()),
            list: false,
        })
        .unwrap();

        let source = fs::read_to_string(&output).unwrap();
        assert!(source.contains("pub struct BuildParametersReference;"));
        assert!(source.contains("pub fn run_tests(&self) -> ParameterReference"));
        assert!(!source.contains("equality_contract"));
    }

    #[test]
    fn test_missing_schema_file() {
        let err = execute(AccessorsArgs {
            schema: PathBuf::from("/nonexistent/parameters.yml"),
            root: "BuildParameters".to_string(),
            output: None,
            list: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("Schema file not found"));
    }

    #[test]
    fn test_colliding_members_fail_without_writing() {
        let temp = tempfile::tempdir().unwrap();
        let schema = temp.path().join("parameters.yml");
        fs::write(
            &schema,
            "records:\n  - name: P\n    members:\n      - name: runTests\n      - name: run_tests\n",
        )
        .unwrap();
        let output = temp.path().join("parameters.rs");

        let err = execute(AccessorsArgs {
            schema,
            root: "P".to_string(),
            output: Some(output.clone()),
            list: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("run_tests"));
        assert!(!output.exists());
    }
}
