// PR Pipeline
// Builds a pull request pipeline with a conditioned variable block and writes its YAML

use pipeline_core::config::PublishConfig;
use pipeline_core::prelude::*;
use pipeline_core::publish::{FileSink, Publisher};
use pipeline_core::utils::caller_dir;
use std::path::PathBuf;

struct PrPipeline;

impl PipelineDefinition for PrPipeline {
    fn target_file(&self) -> PathBuf {
        PathBuf::from("pr.yml")
    }

    fn target_path_type(&self) -> TargetPathType {
        TargetPathType::RelativeToCaller
    }

    fn document(&self) -> PipelineResult<PipelineDocument> {
        let configuration = TemplateParameter::string("configuration").with_default("Release");
        let config_ref = configuration.reference()?;

        Ok(SingleStagePipeline {
            pr: Some(PrTrigger::new("main")),
            parameters: vec![configuration],
            variables: vec![Condition::is_branch("net-6.0")
                .variable("DotnetVersion", "6.0.100")
                .else_()
                .variable("DotnetVersion", "5.0.202")
                .into()],
            jobs: vec![Job::new("Build")
                .with_pool(HostedPool::vm_image("ubuntu-latest"))
                .with_step(Step::use_dotnet_sdk(Scalar::variable("DotnetVersion")))
                .with_step(Step::bash(format!("dotnet build -c {}\n", config_ref)))
                .with_step(Condition::is_pull_request().step(Step::bash("echo 'PR build'\n")))
                .into()],
            ..Default::default()
        }
        .into())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let publisher = Publisher::new(FileSink::new(caller_dir()), PublishConfig::default());
    let outcome = publisher.publish(&PrPipeline)?;
    println!("pr.yml: {:?}", outcome);
    Ok(())
}
