use anyhow::{Context, Result};
use zdd::config::Config;
use zdd::scaffold::create_deployment;

pub fn run(config: &Config, name: &str, json: bool) -> Result<()> {
    let root = config.absolute_deployments_path();

    let deployment = create_deployment(&root, name).context("failed to create deployment")?;

    if json {
        let value = serde_json::json!({
            "id": deployment.id.as_str(),
            "name": deployment.name,
            "directory": deployment.directory.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Created deployment {}", deployment.directory.display());
    }

    Ok(())
}
