use crate::config::Config;
use crate::connection::VaultConnection;
use crate::provision::{ProvisioningPlan, ProvisioningResult, Provisioner, StepStatus};
use ansi_term::Colour::{Green, Purple, Red, Yellow};
use anyhow::{anyhow, Result};
use ascii_table::AsciiTable;
use log::{error, info};
use std::path::Path;

/// Read the config from the given path and provision the role in Vault.
/// If the dryrun flag is set, the requests are only logged.
pub fn apply(target: &Path, dryrun: bool) -> Result<()> {
    let target = target.to_path_buf();

    if target.is_dir() {
        return Err(anyhow!(
            "directory is not supported yet ({})",
            target.display()
        ));
    }

    let config = Config::new(&target)?;
    info!("Applying configuration:\n{}", config);

    let plan = ProvisioningPlan::new(&config);

    if dryrun {
        print_plan(&plan)?;
        return Ok(());
    }

    let conn = VaultConnection::new(&config.vault)?;
    info!("Connected to vault: {}", conn.address());

    let result = Provisioner::new(&conn).run(&plan);
    print_summary(&result);

    if !result.success {
        error!("{}: {}", Red.paint("Failed"), result.message);
        return Err(anyhow!("{}", result.message));
    }

    info!("{}: {}", Green.paint("Success"), result.message);
    if let Some(token) = &result.generated_token {
        println!("Generated token: {}", token);
    }

    Ok(())
}

/// Log every request the provisioning would send
fn print_plan(plan: &ProvisioningPlan) -> Result<()> {
    let dryrun = Purple.paint("Dry-run");

    info!("{}: GET database/config/{}", dryrun, plan.db_config);
    info!(
        "{}: POST database/config/{} (add '{}' to allowed_roles if missing)",
        dryrun, plan.db_config, plan.role.name
    );
    info!(
        "{}: POST database/roles/{}\n{}",
        dryrun,
        plan.role.name,
        serde_json::to_string_pretty(&plan.role_payload)?
    );
    info!(
        "{}: POST sys/policies/acl/{}\n{}",
        dryrun, plan.policy_name, plan.artifacts.policy_document
    );
    info!(
        "{}: POST auth/token/roles/{}\n{}",
        dryrun,
        plan.token_role_name,
        serde_json::to_string_pretty(&plan.token_role_payload)?
    );
    info!("{}: POST auth/token/create/{}", dryrun, plan.token_role_name);

    Ok(())
}

/// Print summary table
fn print_summary(result: &ProvisioningResult) {
    let mut summary = vec![vec![
        "Step".to_string(),
        "Path".to_string(),
        "Status".to_string(),
    ]];
    summary.push(vec!["---".to_string(), "---".to_string(), "---".to_string()]);

    for step in &result.steps {
        let status = match step.status {
            StepStatus::Done => Green.paint(step.status.to_string()),
            StepStatus::Skipped => Yellow.paint(step.status.to_string()),
            StepStatus::Failed => Red.paint(step.status.to_string()),
        };
        summary.push(vec![
            step.stage.to_string(),
            step.path.clone(),
            status.to_string(),
        ]);
    }

    let ascii_table = AsciiTable::default();

    info!("Summary:\n{}", ascii_table.format(summary));
}
