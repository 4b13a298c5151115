use crate::config::Config;
use crate::render::render;
use crate::statement::group_text;
use anyhow::Result;
use log::info;
use std::path::Path;

/// Render the statements, policy and token role command for the given config
/// and print them to stdout. Nothing is sent to Vault.
pub fn gen(target: &Path) -> Result<()> {
    let config = Config::new(target)?;
    let artifacts = render(&config.selected_databases(), &config.role);

    info!(
        "Generated for role {} on {}",
        config.role.name, config.vault.db_config
    );

    println!("-- Creation statements");
    println!("{}", artifacts.creation_statements);
    println!();
    println!("-- Revocation statements");
    println!("{}", artifacts.revocation_statements);
    println!();
    println!("-- Policy");
    println!("{}", artifacts.policy_document);
    println!();
    println!("-- Token role");
    println!("{}", artifacts.token_role_command);
    println!();
    println!("-- Creation batches");
    for batch in group_text(&artifacts.creation_statements) {
        println!("{}", batch);
    }
    println!();
    println!("-- Revocation batches");
    for batch in group_text(&artifacts.revocation_statements) {
        println!("{}", batch);
    }

    Ok(())
}
