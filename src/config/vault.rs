use super::role::validate_identifier;
use anyhow::{anyhow, Result};
use envmnt::{ExpandOptions, ExpansionType};
use log::warn;
use serde::{Deserialize, Serialize};

/// Vault configuration section.
/// The token on the connection should be allowed to write database roles, ACL policies
/// and token roles, and to create tokens from a token role.
///
/// For example:
/// ```yaml
/// vault:
///   address: ${VAULT_ADDR:http://127.0.0.1:8200}
///   token: ${VAULT_TOKEN}
///   db_config: DCIR-DEVDB
/// ```
///
/// `db_config` is the name of the database secrets engine connection
/// (`database/config/<db_config>`) the new role is attached to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VaultSettings {
    pub address: String,
    #[serde(skip_serializing, default)]
    pub token: String,
    pub db_config: String,
}

impl VaultSettings {
    pub fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(anyhow!("vault address is empty"));
        }

        // used as a single path segment
        validate_identifier("vault db_config", &self.db_config)?;

        Ok(())
    }

    /// Expand environment variables in the `address` and `token` fields.
    /// For example: `token: ${VAULT_TOKEN}`
    pub fn expand_env_vars(&self) -> Result<Self> {
        let mut vault = self.clone();

        vault.address = envmnt::expand(&self.address, Some(expand_options()));
        vault.token = envmnt::expand(&self.token, Some(expand_options()));

        // Most likely, the user forgot to export the environment variables.
        if vault.address.contains("${") {
            warn!(
                "The vault address may not have fully expanded environment variables: {}",
                vault.address
            );
        }
        if vault.token.contains("${") {
            warn!("The vault token may not have fully expanded environment variables");
        }
        if vault.token.is_empty() {
            warn!(
                "The vault token is empty, requests to {} will be rejected",
                vault.address
            );
        }

        Ok(vault)
    }
}

fn expand_options() -> ExpandOptions {
    ExpandOptions {
        expansion_type: Some(ExpansionType::UnixBracketsWithDefaults),
        default_to_empty: false,
    }
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: String::new(),
            db_config: String::new(),
        }
    }
}
