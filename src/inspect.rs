use crate::config::Config;
use crate::connection::{VaultApi, VaultConnection};
use crate::provision::allowed_roles;
use ansi_term::Colour::{Green, Yellow};
use anyhow::{anyhow, Result};
use ascii_table::AsciiTable;
use log::info;

/// Show the `allowed_roles` of the Vault database config and whether
/// the configured role is already one of them.
pub fn inspect(config: &Config) -> Result<()> {
    let conn = VaultConnection::new(&config.vault)?;
    let allowed_roles = get_allowed_roles(&conn, &config.vault.db_config)?;

    let mut roles = allowed_roles
        .iter()
        .map(|r| {
            let mark = if *r == config.role.name {
                Green.paint("<- this role").to_string()
            } else {
                "".to_string()
            };
            vec![r.clone(), mark]
        })
        .collect::<Vec<_>>();

    roles.insert(0, vec!["Allowed Role".to_string(), "".to_string()]);
    roles.insert(1, vec!["---".to_string(), "---".to_string()]);

    // Get the terminal with
    let term_width = term_size::dimensions().map(|(w, _)| w).unwrap_or(120) - 5;

    let mut table = AsciiTable::default();
    table.set_max_width(term_width);

    info!(
        "Allowed roles of database/config/{} in {}:\n{}",
        config.vault.db_config,
        conn.address(),
        table.format(roles)
    );

    if !allowed_roles.contains(&config.role.name) {
        info!(
            "{}: role {} is not allowed yet, `apply` will add it",
            Yellow.paint("Missing"),
            config.role.name
        );
    }

    Ok(())
}

/// Read `data.allowed_roles` of a database config
pub fn get_allowed_roles(vault: &impl VaultApi, db_config: &str) -> Result<Vec<String>> {
    let resp = vault.read_database_config(db_config)?;
    if !resp.is_success() {
        return Err(anyhow!(
            "failed to get database configuration '{}' ({})",
            db_config,
            resp.status
        ));
    }

    let json = resp.json()?;

    Ok(allowed_roles(&json).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_allowed_roles() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/database/config/DCIR-DEVDB")
            .with_status(200)
            .with_body(r#"{"data":{"allowed_roles":["a","svcA"]}}"#)
            .create();

        let settings = crate::config::VaultSettings {
            address: server.url(),
            token: "s.test".to_string(),
            db_config: "DCIR-DEVDB".to_string(),
        };
        let conn = VaultConnection::new(&settings).unwrap();

        let roles = get_allowed_roles(&conn, "DCIR-DEVDB").unwrap();
        assert_eq!(roles, vec!["a", "svcA"]);
    }

    #[test]
    fn test_get_allowed_roles_not_found() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/database/config/missing")
            .with_status(404)
            .create();

        let settings = crate::config::VaultSettings {
            address: server.url(),
            token: "s.test".to_string(),
            db_config: "missing".to_string(),
        };
        let conn = VaultConnection::new(&settings).unwrap();

        let err = get_allowed_roles(&conn, "missing").unwrap_err();
        assert!(err.to_string().contains("failed to get database configuration"));
    }
}
