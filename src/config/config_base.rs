use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::{fmt, fs};

pub use super::database::{DatabaseSelection, Permission};
pub use super::role::RoleSpec;
pub use super::vault::VaultSettings;

/// Configuration contains all the information needed to provision dynamic credentials
/// in Vault for a set of databases.
///  - `vault`: the Vault address, token and the database connection name in Vault.
///  - `role`: the Vault role name and the application name used for the token role.
///  - `databases`: the databases on the server and the permission on each of them.
///
/// For example:
///
/// ```yaml
/// vault:
///   address: ${VAULT_ADDR:http://127.0.0.1:8200}
///   token: ${VAULT_TOKEN}
///   db_config: DCIR-DEVDB
///
/// role:
///   name: svcA
///   app: orders-app
///
/// databases:
///   - name: orders
///     permission: ReadWrite
///   - name: reporting
///     permission: ReadOnly
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub vault: VaultSettings,
    pub role: RoleSpec,
    pub databases: Vec<DatabaseSelection>,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let yaml = serde_yaml::to_string(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml)
    }
}

impl std::str::FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(s)?;

        // Validate
        config.validate()?;

        Ok(config)
    }
}

impl Config {
    pub fn new(config_path: &Path) -> Result<Self> {
        let config_path = config_path.to_path_buf();
        let config_str = fs::read_to_string(&config_path).context("failed to read config file")?;
        let config: Config = serde_yaml::from_str(&config_str)?;

        config.validate()?;

        // expand env variables
        let config = config.expand_env_vars()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Validate vault
        self.vault.validate()?;

        // Validate role
        self.role.validate()?;

        // Validate databases
        for database in &self.databases {
            database.validate()?;
        }
        // Validate databases are unique by name
        let mut database_names = HashSet::new();
        for database in &self.databases {
            if !database_names.insert(database.name.as_str()) {
                return Err(anyhow!("duplicated database: {}", database.name));
            }
        }

        if self.selected_databases().is_empty() {
            return Err(anyhow!(
                "no database selected, select at least one database with permissions"
            ));
        }

        Ok(())
    }

    /// Databases that are selected and have a permission other than `None`
    pub fn selected_databases(&self) -> Vec<DatabaseSelection> {
        self.databases
            .iter()
            .filter(|d| d.is_active())
            .cloned()
            .collect()
    }

    // Expand env variables in config
    fn expand_env_vars(&self) -> Result<Self> {
        let mut config = self.clone();

        // expand vault
        config.vault = config.vault.expand_env_vars()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;
    use std::path::PathBuf;
    use std::str::FromStr;
    use tempfile::NamedTempFile;

    #[test]
    #[should_panic(expected = "failed to get content: invalid type: string")]
    fn test_with_basic_config() {
        let _text = "bad yaml content";
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(_text.as_bytes())
            .expect("failed to write to temp file");
        let path = PathBuf::from(file.path().to_str().unwrap());

        Config::new(&path).expect("failed to get content");
    }

    // Test config with minimum valid YAML
    #[test]
    fn test_read_config_basic_config() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   token: root
                   db_config: DCIR-DEVDB
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadWrite
             "};

        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(_text.as_bytes())
            .expect("failed to write to temp file");
        let path = PathBuf::from(file.path().to_str().unwrap());

        let config = Config::new(&path).expect("failed to get content");
        assert_eq!(config.vault.token, "root");
        assert_eq!(config.role.name, "svcA");
        assert_eq!(config.databases.len(), 1);
        assert_eq!(config.databases[0].permission, Permission::ReadWrite);
        assert!(config.databases[0].selected);
    }

    // Config::from_str and Config::new should return the same result
    #[test]
    fn test_read_config_from_str_and_new() {
        let _text = indoc! {"
             vault:
               address: http://127.0.0.1:8200
               token: root
               db_config: DCIR-DEVDB
             role:
               name: svcA
               app: orders
             databases:
               - name: orders
                 permission: ReadOnly
        "};

        let config_1 = Config::from_str(_text).expect("failed to get content");

        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(_text.as_bytes())
            .expect("failed to write to temp file");
        let path = PathBuf::from(file.path().to_str().unwrap());
        let config_2 = Config::new(&path).expect("failed to get content");

        assert_eq!(config_1, config_2);
    }

    // Test config with token from environment variable
    #[test]
    fn test_read_config_with_env_var() {
        envmnt::set("VAULT_GRANT_CONFIG_TOKEN", "s.token");

        let _text = indoc! {"
                 vault:
                   address: ${VAULT_GRANT_CONFIG_ADDR:http://vault:8200}
                   token: ${VAULT_GRANT_CONFIG_TOKEN}
                   db_config: DCIR-DEVDB
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadOnly
             "};

        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(_text.as_bytes())
            .expect("failed to write to temp file");
        let path = PathBuf::from(file.path().to_str().unwrap());

        let config = Config::new(&path).expect("failed to get content");

        assert_eq!(config.vault.address, "http://vault:8200");
        assert_eq!(config.vault.token, "s.token");

        envmnt::remove("VAULT_GRANT_CONFIG_TOKEN");
    }

    // Test config with invalid permission
    #[test]
    #[should_panic(expected = "unknown variant `Admin`")]
    fn test_read_config_invalid_permission() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   db_config: DCIR-DEVDB
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: Admin
             "};

        Config::from_str(_text).expect("failed to parse config");
    }

    #[test]
    #[should_panic(expected = "invalid role name: svc.A")]
    fn test_read_config_invalid_role_name() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   db_config: DCIR-DEVDB
                 role:
                   name: svc.A
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadOnly
             "};

        Config::from_str(_text).expect("failed to parse config");
    }

    #[test]
    #[should_panic(expected = "invalid vault db_config: ..")]
    fn test_read_config_dot_dot_db_config() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   db_config: ..
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadOnly
             "};

        Config::from_str(_text).expect("failed to parse config");
    }

    #[test]
    #[should_panic(expected = "duplicated database: orders")]
    fn test_read_config_duplicated_database() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   db_config: DCIR-DEVDB
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadOnly
                   - name: orders
                     permission: ReadWrite
             "};

        Config::from_str(_text).expect("failed to parse config");
    }

    #[test]
    #[should_panic(expected = "no database selected")]
    fn test_read_config_no_database_selected() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   db_config: DCIR-DEVDB
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadWrite
                     selected: false
                   - name: audit
             "};

        Config::from_str(_text).expect("failed to parse config");
    }

    #[test]
    fn test_selected_databases() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   db_config: DCIR-DEVDB
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadWrite
                   - name: audit
                     permission: ReadOnly
                     selected: false
                   - name: archive
                   - name: reporting
                     permission: ReadOnly
             "};

        let config = Config::from_str(_text).expect("failed to parse config");
        let names = config
            .selected_databases()
            .into_iter()
            .map(|d| d.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["orders", "reporting"]);
    }

    // The token must never be printed back
    #[test]
    fn test_display_hides_token() {
        let _text = indoc! {"
                 vault:
                   address: http://127.0.0.1:8200
                   token: s.very-secret
                   db_config: DCIR-DEVDB
                 role:
                   name: svcA
                   app: orders
                 databases:
                   - name: orders
                     permission: ReadWrite
             "};

        let config = Config::from_str(_text).expect("failed to parse config");
        let output = config.to_string();

        assert!(output.contains("db_config: DCIR-DEVDB"));
        assert!(!output.contains("s.very-secret"));
    }
}
