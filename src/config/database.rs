use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission level granted on a database.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    None,
    ReadOnly,
    ReadWrite,
}

impl Permission {
    /// Privileges listed in the `GRANT` statement, `None` grants nothing
    pub fn privileges(&self) -> Option<&'static str> {
        match self {
            Permission::None => None,
            Permission::ReadOnly => Some("SELECT"),
            Permission::ReadWrite => Some("SELECT, UPDATE, INSERT, DELETE, EXECUTE"),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Permission::None => write!(f, "None"),
            Permission::ReadOnly => write!(f, "ReadOnly"),
            Permission::ReadWrite => write!(f, "ReadWrite"),
        }
    }
}

/// A database on the target server and the permission requested on it.
///
/// For example:
///
/// ```yaml
/// databases:
///   - name: orders
///     permission: ReadWrite
///   - name: audit
///     permission: ReadOnly
///     selected: false
/// ```
///
/// Only selected databases with a permission other than `None` are rendered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseSelection {
    pub name: String,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

fn default_selected() -> bool {
    true
}

impl DatabaseSelection {
    pub fn new(name: &str, permission: Permission) -> Self {
        Self {
            name: name.to_string(),
            permission,
            selected: true,
        }
    }

    /// Whether this entry takes part in rendering and provisioning
    pub fn is_active(&self) -> bool {
        self.selected && self.permission != Permission::None
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(anyhow!("database name is empty"));
        }

        // rendered statements are one per line
        if self.name.chars().any(|c| c.is_control()) {
            return Err(anyhow!(
                "invalid database name: {:?}, must not contain control characters",
                self.name
            ));
        }

        Ok(())
    }
}
