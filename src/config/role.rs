use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Role configuration section.
///
/// For example:
///
/// ```yaml
/// role:
///   name: svcA
///   app: orders-app
/// ```
///
/// `name` becomes the Vault database role (`database/roles/<name>`) and the policy
/// `<name>_policy`. `app` names the token role `<app>_rw` or `<app>_ro`.
/// Both are used verbatim as Vault path segments.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub name: String,
    pub app: String,
}

impl RoleSpec {
    pub fn new(name: &str, app: &str) -> Self {
        Self {
            name: name.to_string(),
            app: app.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_identifier("role name", &self.name)?;
        validate_identifier("app name", &self.app)?;

        Ok(())
    }

    /// Name of the ACL policy granting read on the role credentials
    pub fn policy_name(&self) -> String {
        format!("{}_policy", self.name)
    }

    /// Name of the token role, `suffix` is `rw` or `ro`
    pub fn token_role_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.app, suffix)
    }
}

/// Only letters, numbers, underscores and hyphens are allowed
pub(crate) fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(anyhow!("{} is empty", field));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(anyhow!(
            "invalid {}: {}, can only contain letters, numbers, underscores, and hyphens",
            field,
            value
        ));
    }

    Ok(())
}
