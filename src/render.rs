use crate::config::{DatabaseSelection, Permission, RoleSpec};
use indoc::formatdoc;

/// Placeholders substituted by Vault when it issues credentials
pub const NAME_PLACEHOLDER: &str = "{{name}}";
pub const PASSWORD_PLACEHOLDER: &str = "{{password}}";

/// Token role period, tokens are renewable for this long without re-authentication
pub const TOKEN_PERIOD: &str = "720h";

/// Statements and documents rendered for one role and one set of selected databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub creation_statements: String,
    pub revocation_statements: String,
    pub policy_document: String,
    pub token_role_command: String,
    /// `rw` when any database is `ReadWrite`, `ro` otherwise
    pub token_role_suffix: &'static str,
}

/// Render the SQL Server templates, the Vault policy and the token role command.
///
/// Entries that are not selected or have no permission are skipped.
/// Output lines follow the order of `selections`.
pub fn render(selections: &[DatabaseSelection], role: &RoleSpec) -> GeneratedArtifacts {
    let user = format!("[{}]", NAME_PLACEHOLDER);

    let mut creation = vec![format!(
        "CREATE LOGIN {} WITH PASSWORD = '{}';",
        user, PASSWORD_PLACEHOLDER
    )];
    let mut revocation = vec![format!("DROP LOGIN {};", user)];

    for selection in selections.iter().filter(|s| s.is_active()) {
        let privileges = match selection.permission.privileges() {
            Some(privileges) => privileges,
            None => continue,
        };
        let use_database = format!("USE {};", quote_identifier(&selection.name));

        creation.push(use_database.clone());
        creation.push(format!("CREATE USER {} FOR LOGIN {};", user, user));
        creation.push(format!("GRANT {} TO {};", privileges, user));

        revocation.push(use_database);
        revocation.push(format!("DROP USER IF EXISTS {};", user));
    }

    let token_role_suffix = token_role_suffix(selections);
    let policy_name = role.policy_name();

    let policy_document = formatdoc! {r#"
        # Vault Policy for {role}
        path "database/creds/{role}" {{
          capabilities = [ "read" ]
        }}"#,
        role = role.name,
    };

    let token_role_command = format!(
        "vault write auth/token/roles/{} allowed_policies=\"{}\" period={}",
        role.token_role_name(token_role_suffix),
        policy_name,
        TOKEN_PERIOD
    );

    GeneratedArtifacts {
        creation_statements: creation.join("\n"),
        revocation_statements: revocation.join("\n"),
        policy_document,
        token_role_command,
        token_role_suffix,
    }
}

/// `rw` if any selected database is granted `ReadWrite`, otherwise `ro`
pub fn token_role_suffix(selections: &[DatabaseSelection]) -> &'static str {
    if selections
        .iter()
        .any(|s| s.is_active() && s.permission == Permission::ReadWrite)
    {
        "rw"
    } else {
        "ro"
    }
}

/// Quote a SQL Server identifier with brackets, a `]` is escaped by doubling it
fn quote_identifier(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}
