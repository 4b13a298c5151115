use crate::config::{Config, RoleSpec};
use crate::connection::{DatabaseRolePayload, TokenRolePayload, VaultApi, VaultResponse};
use crate::merge::merge_allowed_roles;
use crate::render::{render, GeneratedArtifacts, TOKEN_PERIOD};
use crate::statement::group_text;
use anyhow::Result;
use log::{error, info, warn};
use serde_json::Value;
use std::fmt;

/// Lease bounds of the credentials issued from the database role
pub const DEFAULT_TTL: &str = "1h";
pub const MAX_TTL: &str = "12h";

const UNEXPECTED_ERROR: &str = "Error occurred while creating Vault configurations.";

/// Stage at which provisioning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    None,
    ConfigFetch,
    ConfigUpdate,
    RoleCreate,
    PolicyCreate,
    TokenRoleCreate,
    TokenCreate,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FailureStage::None => write!(f, "none"),
            FailureStage::ConfigFetch => write!(f, "config fetch"),
            FailureStage::ConfigUpdate => write!(f, "config update"),
            FailureStage::RoleCreate => write!(f, "role create"),
            FailureStage::PolicyCreate => write!(f, "policy create"),
            FailureStage::TokenRoleCreate => write!(f, "token role create"),
            FailureStage::TokenCreate => write!(f, "token create"),
        }
    }
}

/// Outcome of one step, used for the summary table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Skipped,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StepStatus::Done => write!(f, "done"),
            StepStatus::Skipped => write!(f, "skipped"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub stage: FailureStage,
    pub path: String,
    pub status: StepStatus,
}

/// Result of one provisioning run.
///
/// On failure, `failure_stage` names the step that failed and `message` is safe to
/// show to the user; status, body and error details are only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub success: bool,
    pub generated_token: Option<String>,
    pub failure_stage: FailureStage,
    pub message: String,
    pub steps: Vec<StepReport>,
}

/// Everything sent to Vault for one role, derived from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningPlan {
    pub db_config: String,
    pub role: RoleSpec,
    pub artifacts: GeneratedArtifacts,
    pub role_payload: DatabaseRolePayload,
    pub policy_name: String,
    pub token_role_name: String,
    pub token_role_payload: TokenRolePayload,
}

impl ProvisioningPlan {
    pub fn new(config: &Config) -> Self {
        let artifacts = render(&config.selected_databases(), &config.role);
        let policy_name = config.role.policy_name();
        let token_role_name = config.role.token_role_name(artifacts.token_role_suffix);

        let role_payload = DatabaseRolePayload {
            db_name: config.vault.db_config.clone(),
            creation_statements: group_text(&artifacts.creation_statements),
            revocation_statements: group_text(&artifacts.revocation_statements),
            default_ttl: DEFAULT_TTL.to_string(),
            max_ttl: MAX_TTL.to_string(),
        };

        let token_role_payload = TokenRolePayload {
            allowed_policies: vec![policy_name.clone()],
            period: TOKEN_PERIOD.to_string(),
            orphan: true,
            display_name: token_role_name.clone(),
        };

        Self {
            db_config: config.vault.db_config.clone(),
            role: config.role.clone(),
            artifacts,
            role_payload,
            policy_name,
            token_role_name,
            token_role_payload,
        }
    }
}

/// A failed step: the stage and the message shown to the user
struct Failure {
    stage: FailureStage,
    message: String,
}

/// Runs the provisioning steps against Vault, one at a time, stopping at the first failure.
///
/// Objects created before a failing step are left in place. The `allowed_roles` update
/// is a plain read then write, a role added by another client in between can be lost.
pub struct Provisioner<'a, V: VaultApi> {
    vault: &'a V,
    steps: Vec<StepReport>,
}

impl<'a, V: VaultApi> Provisioner<'a, V> {
    pub fn new(vault: &'a V) -> Self {
        Self {
            vault,
            steps: vec![],
        }
    }

    pub fn run(mut self, plan: &ProvisioningPlan) -> ProvisioningResult {
        match self.provision(plan) {
            Ok(token) => ProvisioningResult {
                success: true,
                generated_token: Some(token),
                failure_stage: FailureStage::None,
                message: "Vault role, token role, and token created successfully!".to_string(),
                steps: self.steps,
            },
            Err(failure) => ProvisioningResult {
                success: false,
                generated_token: None,
                failure_stage: failure.stage,
                message: failure.message,
                steps: self.steps,
            },
        }
    }

    fn provision(&mut self, plan: &ProvisioningPlan) -> Result<String, Failure> {
        let config_path = format!("database/config/{}", plan.db_config);

        // Fetch the connection config and merge the role into its allowed_roles
        let resp = self.call(plan, FailureStage::ConfigFetch, &config_path, |v| {
            v.read_database_config(&plan.db_config)
        })?;
        let current = self.decode(FailureStage::ConfigFetch, &resp, allowed_roles)?;
        let (merged, changed) = merge_allowed_roles(&current, &plan.role.name);

        if changed {
            self.call(plan, FailureStage::ConfigUpdate, &config_path, |v| {
                v.update_allowed_roles(&plan.db_config, &merged)
            })?;
            info!(
                "Added role '{}' to allowed_roles for config '{}'",
                plan.role.name, plan.db_config
            );
        } else {
            info!(
                "Role '{}' is already in allowed_roles for config '{}'",
                plan.role.name, plan.db_config
            );
            self.record(FailureStage::ConfigUpdate, &config_path, StepStatus::Skipped);
        }

        let resp = self.call(
            plan,
            FailureStage::RoleCreate,
            &format!("database/roles/{}", plan.role.name),
            |v| v.create_database_role(&plan.role.name, &plan.role_payload),
        )?;
        info!("Role => {}: {}", resp.status, resp.body);

        self.call(
            plan,
            FailureStage::PolicyCreate,
            &format!("sys/policies/acl/{}", plan.policy_name),
            |v| v.create_policy(&plan.policy_name, &plan.artifacts.policy_document),
        )?;

        self.call(
            plan,
            FailureStage::TokenRoleCreate,
            &format!("auth/token/roles/{}", plan.token_role_name),
            |v| v.create_token_role(&plan.token_role_name, &plan.token_role_payload),
        )?;

        let resp = self.call(
            plan,
            FailureStage::TokenCreate,
            &format!("auth/token/create/{}", plan.token_role_name),
            |v| v.create_token(&plan.token_role_name),
        )?;
        self.decode(FailureStage::TokenCreate, &resp, client_token)
    }

    /// Send one request; a transport error or a non-success status fails the stage
    fn call<F>(
        &mut self,
        plan: &ProvisioningPlan,
        stage: FailureStage,
        path: &str,
        f: F,
    ) -> Result<VaultResponse, Failure>
    where
        F: FnOnce(&V) -> Result<VaultResponse>,
    {
        info!("{}: {}", stage, path);

        let resp = match f(self.vault) {
            Ok(resp) => resp,
            Err(e) => {
                error!("{} failed on {}: {:#}", stage, path, e);
                self.record(stage, path, StepStatus::Failed);
                return Err(Failure {
                    stage,
                    message: UNEXPECTED_ERROR.to_string(),
                });
            }
        };

        if !resp.is_success() {
            error!("{} failed on {} => {}: {}", stage, path, resp.status, resp.body);
            self.record(stage, path, StepStatus::Failed);
            return Err(Failure {
                stage,
                message: failure_message(stage, &plan.db_config),
            });
        }

        self.record(stage, path, StepStatus::Done);

        Ok(resp)
    }

    /// Extract a value from a successful response; a malformed body fails the stage
    fn decode<T>(
        &mut self,
        stage: FailureStage,
        resp: &VaultResponse,
        extract: fn(&Value) -> Option<T>,
    ) -> Result<T, Failure> {
        let value = resp.json().ok().and_then(|json| extract(&json));

        value.ok_or_else(|| {
            error!("{}: unexpected response body: {}", stage, redact(stage, &resp.body));
            if let Some(step) = self.steps.last_mut() {
                step.status = StepStatus::Failed;
            }
            Failure {
                stage,
                message: UNEXPECTED_ERROR.to_string(),
            }
        })
    }

    fn record(&mut self, stage: FailureStage, path: &str, status: StepStatus) {
        self.steps.push(StepReport {
            stage,
            path: path.to_string(),
            status,
        });
    }
}

/// `data.allowed_roles` of a database config; absent or not an array is empty
pub(crate) fn allowed_roles(json: &Value) -> Option<Vec<String>> {
    let roles = match json["data"]["allowed_roles"].as_array() {
        Some(roles) => roles
            .iter()
            .filter_map(|r| r.as_str())
            .filter(|r| !r.is_empty())
            .map(|r| r.to_string())
            .collect(),
        None => {
            warn!("no allowed_roles in database config, starting from an empty list");
            vec![]
        }
    };

    Some(roles)
}

/// `auth.client_token` of a token creation response
fn client_token(json: &Value) -> Option<String> {
    json["auth"]["client_token"].as_str().map(|t| t.to_string())
}

/// Token responses are not logged as is
fn redact(stage: FailureStage, body: &str) -> &str {
    match stage {
        FailureStage::TokenCreate => "<redacted>",
        _ => body,
    }
}

fn failure_message(stage: FailureStage, db_config: &str) -> String {
    match stage {
        FailureStage::ConfigFetch => {
            format!("Failed to get database configuration '{}'.", db_config)
        }
        FailureStage::ConfigUpdate => {
            "Failed to update database configuration with new allowed role.".to_string()
        }
        FailureStage::RoleCreate => "Failed to create Vault role.".to_string(),
        FailureStage::PolicyCreate => "Failed to create Vault policy.".to_string(),
        FailureStage::TokenRoleCreate => "Failed to create Vault token role.".to_string(),
        FailureStage::TokenCreate => "Failed to create Vault token.".to_string(),
        FailureStage::None => UNEXPECTED_ERROR.to_string(),
    }
}
