use crate::config::VaultSettings;
use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Header carrying the Vault token
const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Status and body of a Vault HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultResponse {
    pub status: u16,
    pub body: String,
}

impl VaultResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).context("could not parse Vault response body as JSON")
    }
}

/// Body of `POST database/roles/<name>`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseRolePayload {
    pub db_name: String,
    pub creation_statements: Vec<String>,
    pub revocation_statements: Vec<String>,
    pub default_ttl: String,
    pub max_ttl: String,
}

/// Body of `POST auth/token/roles/<name>`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenRolePayload {
    pub allowed_policies: Vec<String>,
    pub period: String,
    pub orphan: bool,
    pub display_name: String,
}

/// The Vault endpoints used to provision a database role.
///
/// Any status is returned as a [VaultResponse]; an `Err` means the request could
/// not be sent or its body could not be read.
pub trait VaultApi {
    /// `GET /v1/database/config/<config_name>`
    fn read_database_config(&self, config_name: &str) -> Result<VaultResponse>;

    /// `POST /v1/database/config/<config_name>` with the new `allowed_roles`
    fn update_allowed_roles(
        &self,
        config_name: &str,
        allowed_roles: &[String],
    ) -> Result<VaultResponse>;

    /// `POST /v1/database/roles/<role_name>`
    fn create_database_role(
        &self,
        role_name: &str,
        payload: &DatabaseRolePayload,
    ) -> Result<VaultResponse>;

    /// `POST /v1/sys/policies/acl/<policy_name>`
    fn create_policy(&self, policy_name: &str, policy: &str) -> Result<VaultResponse>;

    /// `POST /v1/auth/token/roles/<role_name>`
    fn create_token_role(&self, role_name: &str, payload: &TokenRolePayload)
        -> Result<VaultResponse>;

    /// `POST /v1/auth/token/create/<role_name>`
    fn create_token(&self, role_name: &str) -> Result<VaultResponse>;
}

/// Blocking HTTP connection to a Vault server.
pub struct VaultConnection {
    address: String,
    token: String,
    client: Client,
}

impl VaultConnection {
    /// Build a connection from the `vault` section of the configuration
    pub fn new(settings: &VaultSettings) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("could not build the HTTP client")?;

        Ok(Self {
            address: settings.address.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            client,
        })
    }

    /// Returns the Vault address
    pub fn address(&self) -> &str {
        &self.address
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path)
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<VaultResponse> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(VAULT_TOKEN_HEADER, &self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .with_context(|| format!("could not send {} {}", method, url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("could not read response of {} {}", method, url))?;

        debug!("{} {} => {}", method, url, status);

        Ok(VaultResponse { status, body })
    }

    fn post<T: Serialize>(&self, path: &str, payload: &T) -> Result<VaultResponse> {
        let body = serde_json::to_value(payload).context("could not serialize request body")?;
        self.send(Method::POST, path, Some(&body))
    }
}

impl VaultApi for VaultConnection {
    fn read_database_config(&self, config_name: &str) -> Result<VaultResponse> {
        self.send(Method::GET, &format!("database/config/{}", config_name), None)
    }

    fn update_allowed_roles(
        &self,
        config_name: &str,
        allowed_roles: &[String],
    ) -> Result<VaultResponse> {
        self.post(
            &format!("database/config/{}", config_name),
            &json!({ "allowed_roles": allowed_roles }),
        )
    }

    fn create_database_role(
        &self,
        role_name: &str,
        payload: &DatabaseRolePayload,
    ) -> Result<VaultResponse> {
        self.post(&format!("database/roles/{}", role_name), payload)
    }

    fn create_policy(&self, policy_name: &str, policy: &str) -> Result<VaultResponse> {
        self.post(
            &format!("sys/policies/acl/{}", policy_name),
            &json!({ "policy": policy }),
        )
    }

    fn create_token_role(
        &self,
        role_name: &str,
        payload: &TokenRolePayload,
    ) -> Result<VaultResponse> {
        self.post(&format!("auth/token/roles/{}", role_name), payload)
    }

    fn create_token(&self, role_name: &str) -> Result<VaultResponse> {
        self.post(&format!("auth/token/create/{}", role_name), &json!({}))
    }
}
