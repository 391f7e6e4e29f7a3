//! Azure DevOps REST client

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::protocol::{patch_document, WiqlRequest, WiqlResponse};
use super::{ItemSource, RemoteError};
use crate::domain::{ChangeRecord, WorkItemId, WorkItemRecord};
use crate::storage::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Item source backed by the Azure DevOps work item tracking API
pub struct AdoClient {
    http: Client,
    base_url: String,
    api_version: String,
    pat_env: String,
    fallback_pat: Option<String>,
    token: OnceLock<String>,
}

impl AdoClient {
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        pat_env: impl Into<String>,
        fallback_pat: Option<String>,
    ) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| RemoteError::Transport {
                what: "HTTP client setup".to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            pat_env: pat_env.into(),
            fallback_pat,
            token: OnceLock::new(),
        })
    }

    /// Builds a client from workspace and global configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = &config.project.remote;
        let base_url = remote.project_url().context("Remote is not configured")?;

        Ok(Self::new(
            base_url,
            remote.api_version.clone(),
            remote.pat_env.clone(),
            config.global.pat.clone(),
        )?)
    }

    /// Returns the project URL requests are made against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/_apis/wit/{}", self.base_url, path)
    }

    /// Resolves the access token on first use and caches it
    fn token(&self) -> Result<&str, RemoteError> {
        if let Some(token) = self.token.get() {
            return Ok(token);
        }

        let token = std::env::var(&self.pat_env)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.fallback_pat.clone().filter(|t| !t.is_empty()))
            .ok_or_else(|| RemoteError::MissingToken(self.pat_env.clone()))?;

        Ok(self.token.get_or_init(|| token))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        let (user, password) = basic_credentials(self.token()?);

        Ok(request
            .basic_auth(user, Some(password))
            .header(ACCEPT, "application/json")
            .header("X-TFS-FedAuthRedirect", "Suppress")
            .query(&[("api-version", self.api_version.as_str())]))
    }

    fn send(&self, what: &str, request: RequestBuilder) -> Result<Response, RemoteError> {
        log::debug!("{}", what);

        let response = self
            .authorized(request)?
            .send()
            .map_err(|source| RemoteError::Transport {
                what: what.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(RemoteError::Status {
            what: what.to_string(),
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        })
    }
}

impl ItemSource for AdoClient {
    fn list_ids(&self) -> Result<Vec<WorkItemId>, RemoteError> {
        let what = "work item query";
        let request = self.http.post(self.endpoint("wiql")).json(&WiqlRequest::all_items());

        let response: WiqlResponse =
            self.send(what, request)?
                .json()
                .map_err(|e| RemoteError::InvalidResponse {
                    what: what.to_string(),
                    message: e.to_string(),
                })?;

        Ok(response.work_items.into_iter().map(|r| r.id).collect())
    }

    fn fetch(&self, id: WorkItemId) -> Result<WorkItemRecord, RemoteError> {
        let what = format!("fetch of work item {}", id);
        let request = self
            .http
            .get(self.endpoint(&format!("workitems/{}", id)))
            .query(&[("$expand", "all")]);

        self.send(&what, request)?
            .json()
            .map_err(|e| RemoteError::InvalidResponse {
                what,
                message: e.to_string(),
            })
    }

    fn apply_update(&self, change: &ChangeRecord) -> Result<(), RemoteError> {
        let what = format!("update of work item {}", change.id);
        let request = self
            .http
            .patch(self.endpoint(&format!("workitems/{}", change.id)))
            .header(CONTENT_TYPE, "application/json-patch+json")
            .json(&patch_document(change));

        self.send(&what, request)?;
        Ok(())
    }
}

/// Splits a token into basic-auth user and password
///
/// A token of the form `user:password` is used as is; a bare token is sent
/// as the password with an empty user.
fn basic_credentials(token: &str) -> (&str, &str) {
    token.split_once(':').unwrap_or(("", token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AdoClient {
        AdoClient::new(
            "https://dev.azure.com/acme/shop/",
            "7.0",
            "WORKITEMS_TEST_UNSET_TOKEN_VAR",
            None,
        )
        .unwrap()
    }

    #[test]
    fn bare_token_is_password() {
        assert_eq!(basic_credentials("abc123"), ("", "abc123"));
    }

    #[test]
    fn user_and_password_token_is_split() {
        assert_eq!(basic_credentials("me@acme.io:abc123"), ("me@acme.io", "abc123"));
    }

    #[test]
    fn endpoints_are_under_project() {
        let client = client();

        assert_eq!(client.base_url(), "https://dev.azure.com/acme/shop");
        assert_eq!(
            client.endpoint("workitems/7"),
            "https://dev.azure.com/acme/shop/_apis/wit/workitems/7"
        );
    }

    #[test]
    fn missing_token_is_reported() {
        let err = client().token().unwrap_err();
        assert!(matches!(
            err,
            RemoteError::MissingToken(ref var) if var == "WORKITEMS_TEST_UNSET_TOKEN_VAR"
        ));
    }

    #[test]
    fn fallback_token_is_cached() {
        let client = AdoClient::new(
            "https://dev.azure.com/acme/shop",
            "7.0",
            "WORKITEMS_TEST_UNSET_TOKEN_VAR",
            Some("from-config".to_string()),
        )
        .unwrap();

        assert_eq!(client.token().unwrap(), "from-config");
        assert_eq!(client.token.get().map(String::as_str), Some("from-config"));
    }
}
