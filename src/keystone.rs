//! Keystone v3 password authentication.
//!
//! Builds the password-auth request, posts it to `<auth_url>/auth/tokens`, and
//! reads the session out of the response: the token comes from the
//! `X-Subject-Token` header and the Swift endpoint from the JSON service catalog.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::contract::{Authenticator, Session};
use crate::error::{Error, Result};
use crate::load_config::Credentials;

/// Timeout for the login request.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(30);

pub const SUBJECT_TOKEN_HEADER: &str = "x-subject-token";

const OBJECT_STORE_TYPE: &str = "object-store";
const PUBLIC_INTERFACE: &str = "public";

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    auth: Auth<'a>,
}

#[derive(Debug, Serialize)]
struct Auth<'a> {
    identity: Identity<'a>,
    scope: Scope<'a>,
}

#[derive(Debug, Serialize)]
struct Identity<'a> {
    methods: [&'static str; 1],
    password: PasswordMethod<'a>,
}

#[derive(Debug, Serialize)]
struct PasswordMethod<'a> {
    user: User<'a>,
}

#[derive(Debug, Serialize)]
struct User<'a> {
    domain: Named<'a>,
    name: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Scope<'a> {
    project: Project<'a>,
}

#[derive(Debug, Serialize)]
struct Project<'a> {
    domain: Named<'a>,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Named<'a> {
    name: &'a str,
}

impl<'a> AuthRequest<'a> {
    /// Password auth for the user, scoped to the configured project.
    pub fn password(credentials: &'a Credentials) -> Self {
        Self::with_password(credentials, &credentials.password)
    }

    /// Same request with the password masked, for verbose output.
    pub fn redacted(credentials: &'a Credentials) -> Self {
        Self::with_password(credentials, "***")
    }

    fn with_password(credentials: &'a Credentials, password: &'a str) -> Self {
        AuthRequest {
            auth: Auth {
                identity: Identity {
                    methods: ["password"],
                    password: PasswordMethod {
                        user: User {
                            domain: Named {
                                name: &credentials.user_domain_name,
                            },
                            name: &credentials.username,
                            password,
                        },
                    },
                },
                scope: Scope {
                    project: Project {
                        domain: Named {
                            name: &credentials.project_domain_name,
                        },
                        name: &credentials.project_name,
                    },
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    interface: String,
    url: String,
}

/// The login URL for an auth base URL such as `https://keystone:5000/v3`.
pub fn token_url(auth_url: &str) -> String {
    format!("{auth_url}/auth/tokens")
}

/// Turns a Keystone login response into a [`Session`].
///
/// Requires status 201, an `X-Subject-Token` header and a public object-store
/// endpoint in the catalog. Catalog entries are scanned in order and the first
/// `public` endpoint of an `object-store` entry wins, even if later entries
/// would also match. An `object-store` entry with no public endpoint is passed over.
pub fn parse_token_response(
    url: &str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> Result<Session> {
    if status != StatusCode::CREATED {
        return Err(Error::AuthRejected {
            url: url.to_string(),
            status: status.to_string(),
            body: body.to_string(),
        });
    }

    let token = headers
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingToken {
            headers: headers.keys().map(|k| k.as_str().to_string()).collect(),
        })?;

    let object_store_url = object_store_url(body).ok_or_else(|| Error::CatalogLookup {
        body: body.to_string(),
    })?;

    Ok(Session {
        token: token.to_string(),
        object_store_url,
    })
}

fn object_store_url(body: &str) -> Option<String> {
    let response: TokenResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Keystone response body is not a token document");
            return None;
        }
    };
    response
        .token
        .catalog
        .into_iter()
        .filter(|entry| entry.service_type == OBJECT_STORE_TYPE)
        .flat_map(|entry| entry.endpoints)
        .find(|endpoint| endpoint.interface == PUBLIC_INTERFACE)
        .map(|endpoint| endpoint.url)
}

/// Keystone client backed by `reqwest`.
pub struct KeystoneClient {
    http: Client,
    timeout: Duration,
    verbose: bool,
}

impl KeystoneClient {
    pub fn new(http: Client, verbose: bool) -> Self {
        Self {
            http,
            timeout: AUTH_TIMEOUT,
            verbose,
        }
    }

    /// Overrides the login deadline (default [`AUTH_TIMEOUT`]).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Authenticator for KeystoneClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let url = token_url(&credentials.auth_url);
        println!("Getting authentication token from {url} ...");

        if self.verbose {
            let masked = serde_json::to_string_pretty(&AuthRequest::redacted(credentials))
                .unwrap_or_default();
            println!("Login data:\n  {}", masked.replace('\n', "\n  "));
        }

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&AuthRequest::password(credentials))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| {
                error!(error = %source, url = %url, "Keystone request failed");
                Error::AuthRequest {
                    url: url.clone(),
                    source,
                }
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|source| Error::AuthRequest {
            url: url.clone(),
            source,
        })?;
        debug!(%status, body_len = body.len(), "Keystone responded");

        if self.verbose {
            println!("Result:\n  {status}\n  {}", body.replace('\n', "\n  "));
        }

        println!("Locating public object store URL in catalog ...");
        let session = parse_token_response(&url, status, &headers, &body).map_err(|e| {
            error!(error = %e, "Keystone login failed");
            e
        })?;
        println!("  {}", session.object_store_url);
        info!(object_store_url = %session.object_store_url, "Authenticated against Keystone");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            user_domain_name: "Default".into(),
            username: "backup-bot".into(),
            password: "pa\"ss".into(),
            project_domain_name: "ProjDomain".into(),
            project_name: "mysql-backups".into(),
            auth_url: "https://keystone.example.com/v3".into(),
        }
    }

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SUBJECT_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        headers
    }

    #[test]
    fn auth_body_places_credentials_in_keystone_shape() {
        let creds = credentials();
        let body = serde_json::to_value(AuthRequest::password(&creds)).unwrap();
        assert_eq!(
            body,
            json!({
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": {
                            "user": {
                                "domain": {"name": "Default"},
                                "name": "backup-bot",
                                "password": "pa\"ss"
                            }
                        }
                    },
                    "scope": {
                        "project": {
                            "domain": {"name": "ProjDomain"},
                            "name": "mysql-backups"
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn redacted_body_hides_password() {
        let creds = credentials();
        let text = serde_json::to_string(&AuthRequest::redacted(&creds)).unwrap();
        assert!(!text.contains("pa\\\"ss"));
        assert!(text.contains("***"));
    }

    #[test]
    fn token_url_appends_auth_tokens() {
        assert_eq!(
            token_url("https://keystone.example.com/v3"),
            "https://keystone.example.com/v3/auth/tokens"
        );
    }

    #[test]
    fn created_response_yields_session() {
        let body = json!({
            "token": {
                "catalog": [
                    {"type": "identity", "endpoints": [{"interface": "public", "url": "https://keystone"}]},
                    {"type": "object-store", "endpoints": [
                        {"interface": "internal", "url": "http://swift.internal/v1/AUTH_x"},
                        {"interface": "public", "url": "https://swift.example.com/v1/AUTH_x"}
                    ]}
                ]
            }
        })
        .to_string();
        let session = parse_token_response(
            "https://keystone/auth/tokens",
            StatusCode::CREATED,
            &headers_with_token("gAAAAA-token"),
            &body,
        )
        .expect("session");
        assert_eq!(session.token, "gAAAAA-token");
        assert_eq!(session.object_store_url, "https://swift.example.com/v1/AUTH_x");
    }

    #[test]
    fn first_object_store_and_first_public_endpoint_win() {
        let body = json!({
            "token": {
                "catalog": [
                    {"type": "object-store", "endpoints": [
                        {"interface": "public", "url": "https://first.example.com/v1"},
                        {"interface": "public", "url": "https://first-b.example.com/v1"}
                    ]},
                    {"type": "object-store", "endpoints": [
                        {"interface": "public", "url": "https://second.example.com/v1"}
                    ]}
                ]
            }
        })
        .to_string();
        let session = parse_token_response(
            "u",
            StatusCode::CREATED,
            &headers_with_token("t"),
            &body,
        )
        .unwrap();
        assert_eq!(session.object_store_url, "https://first.example.com/v1");
    }

    #[test]
    fn object_store_entry_without_public_endpoint_is_passed_over() {
        let body = json!({
            "token": {
                "catalog": [
                    {"type": "object-store", "endpoints": [
                        {"interface": "admin", "url": "https://admin.example.com/v1"}
                    ]},
                    {"type": "object-store", "endpoints": [
                        {"interface": "public", "url": "https://second.example.com/v1"}
                    ]}
                ]
            }
        })
        .to_string();
        let session =
            parse_token_response("u", StatusCode::CREATED, &headers_with_token("t"), &body)
                .unwrap();
        assert_eq!(session.object_store_url, "https://second.example.com/v1");
    }

    #[test]
    fn non_created_status_is_rejected_with_body() {
        let err = parse_token_response(
            "https://keystone/auth/tokens",
            StatusCode::UNAUTHORIZED,
            &headers_with_token("t"),
            r#"{"error": {"code": 401}}"#,
        )
        .unwrap_err();
        match err {
            Error::AuthRejected { status, body, .. } => {
                assert!(status.starts_with("401"));
                assert!(body.contains("\"code\": 401"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ok_status_is_not_enough() {
        let err = parse_token_response("u", StatusCode::OK, &headers_with_token("t"), "{}")
            .unwrap_err();
        assert!(matches!(err, Error::AuthRejected { .. }));
    }

    #[test]
    fn missing_subject_token_is_fatal() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = parse_token_response("u", StatusCode::CREATED, &headers, "{}").unwrap_err();
        match err {
            Error::MissingToken { headers } => assert_eq!(headers, vec!["content-type"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_catalog_entry_carries_raw_body() {
        let body = r#"{"token": {"catalog": [{"type": "compute", "endpoints": []}]}}"#;
        let err = parse_token_response("u", StatusCode::CREATED, &headers_with_token("t"), body)
            .unwrap_err();
        match err {
            Error::CatalogLookup { body: raw } => assert_eq!(raw, body),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparsable_body_is_a_catalog_failure() {
        let err =
            parse_token_response("u", StatusCode::CREATED, &headers_with_token("t"), "<html>")
                .unwrap_err();
        assert!(matches!(err, Error::CatalogLookup { .. }));
    }
}
