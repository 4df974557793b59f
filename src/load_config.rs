//! Loads the Keystone login info from the environment.
//!
//! All six `OS_*` variables in [`CREDENTIAL_VARS`](crate::error::CREDENTIAL_VARS)
//! are required. Values are trimmed, and a variable that is blank after trimming
//! counts as missing. Nothing touches the network until this has succeeded.

use std::fmt;
use tracing::{error, info};

use crate::error::{Error, Result};

/// Password credentials for Keystone v3, scoped to a project.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_domain_name: String,
    pub username: String,
    pub password: String,
    pub project_domain_name: String,
    pub project_name: String,
    pub auth_url: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_domain_name", &self.user_domain_name)
            .field("username", &self.username)
            .field("password", &"***")
            .field("project_domain_name", &self.project_domain_name)
            .field("project_name", &self.project_name)
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

/// Reads the credentials from the process environment.
pub fn load_credentials() -> Result<Credentials> {
    load_credentials_from(|name| std::env::var(name).ok())
}

/// Reads the credentials through `lookup`, which maps a variable name to its value.
pub fn load_credentials_from<F>(lookup: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let mut read = |name: &'static str| match lookup(name).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => value,
        _ => {
            missing.push(name);
            String::new()
        }
    };

    let credentials = Credentials {
        user_domain_name: read("OS_USER_DOMAIN_NAME"),
        username: read("OS_USERNAME"),
        password: read("OS_PASSWORD"),
        project_domain_name: read("OS_PROJECT_DOMAIN_NAME"),
        project_name: read("OS_PROJECT_NAME"),
        auth_url: read("OS_AUTH_URL"),
    };

    if !missing.is_empty() {
        error!(?missing, "Keystone login info incomplete");
        return Err(Error::MissingCredentials { missing });
    }

    info!(
        auth_url = %credentials.auth_url,
        username = %credentials.username,
        project = %credentials.project_name,
        "Loaded Keystone credentials from environment"
    );
    Ok(credentials)
}
