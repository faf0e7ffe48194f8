//! Service account authentication for the Google APIs.
//!
//! The service account key is read once, when the `TokenProvider` is created. Access tokens are
//! obtained lazily and cached by `yup_oauth2`, which refreshes them shortly before they expire.

use crate::api::OAUTH_SCOPES;
use crate::config::CredentialSource;
use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{ensure, Context};
use tracing::{debug, info};
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

const SERVICE_ACCOUNT: &str = "service_account";

/// Provides bearer tokens for the service account.
pub(crate) struct TokenProvider {
    client_email: String,
    auth: DefaultAuthenticator,
}

impl TokenProvider {
    /// Reads the service account key from `source` and prepares an authenticator for it. Missing
    /// or malformed credentials are `Auth` errors.
    pub(crate) async fn load(source: &CredentialSource) -> Result<Self> {
        let key = read_key(source).await.pub_result(ErrorType::Auth)?;
        let client_email = key.client_email.clone();
        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .context("Failed to create the service account authenticator")
            .pub_result(ErrorType::Auth)?;
        info!("Using service account {client_email}");
        Ok(Self { client_email, auth })
    }

    /// Returns a valid access token, requesting a new one from Google if needed. Rejected
    /// credentials are `Auth` errors.
    pub(crate) async fn token(&self) -> Result<String> {
        let token = self
            .auth
            .token(OAUTH_SCOPES)
            .await
            .with_context(|| {
                format!(
                    "Failed to obtain an access token for {}",
                    self.client_email
                )
            })
            .pub_result(ErrorType::Auth)?;
        debug!("Access token valid until {:?}", token.expiration_time());
        token
            .token()
            .map(str::to_string)
            .context("The token response did not contain an access token")
            .pub_result(ErrorType::Auth)
    }
}

async fn read_key(source: &CredentialSource) -> Res<ServiceAccountKey> {
    let (json, origin) = match source {
        CredentialSource::File(path) => (utils::read(path).await?, path.display().to_string()),
        CredentialSource::Inline(json) => (json.clone(), String::from("inline credentials")),
    };
    parse_key(&json).with_context(|| format!("Invalid service account credentials in {origin}"))
}

fn parse_key(json: &str) -> Res<ServiceAccountKey> {
    let key: ServiceAccountKey =
        serde_json::from_str(json).context("Unable to parse the service account key")?;
    ensure!(
        key.key_type.as_deref().unwrap_or(SERVICE_ACCOUNT) == SERVICE_ACCOUNT,
        "Expected credentials of type '{SERVICE_ACCOUNT}', got '{}'",
        key.key_type.as_deref().unwrap_or_default()
    );
    ensure!(
        !key.private_key.is_empty(),
        "The service account key has an empty private_key"
    );
    Ok(key)
}
