//! Hosted identity and profile-document providers. The hosted services are
//! consumed through their REST surfaces only; everything above this module
//! talks to the two traits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;

use crate::error::IdentityError;
use crate::settings::AppSettings;

const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DOCUMENTS_BASE_URL: &str = "https://firestore.googleapis.com/v1/projects";

/// The provider's view of a signed-in account. The token is what the
/// hosted endpoints authenticate follow-up calls with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub id_token: String,
}

/// Push notification from the identity provider. `Unknown` is only ever
/// observed before the provider has reported for the first time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthChange {
    #[default]
    Unknown,
    SignedOut,
    SignedIn(AuthUser),
}

/// Profile document persisted per account in the hosted document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfileDoc {
    pub uid: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError>;
    async fn sign_out(&self) -> Result<(), IdentityError>;
    /// Re-proves the current credential ahead of a sensitive operation.
    async fn reauthenticate(&self, current_password: &str) -> Result<(), IdentityError>;
    async fn update_password(&self, new_password: &str) -> Result<(), IdentityError>;
    async fn delete_account(&self) -> Result<(), IdentityError>;
    fn subscribe(&self) -> watch::Receiver<AuthChange>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create(&self, profile: &UserProfileDoc) -> Result<(), IdentityError>;
    async fn get(&self, uid: &str) -> Result<Option<UserProfileDoc>, IdentityError>;
    async fn update_username(&self, uid: &str, username: &str) -> Result<(), IdentityError>;
    async fn delete(&self, uid: &str) -> Result<(), IdentityError>;
}

fn map_identity_code(message: &str) -> IdentityError {
    // Codes may carry a detail suffix, e.g. "WEAK_PASSWORD : Password
    // should be at least 6 characters".
    let code = message.split(':').next().unwrap_or(message).trim();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            IdentityError::InvalidCredentials
        }
        "WEAK_PASSWORD" => IdentityError::WeakPassword,
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" => IdentityError::RequiresRecentLogin,
        other => IdentityError::Provider(String::from(other)),
    }
}

#[derive(Deserialize)]
struct IdentityErrorBody {
    error: IdentityErrorDetail,
}

#[derive(Deserialize)]
struct IdentityErrorDetail {
    message: String,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "idToken")]
    id_token: String,
    email: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}

impl From<SignInResponse> for AuthUser {
    fn from(response: SignInResponse) -> Self {
        Self {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name.filter(|name| !name.is_empty()),
            id_token: response.id_token,
        }
    }
}

#[derive(Deserialize)]
struct UpdateAccountResponse {
    #[serde(rename = "idToken", default)]
    id_token: Option<String>,
}

/// Identity-Toolkit-style REST provider. Credentials are not persisted, so
/// a fresh provider reports signed-out immediately.
pub struct HostedIdentityProvider {
    api_key: String,
    http_client: Arc<reqwest::Client>,
    events: watch::Sender<AuthChange>,
}

impl HostedIdentityProvider {
    pub fn new(api_key: String) -> Self {
        let (events, _) = watch::channel(AuthChange::SignedOut);
        Self {
            api_key,
            http_client: Arc::new(reqwest::Client::new()),
            events,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.identity_api_key.clone())
    }

    fn current_user(&self) -> Result<AuthUser, IdentityError> {
        match &*self.events.borrow() {
            AuthChange::SignedIn(user) => Ok(user.clone()),
            _ => Err(IdentityError::NotSignedIn),
        }
    }

    async fn post_account<T>(
        &self,
        action: &str,
        body: serde_json::Value,
    ) -> Result<T, IdentityError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/accounts:{}", IDENTITY_BASE_URL, action);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| IdentityError::Parse(e.to_string()))
        } else {
            let body: IdentityErrorBody = response
                .json()
                .await
                .map_err(|e| IdentityError::Parse(e.to_string()))?;
            Err(map_identity_code(&body.error.message))
        }
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let response: SignInResponse = self
            .post_account(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let user = AuthUser::from(response);
        tracing::info!(uid = %user.uid, "account created");
        self.events.send_replace(AuthChange::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let response: SignInResponse = self
            .post_account(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let user = AuthUser::from(response);
        tracing::info!(uid = %user.uid, "signed in");
        self.events.send_replace(AuthChange::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.events.send_replace(AuthChange::SignedOut);
        Ok(())
    }

    async fn reauthenticate(&self, current_password: &str) -> Result<(), IdentityError> {
        let user = self.current_user()?;
        let response: SignInResponse = self
            .post_account(
                "signInWithPassword",
                json!({
                    "email": user.email,
                    "password": current_password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        // Keep the refreshed token; the follow-up sensitive call needs it.
        self.events
            .send_replace(AuthChange::SignedIn(AuthUser::from(response)));
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), IdentityError> {
        let user = self.current_user()?;
        let response: UpdateAccountResponse = self
            .post_account(
                "update",
                json!({
                    "idToken": user.id_token,
                    "password": new_password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        if let Some(id_token) = response.id_token {
            self.events
                .send_replace(AuthChange::SignedIn(AuthUser { id_token, ..user }));
        }
        Ok(())
    }

    async fn delete_account(&self) -> Result<(), IdentityError> {
        let user = self.current_user()?;
        let _: serde_json::Value = self
            .post_account("delete", json!({ "idToken": user.id_token }))
            .await?;
        tracing::info!(uid = %user.uid, "account deleted");
        self.events.send_replace(AuthChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<AuthChange> {
        self.events.subscribe()
    }
}

#[derive(Serialize, Deserialize)]
struct DocumentBody {
    fields: ProfileFields,
}

#[derive(Serialize, Deserialize)]
struct ProfileFields {
    uid: StringValue,
    username: StringValue,
    email: StringValue,
    #[serde(rename = "createdAt")]
    created_at: TimestampValue,
}

#[derive(Serialize, Deserialize)]
struct StringValue {
    #[serde(rename = "stringValue")]
    value: String,
}

#[derive(Serialize, Deserialize)]
struct TimestampValue {
    #[serde(rename = "timestampValue")]
    value: DateTime<Utc>,
}

impl From<&UserProfileDoc> for ProfileFields {
    fn from(profile: &UserProfileDoc) -> Self {
        Self {
            uid: StringValue {
                value: profile.uid.clone(),
            },
            username: StringValue {
                value: profile.username.clone(),
            },
            email: StringValue {
                value: profile.email.clone(),
            },
            created_at: TimestampValue {
                value: profile.created_at,
            },
        }
    }
}

impl From<ProfileFields> for UserProfileDoc {
    fn from(fields: ProfileFields) -> Self {
        Self {
            uid: fields.uid.value,
            username: fields.username.value,
            email: fields.email.value,
            created_at: fields.created_at.value,
        }
    }
}

#[derive(Deserialize)]
struct StoreErrorBody {
    error: StoreErrorDetail,
}

#[derive(Deserialize)]
struct StoreErrorDetail {
    status: String,
}

async fn store_error(response: reqwest::Response) -> IdentityError {
    let status = response.status().as_u16();
    match response.json::<StoreErrorBody>().await {
        Ok(body) => IdentityError::Provider(body.error.status),
        Err(_) => IdentityError::Provider(format!("HTTP_{}", status)),
    }
}

/// Document-store REST client for the per-user profile collection.
pub struct HostedProfileStore {
    api_key: String,
    base_url: String,
    http_client: Arc<reqwest::Client>,
}

impl HostedProfileStore {
    pub fn new(project: String, api_key: String) -> Self {
        Self {
            api_key,
            base_url: format!(
                "{}/{}/databases/(default)/documents",
                DOCUMENTS_BASE_URL, project
            ),
            http_client: Arc::new(reqwest::Client::new()),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            settings.identity_project.clone(),
            settings.identity_api_key.clone(),
        )
    }

    fn profile_url(&self, uid: &str) -> String {
        format!("{}/users/{}", self.base_url, uid)
    }
}

#[async_trait]
impl ProfileStore for HostedProfileStore {
    async fn create(&self, profile: &UserProfileDoc) -> Result<(), IdentityError> {
        let body = DocumentBody {
            fields: ProfileFields::from(profile),
        };
        let response = self
            .http_client
            .patch(self.profile_url(&profile.uid))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(store_error(response).await)
        }
    }

    async fn get(&self, uid: &str) -> Result<Option<UserProfileDoc>, IdentityError> {
        let response = self
            .http_client
            .get(self.profile_url(uid))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(store_error(response).await);
        }
        let body: DocumentBody = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;
        Ok(Some(UserProfileDoc::from(body.fields)))
    }

    async fn update_username(&self, uid: &str, username: &str) -> Result<(), IdentityError> {
        let response = self
            .http_client
            .patch(self.profile_url(uid))
            .query(&[
                ("key", self.api_key.as_str()),
                ("updateMask.fieldPaths", "username"),
            ])
            .json(&json!({ "fields": { "username": { "stringValue": username } } }))
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(store_error(response).await)
        }
    }

    async fn delete(&self, uid: &str) -> Result<(), IdentityError> {
        let response = self
            .http_client
            .delete(self.profile_url(uid))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(store_error(response).await)
        }
    }
}
