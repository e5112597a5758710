use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error::IdentityError;
use crate::identity::{AuthUser, IdentityProvider, ProfileStore, UserProfileDoc};
use crate::screen::{effect, Effect, Screen};
use crate::session::SessionState;

pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_USERNAME_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Error,
    Success,
}

/// Banner message shown on the account screen, auto-dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

#[derive(Debug)]
pub enum ProfileMessage {
    SessionChanged(SessionState),
    ProfileLoaded(Result<Option<UserProfileDoc>, IdentityError>),
    EmailChanged(String),
    UsernameChanged(String),
    PasswordChanged(String),
    ConfirmPasswordChanged(String),
    CurrentPasswordChanged(String),
    ToggleRegistering,
    ToggleEditing,
    RegisterPressed,
    RegisterFinished(Result<AuthUser, IdentityError>),
    LoginPressed,
    LoginFinished(Result<AuthUser, IdentityError>),
    SavePressed,
    SaveFinished(Result<(), IdentityError>),
    LogoutPressed,
    LogoutFinished(Result<(), IdentityError>),
    DeletePressed,
    DeleteFinished(Result<(), IdentityError>),
    StatusExpired(u64),
}

/// Account screen model: registration, login, profile editing, account
/// deletion. Session state arrives from the session store; the page never
/// mutates it directly.
pub struct ProfilePage {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    pub session: SessionState,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub current_password: String,
    pub registering: bool,
    pub editing: bool,
    pub busy: bool,
    pub status: Option<Status>,
    status_generation: u64,
    status_timeout: Duration,
}

impl ProfilePage {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            identity,
            profiles,
            session: SessionState::Uninitialized,
            email: String::new(),
            username: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            current_password: String::new(),
            registering: false,
            editing: false,
            busy: false,
            status: None,
            status_generation: 0,
            status_timeout: STATUS_TIMEOUT,
        }
    }

    /// Shortens the status auto-dismiss window. Mainly useful to callers
    /// driving the page on a tight schedule.
    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    fn show_status(&mut self, text: &str, kind: StatusKind) -> Vec<Effect<ProfileMessage>> {
        self.status = Some(Status {
            text: String::from(text),
            kind,
        });
        self.status_generation += 1;
        let generation = self.status_generation;
        let timeout = self.status_timeout;
        vec![effect(async move {
            tokio::time::sleep(timeout).await;
            ProfileMessage::StatusExpired(generation)
        })]
    }

    fn show_error(&mut self, text: &str) -> Vec<Effect<ProfileMessage>> {
        self.show_status(text, StatusKind::Error)
    }

    fn show_success(&mut self, text: &str) -> Vec<Effect<ProfileMessage>> {
        self.show_status(text, StatusKind::Success)
    }

    fn register(&mut self) -> Vec<Effect<ProfileMessage>> {
        if self.busy {
            return Vec::new();
        }
        if self.password != self.confirm_password {
            return self.show_error("Passwords do not match");
        }
        if self.username.trim().chars().count() < MIN_USERNAME_LEN {
            return self.show_error("Username too short");
        }

        self.busy = true;
        let identity = self.identity.clone();
        let profiles = self.profiles.clone();
        let email = self.email.clone();
        let password = self.password.clone();
        let username = String::from(self.username.trim());
        vec![effect(async move {
            let outcome = async {
                let user = identity.sign_up(&email, &password).await?;
                let profile = UserProfileDoc {
                    uid: user.uid.clone(),
                    username,
                    email,
                    created_at: Utc::now(),
                };
                profiles.create(&profile).await?;
                Ok(user)
            }
            .await;
            ProfileMessage::RegisterFinished(outcome)
        })]
    }

    fn login(&mut self) -> Vec<Effect<ProfileMessage>> {
        if self.busy {
            return Vec::new();
        }
        self.busy = true;
        let identity = self.identity.clone();
        let email = self.email.clone();
        let password = self.password.clone();
        vec![effect(async move {
            ProfileMessage::LoginFinished(identity.sign_in(&email, &password).await)
        })]
    }

    fn save_profile(&mut self) -> Vec<Effect<ProfileMessage>> {
        if self.busy {
            return Vec::new();
        }
        let Some(session) = self.session.session() else {
            return Vec::new();
        };
        let change_password = !self.password.is_empty() && !self.current_password.is_empty();
        if change_password && self.password != self.confirm_password {
            return self.show_error("New passwords do not match");
        }

        self.busy = true;
        let identity = self.identity.clone();
        let profiles = self.profiles.clone();
        let uid = session.user_id.clone();
        let username = self.username.clone();
        let current_password = self.current_password.clone();
        let new_password = self.password.clone();
        vec![effect(async move {
            let outcome = async {
                profiles.update_username(&uid, &username).await?;
                if change_password {
                    identity.reauthenticate(&current_password).await?;
                    identity.update_password(&new_password).await?;
                }
                Ok(())
            }
            .await;
            ProfileMessage::SaveFinished(outcome)
        })]
    }

    fn delete_account(&mut self) -> Vec<Effect<ProfileMessage>> {
        if self.busy {
            return Vec::new();
        }
        let Some(session) = self.session.session() else {
            return Vec::new();
        };
        self.busy = true;
        let identity = self.identity.clone();
        let profiles = self.profiles.clone();
        let uid = session.user_id.clone();
        vec![effect(async move {
            // The profile document goes first; a failed identity removal
            // must not leave an identity with a dangling document.
            let outcome = async {
                profiles.delete(&uid).await?;
                identity.delete_account().await?;
                Ok(())
            }
            .await;
            ProfileMessage::DeleteFinished(outcome)
        })]
    }

    fn load_profile(&self, uid: String) -> Vec<Effect<ProfileMessage>> {
        let profiles = self.profiles.clone();
        vec![effect(async move {
            ProfileMessage::ProfileLoaded(profiles.get(&uid).await)
        })]
    }
}

impl Screen for ProfilePage {
    type Message = ProfileMessage;

    fn update(&mut self, message: ProfileMessage) -> Vec<Effect<ProfileMessage>> {
        match message {
            ProfileMessage::SessionChanged(state) => {
                self.session = state;
                match self.session.session() {
                    Some(session) => self.load_profile(session.user_id.clone()),
                    None => Vec::new(),
                }
            }
            ProfileMessage::ProfileLoaded(Ok(Some(profile))) => {
                self.username = profile.username;
                Vec::new()
            }
            ProfileMessage::ProfileLoaded(Ok(None)) => Vec::new(),
            ProfileMessage::ProfileLoaded(Err(error)) => {
                tracing::warn!(%error, "profile document load failed");
                Vec::new()
            }
            ProfileMessage::EmailChanged(email) => {
                self.email = email;
                Vec::new()
            }
            ProfileMessage::UsernameChanged(username) => {
                self.username = username;
                Vec::new()
            }
            ProfileMessage::PasswordChanged(password) => {
                self.password = password;
                Vec::new()
            }
            ProfileMessage::ConfirmPasswordChanged(confirm) => {
                self.confirm_password = confirm;
                Vec::new()
            }
            ProfileMessage::CurrentPasswordChanged(current) => {
                self.current_password = current;
                Vec::new()
            }
            ProfileMessage::ToggleRegistering => {
                self.registering = !self.registering;
                Vec::new()
            }
            ProfileMessage::ToggleEditing => {
                self.editing = !self.editing;
                Vec::new()
            }
            ProfileMessage::RegisterPressed => self.register(),
            ProfileMessage::RegisterFinished(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(_) => self.show_success("Account created!"),
                    Err(error) => {
                        let text = error.to_string();
                        self.show_error(&text)
                    }
                }
            }
            ProfileMessage::LoginPressed => self.login(),
            ProfileMessage::LoginFinished(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(_) => self.show_success("Welcome back!"),
                    Err(_) => self.show_error("Invalid email or password"),
                }
            }
            ProfileMessage::SavePressed => self.save_profile(),
            ProfileMessage::SaveFinished(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(()) => {
                        self.editing = false;
                        self.password.clear();
                        self.confirm_password.clear();
                        self.current_password.clear();
                        self.show_success("Profile updated!")
                    }
                    Err(error) => {
                        let text = error.to_string();
                        self.show_error(&text)
                    }
                }
            }
            ProfileMessage::LogoutPressed => {
                let identity = self.identity.clone();
                vec![effect(async move {
                    ProfileMessage::LogoutFinished(identity.sign_out().await)
                })]
            }
            ProfileMessage::LogoutFinished(outcome) => {
                if let Err(error) = outcome {
                    tracing::warn!(%error, "sign out failed");
                }
                Vec::new()
            }
            ProfileMessage::DeletePressed => self.delete_account(),
            ProfileMessage::DeleteFinished(outcome) => {
                self.busy = false;
                match outcome {
                    Ok(()) => Vec::new(),
                    Err(_) => {
                        self.show_error("Please logout and login again to confirm deletion.")
                    }
                }
            }
            ProfileMessage::StatusExpired(generation) => {
                // Only the timer armed by the current status may clear it.
                if generation == self.status_generation {
                    self.status = None;
                }
                Vec::new()
            }
        }
    }
}
