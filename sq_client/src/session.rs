//! Application session state.
//!
//! A `Session` owns the API client, the credential store, and the cached
//! current user. It is created once at startup, restored silently from
//! stored credentials, updated from login/registration/task-completion
//! responses, and cleared on logout. Views borrow it; it is never global.

use study_quest::{
    HundredPointLevels, LevelEngine, LevelInfo,
    models::{Task, User},
};
use thiserror::Error;

use crate::{
    api_client::{ApiClient, ApiError},
    credentials::{self, CredentialStore, StoreError},
};

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Credentials could not be persisted
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Logged-in state shared by every view.
///
/// Level progress is derived through `L`, the fixed 100-point bands unless
/// another [`LevelEngine`] is supplied.
pub struct Session<S: CredentialStore, L: LevelEngine = HundredPointLevels> {
    api: ApiClient,
    store: S,
    user: Option<User>,
    levels: L,
}

impl<S: CredentialStore> Session<S> {
    /// Create a logged-out session. Call [`Session::restore`] to resume a
    /// stored one.
    pub fn new(api: ApiClient, store: S) -> Self {
        Self::with_levels(api, store, HundredPointLevels)
    }
}

impl<S: CredentialStore, L: LevelEngine> Session<S, L> {
    /// Create a logged-out session deriving level progress with `levels`.
    pub fn with_levels(api: ApiClient, store: S, levels: L) -> Self {
        Self {
            api,
            store,
            user: None,
            levels,
        }
    }

    /// Resume a stored session.
    ///
    /// With no stored token this is a no-op. With one, the backend is asked
    /// who it belongs to; any failure clears the stored credentials.
    pub async fn restore(&mut self) -> SessionResult<Option<&User>> {
        let Some(token) = credentials::load_token(&self.store) else {
            self.user = None;
            return Ok(None);
        };

        self.api.set_access_token(Some(token));
        match self.api.current_user().await {
            Ok(user) => {
                tracing::info!(username = %user.username, "Session restored");
                self.update_user(user)?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored session rejected, clearing credentials");
                self.api.set_access_token(None);
                self.user = None;
                credentials::clear(&mut self.store)?;
            }
        }
        Ok(self.user.as_ref())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> SessionResult<&User> {
        let auth = self.api.login(email, password).await?;
        credentials::save_session(&mut self.store, &auth.access_token, &auth.user)?;
        tracing::info!(username = %auth.user.username, "Logged in");
        Ok(self.user.insert(auth.user))
    }

    pub async fn register(&mut self, email: &str, username: &str, password: &str) -> SessionResult<&User> {
        let auth = self.api.register(email, username, password).await?;
        credentials::save_session(&mut self.store, &auth.access_token, &auth.user)?;
        tracing::info!(username = %auth.user.username, "Registered");
        Ok(self.user.insert(auth.user))
    }

    /// End the session. Backend errors are ignored; local credentials are
    /// always removed.
    pub async fn logout(&mut self) -> SessionResult<()> {
        if let Err(e) = self.api.logout().await {
            tracing::debug!(error = %e, "Ignoring logout error");
        }
        self.user = None;
        credentials::clear(&mut self.store)?;
        Ok(())
    }

    /// Replace the cached user with a fresh snapshot from the backend.
    pub fn update_user(&mut self, user: User) -> SessionResult<()> {
        credentials::save_user(&mut self.store, &user)?;
        self.user = Some(user);
        Ok(())
    }

    /// Toggle a task's completion and adopt the user snapshot the backend
    /// returns with it. Points are never recomputed locally.
    pub async fn complete_task(&mut self, task_id: i64) -> SessionResult<Task> {
        let completion = self.api.complete_task(task_id).await?;
        self.update_user(completion.user)?;
        Ok(completion.task)
    }

    /// Re-fetch the current user's profile.
    pub async fn refresh_profile(&mut self) -> SessionResult<&User> {
        let user = self.api.my_profile().await?;
        credentials::save_user(&mut self.store, &user)?;
        Ok(self.user.insert(user))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.username.as_str())
    }

    /// Level progress of the current user (level 1 when logged out).
    pub fn level_info(&self) -> LevelInfo {
        self.levels.for_user(self.user.as_ref())
    }

    pub fn levels(&self) -> &L {
        &self.levels
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryStore;
    use chrono::Utc;

    /// Every level spans 1000 points.
    struct KiloLevels;

    impl LevelEngine for KiloLevels {
        fn level_info(&self, level: i64, total_points: i64) -> LevelInfo {
            LevelInfo {
                level,
                next_level: level + 1,
                total_points,
                current_level_threshold: level * 1000,
                next_level_threshold: (level + 1) * 1000,
                progress_percent: 0.0,
                points_to_next: ((level + 1) * 1000 - total_points).max(0),
            }
        }
    }

    fn user() -> User {
        User {
            id: 1,
            email: "me@example.com".to_string(),
            username: "me".to_string(),
            level: 2,
            total_points: 2100,
            created_at: Utc::now(),
            week_points: None,
        }
    }

    #[test]
    fn test_default_levels_for_logged_out_session() {
        let session = Session::new(ApiClient::new("http://localhost:1"), MemoryStore::new());
        let info = session.level_info();
        assert_eq!(info.level, 1);
        assert_eq!(info.next_level_threshold, 200);
    }

    #[test]
    fn test_custom_level_engine_is_used() {
        let mut session = Session::with_levels(ApiClient::new("http://localhost:1"), MemoryStore::new(), KiloLevels);
        assert_eq!(session.level_info().next_level_threshold, 2000);

        session.update_user(user()).unwrap();
        let info = session.level_info();
        assert_eq!(info.next_level_threshold, 3000);
        assert_eq!(info.points_to_next, 900);
    }
}
