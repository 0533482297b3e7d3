use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{User, UserRole};
use crate::store::{KeyValueStore, SESSION_KEY};

/// Entry in the static demo directory. The password is plaintext on purpose:
/// this is mock authentication for a demo, not a credential store.
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub user: User,
    pub password: String,
}

/// The two accounts every fresh installation knows about.
pub fn sample_users() -> Vec<DirectoryUser> {
    vec![
        DirectoryUser {
            user: User {
                id: "1".to_string(),
                email: "demo@chatbot.com".to_string(),
                name: "Demo User".to_string(),
                role: UserRole::User,
            },
            password: "demo123".to_string(),
        },
        DirectoryUser {
            user: User {
                id: "2".to_string(),
                email: "admin@chatbot.com".to_string(),
                name: "Admin User".to_string(),
                role: UserRole::Admin,
            },
            password: "admin123".to_string(),
        },
    ]
}

/// Tracks the current authenticated identity and persists the session marker
/// so it survives a restart.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    directory: Arc<Vec<DirectoryUser>>,
    current: Arc<RwLock<Option<User>>>,
}

impl SessionService {
    /// Rehydrates the session marker, if any. A marker that fails schema
    /// validation is treated as logged-out.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let current = match store.load(SESSION_KEY).await {
            Some(value) => match serde_json::from_value::<User>(value) {
                Ok(user) => {
                    info!(email = %user.email, "Restored session");
                    Some(user)
                }
                Err(e) => {
                    warn!("Stored session marker did not match the expected schema: {e}");
                    None
                }
            },
            None => None,
        };
        Self {
            store,
            directory: Arc::new(sample_users()),
            current: Arc::new(RwLock::new(current)),
        }
    }

    fn require(field_name: &str, value: &str) -> Result<String, AppError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::empty_field(field_name));
        }
        Ok(trimmed.to_string())
    }

    /// Exact, case-sensitive email+password match against the directory.
    /// A missing field fails fast without consulting the directory, and
    /// nothing is persisted on a failed attempt.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = Self::require("email", email)?;
        let password = Self::require("password", password)?;

        let user = self
            .directory
            .iter()
            .find(|entry| entry.user.email == email && entry.password == password)
            .map(|entry| entry.user.clone())
            .ok_or(AppError::InvalidCredentials)?;

        info!(email = %user.email, "Login successful");
        self.set_current(user.clone()).await;
        Ok(user)
    }

    /// Registration always succeeds for non-empty credentials. No duplicate
    /// email check, no password storage: the new account exists only as the
    /// current session.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, AppError> {
        let email = Self::require("email", email)?;
        Self::require("password", password)?;

        let name = match name.trim() {
            "" => email.split('@').next().unwrap_or(&email).to_string(),
            trimmed => trimmed.to_string(),
        };

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            role: UserRole::User,
        };
        info!(email = %user.email, "Account created");
        self.set_current(user.clone()).await;
        Ok(user)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    /// Clears the session and removes the persisted marker. The caller also
    /// resets its current-conversation pointer.
    pub async fn logout(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY).await {
            warn!("Could not remove session marker: {e}");
        }
        *self.current.write().await = None;
    }

    async fn set_current(&self, user: User) {
        match serde_json::to_value(&user) {
            Ok(value) => {
                if let Err(e) = self.store.save(SESSION_KEY, &value).await {
                    warn!("Could not persist session marker: {e}");
                }
            }
            Err(e) => warn!("Could not serialize session marker: {e}"),
        }
        *self.current.write().await = Some(user);
    }
}
