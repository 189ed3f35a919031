//! Client-side view of the session
//!
//! `Unauthenticated → Authenticating → Authenticated(user)`, back to
//! `Unauthenticated` on logout or when any query answers 401. Expiry is only
//! noticed on the next request; the server never pushes it.

use async_trait::async_trait;
use serde_json::Value;
use shared::models::User;

use crate::cache::{QueryClient, QueryFetcher, QueryKey, UnauthorizedBehavior};
use crate::error::{ClientError, ClientResult};

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ClientResult<User>;
    async fn logout(&self) -> ClientResult<()>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated(User),
}

pub fn current_user_key() -> QueryKey {
    QueryKey::new("/api/user")
}

pub struct SessionManager<F> {
    queries: QueryClient<F>,
    state: AuthState,
}

impl<F: QueryFetcher + AuthApi> SessionManager<F> {
    pub fn new(queries: QueryClient<F>) -> Self {
        Self {
            queries,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn tenant_id(&self) -> Option<i64> {
        self.user().map(|u| u.tenant_id)
    }

    /// Probe `/api/user`; 401 means "not logged in", not an error
    pub async fn restore(&mut self) -> ClientResult<&AuthState> {
        self.state = AuthState::Authenticating;
        match self
            .queries
            .fetch_query::<User>(&current_user_key(), UnauthorizedBehavior::ReturnNull)
            .await
        {
            Ok(Some(user)) => self.state = AuthState::Authenticated(user),
            Ok(None) => self.state = AuthState::Unauthenticated,
            Err(e) => {
                self.state = AuthState::Unauthenticated;
                return Err(e);
            }
        }
        Ok(&self.state)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<User> {
        self.state = AuthState::Authenticating;
        match self.queries.fetcher().login(username, password).await {
            Ok(user) => {
                self.queries.cache().set_fresh(current_user_key(), &user)?;
                tracing::info!(user_id = user.id, tenant_id = user.tenant_id, "Logged in");
                self.state = AuthState::Authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                self.state = AuthState::Unauthenticated;
                Err(e)
            }
        }
    }

    /// Local state is dropped even if the server call fails
    pub async fn logout(&mut self) -> ClientResult<()> {
        let result = self.queries.fetcher().logout().await;
        self.forget();
        result
    }

    /// Feed every request error through here; a 401 ends the session
    pub fn observe_error(&mut self, err: &ClientError) {
        if err.is_unauthorized() && self.state != AuthState::Unauthenticated {
            tracing::info!("Session expired");
            self.forget();
        }
    }

    fn forget(&mut self) {
        let cache = self.queries.cache();
        cache.clear();
        cache.set_fresh_value(current_user_key(), Value::Null);
        self.state = AuthState::Unauthenticated;
    }
}
