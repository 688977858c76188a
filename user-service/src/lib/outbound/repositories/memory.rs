use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::Pagination;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Ids are assigned sequentially from 1 and never reused. Username and email
/// uniqueness mirror the Postgres constraints.
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<i64, User>,
}

impl State {
    fn check_unique(&self, user_id: Option<UserId>, candidate: &User) -> Result<(), UserError> {
        for existing in self.users.values() {
            if Some(existing.id) == user_id {
                continue;
            }
            if existing.username == candidate.username {
                return Err(UserError::UsernameAlreadyExists(
                    candidate.username.to_string(),
                ));
            }
            if existing.email == candidate.email {
                return Err(UserError::EmailAlreadyExists(candidate.email.to_string()));
            }
        }
        Ok(())
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        let user = User {
            id: UserId(state.last_id + 1),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        state.check_unique(None, &user)?;

        state.last_id = user.id.0;
        state.users.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.state.read().await.users.get(&id.0).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| &user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned())
    }

    async fn list(&self, page: Pagination) -> Result<Vec<User>, UserError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .skip(page.offset as usize)
            .take(page.effective_limit() as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user.id.0) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        state.check_unique(Some(user.id), &user)?;

        state.users.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.state
            .write()
            .await
            .users
            .remove(&id.0)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
