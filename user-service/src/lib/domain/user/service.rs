use std::sync::Arc;

use async_trait::async_trait;
use auth::LookupError;
use auth::StoredUser;
use auth::UserLookup;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Pagination;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection. It
/// also serves as the authenticator's user lookup.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    async fn ensure_username_free(
        &self,
        username: &Username,
        owner: Option<UserId>,
    ) -> Result<(), UserError> {
        match self.repository.find_by_username(username).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(UserError::UsernameAlreadyExists(username.to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn ensure_email_free(
        &self,
        email: &EmailAddress,
        owner: Option<UserId>,
    ) -> Result<(), UserError> {
        match self.repository.find_by_email(email.as_str()).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(UserError::EmailAlreadyExists(email.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        // The store's unique constraints still catch concurrent registrations.
        self.ensure_username_free(&command.username, None).await?;
        self.ensure_email_free(&command.email, None).await?;

        let password_hash = self.password_hasher.hash(&command.password)?;

        let created_user = self
            .repository
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %created_user.id, "User created");
        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>, UserError> {
        self.repository.list(page).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        self.ensure_username_free(&command.username, Some(user.id)).await?;
        self.ensure_email_free(&command.email, Some(user.id)).await?;

        user.username = command.username;
        user.email = command.email;

        user.password_hash = self.password_hasher.hash(&command.password)?;

        let updated_user = self.repository.update(user).await?;

        tracing::info!(user_id = %updated_user.id, "User updated");
        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[async_trait]
impl<UR> UserLookup for UserService<UR>
where
    UR: UserRepository,
{
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, LookupError> {
        self.repository
            .find_by_email(email)
            .await
            .map(|user| user.map(StoredUser::from))
            .map_err(|e| LookupError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn list(&self, page: Pagination) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn user(id: i64, username: &str, email: &str) -> User {
        User {
            id: UserId(id),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
        }
    }

    fn create_command() -> CreateUserCommand {
        CreateUserCommand::new(
            Username::new("test".to_string()).unwrap(),
            EmailAddress::new("test@test.com".to_string()).unwrap(),
            "passwd".to_string(),
        )
    }

    fn update_command() -> UpdateUserCommand {
        UpdateUserCommand {
            username: Username::new("updated user".to_string()).unwrap(),
            email: EmailAddress::new("updated@test.com".to_string()).unwrap(),
            password: "newpasswd".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_email()
            .withf(|email| email == "test@test.com")
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|new_user| {
                new_user.username.as_str() == "test"
                    && new_user.email.as_str() == "test@test.com"
                    && new_user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|new_user| {
                Ok(User {
                    id: UserId(1),
                    username: new_user.username,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                })
            });

        let service = UserService::new(Arc::new(repository));
        let created = service.create_user(create_command()).await.unwrap();

        assert_eq!(created.id, UserId(1));
        assert_ne!(created.password_hash, "passwd");
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(Some(user(1, "test", "other@test.com"))));
        repository.expect_create().never();

        let service = UserService::new(Arc::new(repository));
        let result = service.create_user(create_command()).await;

        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(user(1, "other", "test@test.com"))));
        repository.expect_create().never();

        let service = UserService::new(Arc::new(repository));
        let result = service.create_user(create_command()).await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));
        let result = service.get_user(&UserId(99)).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_users_passes_page() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_list()
            .with(eq(Pagination {
                limit: 5,
                offset: 10,
            }))
            .times(1)
            .returning(|_| Ok(vec![user(11, "test", "test@test.com")]));

        let service = UserService::new(Arc::new(repository));
        let users = service
            .list_users(Pagination {
                limit: 5,
                offset: 10,
            })
            .await
            .unwrap();

        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_update_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .withf(|id| *id == UserId(1))
            .times(1)
            .returning(|_| Ok(Some(user(1, "test", "test@test.com"))));
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        // The caller's own record does not count as a collision
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(user(1, "test", "updated@test.com"))));
        repository
            .expect_update()
            .withf(|user| {
                user.username.as_str() == "updated user"
                    && user.email.as_str() == "updated@test.com"
                    && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(Ok);

        let service = UserService::new(Arc::new(repository));
        let updated = service
            .update_user(&UserId(1), update_command())
            .await
            .unwrap();

        assert_eq!(updated.username.as_str(), "updated user");
        assert!(auth::PasswordHasher::new()
            .verify("newpasswd", &updated.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_user_username_taken() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(Some(user(1, "test", "test@test.com"))));
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(Some(user(2, "updated user", "someone@test.com"))));
        repository.expect_update().never();

        let service = UserService::new(Arc::new(repository));
        let result = service.update_user(&UserId(1), update_command()).await;

        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));
        let result = service.update_user(&UserId(9), update_command()).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_delete()
            .times(1)
            .returning(|id| Err(UserError::NotFound(id.to_string())));

        let service = UserService::new(Arc::new(repository));
        let result = service.delete_user(&UserId(3)).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lookup_maps_to_stored_user() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .withf(|email| email == "test@test.com")
            .times(1)
            .returning(|_| Ok(Some(user(1, "test", "test@test.com"))));

        let service = UserService::new(Arc::new(repository));
        let stored = UserLookup::find_by_email(&service, "test@test.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored.id, 1);
        assert_eq!(stored.email, "test@test.com");
    }

    #[tokio::test]
    async fn test_lookup_maps_database_error() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("down".to_string())));

        let service = UserService::new(Arc::new(repository));
        let result = UserLookup::find_by_email(&service, "test@test.com").await;

        assert!(result.is_err());
    }
}
