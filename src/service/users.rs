//! User business logic: creation, lookup, updates, authentication.

use crate::db::models::{NewUser, UserChanges};
use crate::db::postgres::UserStorage;
use crate::error::ApiError;
use crate::types::users::{
    CreateUserRequest, ListParams, LoginRequest, RoleBody, RoleProfile, UpdateUserRequest,
    UserPage, UserProfile,
};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};
use tracing::{info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    storage: UserStorage,
}

impl UserService {
    pub fn new(storage: UserStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &UserStorage {
        &self.storage
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<UserProfile, ApiError> {
        req.validate()?;
        let hashed_password = hash_password(&req.password)?;
        let record = self
            .storage
            .insert_user(NewUser {
                username: req.username,
                email: req.email,
                full_name: req.full_name,
                hashed_password,
                is_superuser: req.is_superuser,
                bio: req.bio,
            })
            .await?;
        info!(id = record.id, username = %record.username, "created user");
        Ok(record.into())
    }

    pub async fn get(&self, id: i64) -> Result<UserProfile, ApiError> {
        self.storage
            .get_by_id(id)
            .await?
            .map(Into::into)
            .ok_or(ApiError::NotFound("user"))
    }

    pub async fn list(&self, params: ListParams) -> Result<UserPage, ApiError> {
        let (limit, offset) = params.limit_offset();
        let items = self.storage.list_users(limit, offset).await?;
        let total = self.storage.count_users().await?;
        Ok(UserPage {
            items: items.into_iter().map(Into::into).collect(),
            total,
            page: params.page.max(1),
            per_page: limit as u32,
        })
    }

    pub async fn update(&self, id: i64, req: UpdateUserRequest) -> Result<UserProfile, ApiError> {
        req.validate()?;
        if req.is_empty() {
            return Err(ApiError::Validation("no fields to update".to_string()));
        }
        let hashed_password = req.password.as_deref().map(hash_password).transpose()?;
        let record = self
            .storage
            .update_user(
                id,
                UserChanges {
                    email: req.email,
                    full_name: req.full_name,
                    hashed_password,
                    is_active: req.is_active,
                    is_superuser: req.is_superuser,
                    bio: req.bio,
                },
            )
            .await?
            .ok_or(ApiError::NotFound("user"))?;
        info!(id = record.id, "updated user");
        Ok(record.into())
    }

    /// Soft delete: the row stays, logins are refused.
    pub async fn deactivate(&self, id: i64) -> Result<(), ApiError> {
        if !self.storage.set_active(id, false).await? {
            return Err(ApiError::NotFound("user"));
        }
        info!(id, "deactivated user");
        Ok(())
    }

    /// Check credentials. Unknown usernames and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, req: LoginRequest) -> Result<UserProfile, ApiError> {
        let Some(record) = self.storage.get_by_username(&req.username).await? else {
            warn!(username = %req.username, "login for unknown user");
            return Err(ApiError::InvalidCredentials);
        };
        if !verify_password(&req.password, &record.hashed_password) {
            warn!(id = record.id, "login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }
        if !record.is_active {
            return Err(ApiError::AccountDisabled);
        }
        info!(id = record.id, "login ok");
        Ok(record.into())
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleProfile>, ApiError> {
        let roles = self.storage.list_roles().await?;
        Ok(roles.into_iter().map(Into::into).collect())
    }

    pub async fn upsert_role(&self, name: &str, body: RoleBody) -> Result<RoleProfile, ApiError> {
        if name.is_empty() || name.len() > 50 {
            return Err(ApiError::Validation(
                "role name must be 1..=50 characters".to_string(),
            ));
        }
        let role = self
            .storage
            .upsert_role(name, body.description.as_deref())
            .await?;
        Ok(role.into())
    }
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
