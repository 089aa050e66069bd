use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};

use crate::entity::account::{self, ROLE_ADMIN, ROLE_USER};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{0}")]
    Validation(String),
    #[error("username already exists")]
    Duplicate,
    #[error("incorrect old password")]
    IncorrectPassword,
    #[error("account {0} does not exist")]
    UnknownAccount(i32),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Plain keyed lookups over the `account` table. Credentials are compared as stored.
pub struct IdentityService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> IdentityService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<account::Model>, DbErr> {
        account::Entity::find()
            .filter(account::Column::Username.eq(username.trim()))
            .filter(account::Column::Password.eq(password))
            .one(self.conn)
            .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
        role: Option<&str>,
    ) -> Result<account::Model, IdentityError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(IdentityError::Validation(
                "Username, password and confirmation are required".into(),
            ));
        }
        if password != confirm {
            return Err(IdentityError::Validation("Passwords do not match".into()));
        }
        let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
            None => ROLE_USER,
            Some(r) if r == ROLE_USER => ROLE_USER,
            Some(r) if r == ROLE_ADMIN => ROLE_ADMIN,
            Some(r) => {
                return Err(IdentityError::Validation(format!(
                    "Role must be '{ROLE_ADMIN}' or '{ROLE_USER}', got '{r}'"
                )));
            }
        };

        let taken = account::Entity::find()
            .filter(account::Column::Username.eq(username))
            .one(self.conn)
            .await?;
        if taken.is_some() {
            return Err(IdentityError::Duplicate);
        }

        let model = account::ActiveModel {
            username: Set(username.to_string()),
            password: Set(password.to_string()),
            role: Set(role.to_string()),
            ..Default::default()
        };
        model.insert(self.conn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                tracing::debug!("Registration race condition: unique constraint caught on insert");
                IdentityError::Duplicate
            }
            _ => IdentityError::from(e),
        })
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        old: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), IdentityError> {
        if old.is_empty() || new.is_empty() || confirm.is_empty() {
            return Err(IdentityError::Validation(
                "Old password, new password and confirmation are required".into(),
            ));
        }
        if new != confirm {
            return Err(IdentityError::Validation("Passwords do not match".into()));
        }

        let existing = account::Entity::find_by_id(user_id)
            .one(self.conn)
            .await?
            .ok_or(IdentityError::UnknownAccount(user_id))?;
        if existing.password != old {
            return Err(IdentityError::IncorrectPassword);
        }

        let mut active: account::ActiveModel = existing.into();
        active.password = Set(new.to_string());
        active.update(self.conn).await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<account::Model>, DbErr> {
        account::Entity::find()
            .order_by_asc(account::Column::Id)
            .all(self.conn)
            .await
    }
}
