use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    /// Stored as given. Never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    /// `admin` or `user`.
    pub role: String,

    #[sea_orm(has_many)]
    pub allocations: HasMany<super::allocation::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
