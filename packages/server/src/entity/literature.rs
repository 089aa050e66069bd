use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "literature")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String,
    pub source: String,
    pub year: String,
    pub author: String,
    pub unit: String,
    /// Blob store handle of the uploaded document.
    pub file: String,

    #[sea_orm(has_many)]
    pub allocations: HasMany<super::allocation::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
