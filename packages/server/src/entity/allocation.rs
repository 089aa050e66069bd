use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allocation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::account::Entity>,

    /// Not a foreign key: deleting literature leaves its allocations in place.
    pub literature_id: i32,
    #[sea_orm(belongs_to, from = "literature_id", to = "id", skip_fk)]
    pub literature: HasOne<super::literature::Entity>,

    pub meeting_time: DateTime,

    /// Takeaways, set by the assignee.
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Blob store handle of the uploaded slides.
    pub slides_filename: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
