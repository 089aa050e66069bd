use chrono::NaiveDateTime;
use common::storage::BlobName;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::{account, allocation, literature};
use crate::models::allocation::AllocationView;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The allocation does not exist or belongs to someone else.
    #[error("allocation not found or not owned by the caller")]
    PermissionDenied,
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Attachment changes requested by an assignee. `None` leaves a field as is.
#[derive(Debug, Default)]
pub struct AttachmentUpdate {
    pub notes: Option<String>,
    pub slides: Option<BlobName>,
}

impl AttachmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.slides.is_none()
    }
}

pub struct LedgerService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LedgerService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Assign a literature item to a user for a meeting.
    pub async fn allocate(
        &self,
        user_id: i32,
        literature_id: i32,
        meeting_time: NaiveDateTime,
    ) -> Result<allocation::Model, LedgerError> {
        if account::Entity::find_by_id(user_id)
            .one(self.conn)
            .await?
            .is_none()
        {
            return Err(LedgerError::InvalidReference(format!(
                "user {user_id} does not exist"
            )));
        }
        if literature::Entity::find_by_id(literature_id)
            .one(self.conn)
            .await?
            .is_none()
        {
            return Err(LedgerError::InvalidReference(format!(
                "literature {literature_id} does not exist"
            )));
        }

        let model = allocation::ActiveModel {
            user_id: Set(user_id),
            literature_id: Set(literature_id),
            meeting_time: Set(meeting_time),
            notes: Set(None),
            slides_filename: Set(None),
            ..Default::default()
        };
        Ok(model.insert(self.conn).await?)
    }

    /// Every allocation with assignee name and literature details, by allocation id.
    pub async fn list_joined(&self) -> Result<Vec<AllocationView>, DbErr> {
        allocation::Entity::find()
            .select_only()
            .column(allocation::Column::Id)
            .column(allocation::Column::UserId)
            .column(allocation::Column::LiteratureId)
            .column(allocation::Column::MeetingTime)
            .column(allocation::Column::Notes)
            .column(allocation::Column::SlidesFilename)
            .column_as(account::Column::Username, "user_name")
            .column_as(literature::Column::Title, "literature_title")
            .column_as(literature::Column::Author, "literature_author")
            .column_as(literature::Column::Year, "literature_year")
            .inner_join(account::Entity)
            .inner_join(literature::Entity)
            .order_by_asc(allocation::Column::Id)
            .into_model::<AllocationView>()
            .all(self.conn)
            .await
    }

    /// Look up an allocation by id, only if it is assigned to `caller_id`.
    pub async fn find_owned(
        &self,
        allocation_id: i32,
        caller_id: i32,
    ) -> Result<Option<allocation::Model>, DbErr> {
        allocation::Entity::find()
            .filter(allocation::Column::Id.eq(allocation_id))
            .filter(allocation::Column::UserId.eq(caller_id))
            .one(self.conn)
            .await
    }

    /// Apply the supplied attachments to an allocation owned by `caller_id`.
    pub async fn update_attachments(
        &self,
        allocation_id: i32,
        caller_id: i32,
        update: AttachmentUpdate,
    ) -> Result<allocation::Model, LedgerError> {
        let existing = self
            .find_owned(allocation_id, caller_id)
            .await?
            .ok_or(LedgerError::PermissionDenied)?;

        if update.is_empty() {
            return Ok(existing);
        }

        let mut active: allocation::ActiveModel = existing.into();
        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(slides) = update.slides {
            active.slides_filename = Set(Some(slides.into_string()));
        }
        Ok(active.update(self.conn).await?)
    }
}
