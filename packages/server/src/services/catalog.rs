use common::storage::BlobName;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, ExprTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entity::literature;
use crate::models::shared::escape_like;

/// Descriptive metadata of a literature item.
#[derive(Debug, Clone, Default)]
pub struct LiteratureFields {
    pub title: String,
    pub description: String,
    pub source: String,
    pub year: String,
    pub author: String,
    pub unit: String,
}

pub struct CatalogService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CatalogService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Record a literature item whose document is already stored under `file`.
    pub async fn create(&self, fields: LiteratureFields, file: &BlobName) -> Result<i32, DbErr> {
        let model = literature::ActiveModel {
            title: Set(fields.title.trim().to_string()),
            description: Set(fields.description),
            source: Set(fields.source),
            year: Set(fields.year),
            author: Set(fields.author),
            unit: Set(fields.unit),
            file: Set(file.as_str().to_string()),
            ..Default::default()
        };
        let saved = model.insert(self.conn).await?;
        Ok(saved.id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<literature::Model>, DbErr> {
        literature::Entity::find_by_id(id).one(self.conn).await
    }

    pub async fn list(&self) -> Result<Vec<literature::Model>, DbErr> {
        literature::Entity::find()
            .order_by_asc(literature::Column::Id)
            .all(self.conn)
            .await
    }

    /// Case-insensitive substring search. Blank or absent filters match everything.
    ///
    /// SQLite's `lower()` folds ASCII only, so terms with non-ASCII characters
    /// are matched after loading, with both sides folded by Rust.
    pub async fn search(
        &self,
        title: Option<&str>,
        author: Option<&str>,
    ) -> Result<Vec<literature::Model>, DbErr> {
        let mut select = literature::Entity::find();
        let mut folded = Vec::new();

        for (column, term) in [
            (literature::Column::Title, title),
            (literature::Column::Author, author),
        ] {
            let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };
            if term.is_ascii() {
                select = select.filter(contains_ci(column, term));
            } else {
                folded.push((column, term.to_lowercase()));
            }
        }

        let rows = select
            .order_by_asc(literature::Column::Id)
            .all(self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|row| {
                folded
                    .iter()
                    .all(|(column, term)| searchable(row, *column).to_lowercase().contains(term))
            })
            .collect())
    }

    /// Overwrite every metadata field, `file` included. Returns the number of rows changed.
    pub async fn update(
        &self,
        id: i32,
        fields: LiteratureFields,
        file: String,
    ) -> Result<u64, DbErr> {
        let result = literature::Entity::update_many()
            .col_expr(literature::Column::Title, Expr::value(fields.title.trim()))
            .col_expr(literature::Column::Description, Expr::value(fields.description))
            .col_expr(literature::Column::Source, Expr::value(fields.source))
            .col_expr(literature::Column::Year, Expr::value(fields.year))
            .col_expr(literature::Column::Author, Expr::value(fields.author))
            .col_expr(literature::Column::Unit, Expr::value(fields.unit))
            .col_expr(literature::Column::File, Expr::value(file))
            .filter(literature::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Remove the row only. The stored document is left in place, and
    /// allocations that reference the item keep their now dangling
    /// `literature_id` (they drop out of the joined listing).
    pub async fn delete(&self, id: i32) -> Result<u64, DbErr> {
        let result = literature::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }
}

fn contains_ci(column: literature::Column, term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\')),
    )
}

fn searchable(row: &literature::Model, column: literature::Column) -> &str {
    match column {
        literature::Column::Author => &row.author,
        _ => &row.title,
    }
}
