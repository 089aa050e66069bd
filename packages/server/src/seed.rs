use sea_orm::*;
use sea_orm::sea_query::OnConflict;
use tracing::info;

use crate::entity::account::{self, ROLE_ADMIN, ROLE_USER};

/// Accounts created on first start: (username, password, role).
const DEFAULT_ACCOUNTS: &[(&str, &str, &str)] = &[
    ("admin", "admin123", ROLE_ADMIN),
    ("user", "user123", ROLE_USER),
];

/// Insert the default accounts, leaving existing ones with the same username untouched.
pub async fn seed_default_accounts(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for &(username, password, role) in DEFAULT_ACCOUNTS {
        let model = account::ActiveModel {
            username: Set(username.to_string()),
            password: Set(password.to_string()),
            role: Set(role.to_string()),
            ..Default::default()
        };

        let result = account::Entity::insert(model)
            .on_conflict(
                OnConflict::column(account::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(0) | Err(DbErr::RecordNotInserted) => {}
            Ok(_) => inserted += 1,
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} default accounts", inserted);
    }
    Ok(())
}
