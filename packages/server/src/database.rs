use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::{design_review, probing_question};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Create composite indexes that schema sync cannot express.
///
/// Failures are logged and skipped; the server still works without them.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Stuck-review scan:
    // SELECT id FROM design_review WHERE status IN (..) AND status_changed_at < ?
    create_index(
        db,
        "idx_design_review_status_changed",
        Index::create()
            .if_not_exists()
            .name("idx_design_review_status_changed")
            .table(design_review::Entity)
            .col(design_review::Column::Status)
            .col(design_review::Column::StatusChangedAt)
            .to_owned(),
    )
    .await;

    // Ordered question listing per review.
    create_index(
        db,
        "idx_probing_question_review_position",
        Index::create()
            .if_not_exists()
            .name("idx_probing_question_review_position")
            .table(probing_question::Entity)
            .col(probing_question::Column::ReviewId)
            .col(probing_question::Column::Position)
            .to_owned(),
    )
    .await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: IndexCreateStatement) {
    let sql = stmt.to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {name} exists"),
        Err(e) => warn!("Failed to create index {name}: {e}"),
    }
}
