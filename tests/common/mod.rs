#![allow(dead_code)]

use crudkit::{CreateManyRequest, CrudService, JsonMap};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

pub mod membership_entity;
pub mod post_entity;
pub mod question_entity;
pub mod stamp_entity;

use post_entity::Posts;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let db = Database::connect("sqlite::memory:").await?;

    create_table(&db, post_entity::Entity).await?;
    create_table(&db, membership_entity::Entity).await?;
    create_table(&db, question_entity::Entity).await?;
    create_table(&db, question_entity::comment::Entity).await?;
    create_table(&db, stamp_entity::Entity).await?;

    Ok(db)
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(entity)))
        .await?;
    Ok(())
}

/// Unwrap a `json!` object literal
pub fn map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Insert posts with ids `1..=count`, titles `post-<id>` and `views = id % 10`
pub async fn seed_posts(db: &DatabaseConnection, count: i32) -> CrudService<Posts> {
    let posts = CrudService::<Posts>::new(db.clone());
    let bodies = (1..=count)
        .map(|id| map(json!({"title": format!("post-{id}"), "views": id % 10})))
        .collect();
    posts
        .create_many(CreateManyRequest {
            bodies,
            response: None,
        })
        .await
        .expect("Failed to seed posts");
    posts
}

/// `id` of every record, in order
pub fn ids(records: &[Value]) -> Vec<i64> {
    records
        .iter()
        .map(|record| record["id"].as_i64().expect("record without integer id"))
        .collect()
}
