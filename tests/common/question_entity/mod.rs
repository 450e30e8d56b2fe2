use async_trait::async_trait;
use crudkit::CrudResource;
use sea_orm::{QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub mod comment {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
    #[sea_orm(table_name = "comments")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub question_id: i32,
        pub message: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub struct Questions;

#[async_trait]
impl CrudResource for Questions {
    type EntityType = Entity;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const RESOURCE_NAME: &'static str = "question";

    fn declared_relations() -> Vec<&'static str> {
        vec!["comments"]
    }

    async fn load_relations(
        db: &DatabaseConnection,
        records: &mut [JsonValue],
        relations: &[String],
    ) -> Result<(), DbErr> {
        if !relations.iter().any(|relation| relation == "comments") {
            return Ok(());
        }

        let ids: Vec<i64> = records
            .iter()
            .filter_map(|record| record.get("id").and_then(JsonValue::as_i64))
            .collect();
        let comments = comment::Entity::find()
            .filter(comment::Column::QuestionId.is_in(ids))
            .order_by_asc(comment::Column::Id)
            .into_json()
            .all(db)
            .await?;

        for record in records.iter_mut() {
            let id = record.get("id").and_then(JsonValue::as_i64);
            let related: Vec<JsonValue> = comments
                .iter()
                .filter(|comment| comment.get("question_id").and_then(JsonValue::as_i64) == id)
                .cloned()
                .collect();
            if let Some(object) = record.as_object_mut() {
                object.insert("comments".to_string(), JsonValue::Array(related));
            }
        }
        Ok(())
    }
}
