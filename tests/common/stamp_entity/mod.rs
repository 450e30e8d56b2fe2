use async_trait::async_trait;
use chrono::Utc;
use crudkit::CrudResource;
use sea_orm::{ActiveValue, Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// `DateTime<Utc>` timestamps and a `before_save` hook that records the last lifecycle step
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "stamps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub label: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let status = match (&self.deleted_at, insert) {
            (_, true) => "created",
            (ActiveValue::Set(Some(_)), false) => "softRemoved",
            (ActiveValue::Set(None), false) => "recovered",
            _ => "updated",
        };
        self.status = Set(Some(status.to_string()));
        self.updated_at = Set(Some(Utc::now()));
        Ok(self)
    }
}

pub struct Stamps;

impl CrudResource for Stamps {
    type EntityType = Entity;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const RESOURCE_NAME: &'static str = "stamp";

    fn soft_delete_column() -> Option<Column> {
        Some(Column::DeletedAt)
    }
}
