use crudkit::CrudResource;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    pub body: Option<String>,
    pub views: i32,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub struct Posts;

impl CrudResource for Posts {
    type EntityType = Entity;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const RESOURCE_NAME: &'static str = "post";

    fn soft_delete_column() -> Option<Column> {
        Some(Column::DeletedAt)
    }
}
