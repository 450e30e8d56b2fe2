//! Entities shared by the unit tests in this crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::CrudResource;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub score: f64,
    pub active: bool,
    pub metadata: Json,
    pub created_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub struct Items;

impl CrudResource for Items {
    type EntityType = Entity;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const RESOURCE_NAME: &'static str = "item";

    fn soft_delete_column() -> Option<Column> {
        Some(Column::DeletedAt)
    }

    fn declared_relations() -> Vec<&'static str> {
        vec!["tags"]
    }
}

pub mod membership {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    use crate::core::CrudResource;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "memberships")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub group_id: i32,
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: i32,
        pub role: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    pub struct Memberships;

    impl CrudResource for Memberships {
        type EntityType = Entity;
        type ModelType = Model;
        type ActiveModelType = ActiveModel;

        const RESOURCE_NAME: &'static str = "membership";
    }
}
