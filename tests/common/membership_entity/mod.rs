use crudkit::CrudResource;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Composite primary key, no soft delete
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
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
