use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IdenStatic, IntoActiveModel, Iterable, PrimaryKeyToColumn,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Column type of the entity behind a resource
pub type ResourceColumn<R> = <<R as CrudResource>::EntityType as EntityTrait>::Column;

/// Capability interface every CRUD resource implements.
///
/// This is the metadata provider for the engine: primary key, columns, soft-delete marker
/// and declared relations. Everything except the associated types and the resource name has
/// a default derived from the Sea-ORM entity, so a minimal implementation is:
///
/// ```rust,ignore
/// pub struct Posts;
///
/// impl CrudResource for Posts {
///     type EntityType = post::Entity;
///     type ModelType = post::Model;
///     type ActiveModelType = post::ActiveModel;
///
///     const RESOURCE_NAME: &'static str = "post";
///
///     fn soft_delete_column() -> Option<post::Column> {
///         Some(post::Column::DeletedAt)
///     }
/// }
/// ```
#[async_trait]
pub trait CrudResource: Send + Sync + 'static {
    type EntityType: EntityTrait<Model = Self::ModelType> + Sync;
    type ModelType: IntoActiveModel<Self::ActiveModelType>
        + FromQueryResult
        + Serialize
        + Send
        + Sync;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + Send
        + Sync;

    /// Name used in error messages and log fields
    const RESOURCE_NAME: &'static str;

    /// Ordered primary key columns. Pagination order and cursor tokens are built from these.
    #[must_use]
    fn primary_key_columns() -> Vec<ResourceColumn<Self>> {
        <<Self::EntityType as EntityTrait>::PrimaryKey as Iterable>::iter()
            .map(PrimaryKeyToColumn::into_column)
            .collect()
    }

    /// Every column the resource exposes for selection, filtering and writes
    #[must_use]
    fn columns() -> Vec<ResourceColumn<Self>> {
        <ResourceColumn<Self> as Iterable>::iter().collect()
    }

    /// Nullable timestamp column marking a record as soft-deleted
    #[must_use]
    fn soft_delete_column() -> Option<ResourceColumn<Self>> {
        None
    }

    /// Relation names that can be requested; the default set loaded when a request names none
    #[must_use]
    fn declared_relations() -> Vec<&'static str> {
        vec![]
    }

    /// Attach related records to already-retrieved records.
    ///
    /// `relations` only ever contains names from [`CrudResource::declared_relations`].
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if loading a relation fails.
    async fn load_relations(
        _db: &DatabaseConnection,
        _records: &mut [JsonValue],
        _relations: &[String],
    ) -> Result<(), DbErr> {
        Ok(())
    }

    #[must_use]
    fn primary_key_fields() -> Vec<String> {
        Self::primary_key_columns()
            .iter()
            .map(|column| column.as_str().to_string())
            .collect()
    }

    #[must_use]
    fn column_names() -> Vec<String> {
        Self::columns()
            .iter()
            .map(|column| column.as_str().to_string())
            .collect()
    }

    /// Resolve a field name to one of the resource's columns
    #[must_use]
    fn find_column(name: &str) -> Option<ResourceColumn<Self>> {
        Self::columns()
            .into_iter()
            .find(|column| column.as_str() == name)
    }
}
