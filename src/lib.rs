//! # crudkit
//!
//! Entity-agnostic CRUD engine for Sea-ORM. It turns generic read-one / read-many / search /
//! create / update / upsert / delete / recover requests into storage queries and shapes the
//! results, with offset and keyset (cursor) pagination, a declarative filter language and
//! soft-delete aware lookups.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crudkit::{CrudResource, CrudService, ReadManyRequest};
//!
//! pub struct Posts;
//!
//! impl CrudResource for Posts {
//!     type EntityType = post::Entity;
//!     type ModelType = post::Model;
//!     type ActiveModelType = post::ActiveModel;
//!
//!     const RESOURCE_NAME: &'static str = "post";
//!
//!     fn soft_delete_column() -> Option<post::Column> {
//!         Some(post::Column::DeletedAt)
//!     }
//! }
//!
//! let posts = CrudService::<Posts>::new(db);
//! let first_page = posts.read_many(ReadManyRequest::default()).await?;
//! ```
//!
//! Transport is left to the host application; [`CrudError`] implements
//! `axum::response::IntoResponse` for hosts serving the engine over HTTP.

pub mod core;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod pagination;
pub mod response;

#[cfg(test)]
mod test_entity;

pub use crate::core::{CrudPolicy, CrudResource, CrudService, Method, ResourceColumn};
pub use errors::CrudError;
pub use filtering::{FilterClause, FilterCondition, FilterRequest, Operator, OrderBy, Sort};
pub use models::{
    CreateManyRequest, CreateRequest, DeleteRequest, JsonMap, PageMetadata, PaginationRequest,
    PaginationResponse, ReadManyRequest, ReadOneRequest, RecoverRequest, SearchRequest,
    SearchResponse, UpdateRequest, UpsertRequest,
};
pub use response::ResponsePolicy;
