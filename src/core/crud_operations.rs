use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, IdenStatic,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait, Value,
};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;

use super::lookup::{
    KeyValues, find_record, is_soft_deleted, key_condition, render_key, visible_select,
};
use super::policy::{CrudPolicy, Method};
use super::traits::{CrudResource, ResourceColumn};
use crate::errors::CrudError;
use crate::filtering::{
    build_filter_condition, json_to_value, key_columns, now_value, resolve_fields, resolve_order,
    resolve_relations, utc_timestamp,
};
use crate::models::{
    CreateManyRequest, CreateRequest, DeleteRequest, JsonMap, PaginationRequest,
    PaginationResponse, ReadManyRequest, ReadOneRequest, RecoverRequest, SearchRequest,
    SearchResponse, UpdateRequest, UpsertRequest,
};
use crate::pagination::{CursorPage, OffsetPage, paginate_cursor, paginate_offset};
use crate::response::{ResponsePolicy, shape, shape_many};

/// CRUD operations for one resource.
///
/// The service owns a clone of the connection pool and the policy; it holds no other state,
/// so clones can be handed to concurrent request handlers freely.
///
/// ```rust,ignore
/// let posts = CrudService::<Posts>::new(db.clone());
/// let page = posts.read_many(ReadManyRequest::default()).await?;
/// let next = posts
///     .read_many(ReadManyRequest {
///         pagination: PaginationRequest::Cursor {
///             next_cursor: Some(page.metadata.next_cursor().unwrap_or_default().to_string()),
///             query: Some(page.metadata.query().to_string()),
///         },
///         ..Default::default()
///     })
///     .await?;
/// ```
pub struct CrudService<R: CrudResource> {
    db: DatabaseConnection,
    policy: CrudPolicy,
    resource: PhantomData<fn() -> R>,
}

impl<R: CrudResource> Clone for CrudService<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            policy: self.policy.clone(),
            resource: PhantomData,
        }
    }
}

impl<R: CrudResource> std::fmt::Debug for CrudService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudService")
            .field("resource", &R::RESOURCE_NAME)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<R: CrudResource> CrudService<R> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            policy: CrudPolicy::default(),
            resource: PhantomData,
        }
    }

    /// Replace the default policy
    #[must_use]
    pub fn with_policy(mut self, policy: CrudPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &CrudPolicy {
        &self.policy
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert one record built from the request body.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown fields or values that do not fit their column, `Conflict` for
    /// unique or foreign key violations.
    pub async fn create(&self, request: CreateRequest) -> Result<Option<JsonValue>, CrudError> {
        tracing::debug!(resource = R::RESOURCE_NAME, method = %Method::Create, "handling request");
        let policy = self.policy.response(request.response);

        let active = new_active_model::<R>(&body_values::<R>(&request.body)?)?;
        let model = active.insert(&self.db).await.map_err(CrudError::from_write)?;
        Ok(shape(to_record(&model)?, policy, &R::primary_key_fields()))
    }

    /// Insert several records in one transaction; either all are created or none.
    ///
    /// # Errors
    ///
    /// `Validation` when any body is invalid (nothing is written), `Conflict` for constraint
    /// violations.
    pub async fn create_many(
        &self,
        request: CreateManyRequest,
    ) -> Result<Option<Vec<JsonValue>>, CrudError> {
        tracing::debug!(
            resource = R::RESOURCE_NAME,
            method = %Method::CreateMany,
            count = request.bodies.len(),
            "handling request"
        );
        let policy = self.policy.response(request.response);

        let mut errors = Vec::new();
        let mut active_models = Vec::with_capacity(request.bodies.len());
        for (index, body) in request.bodies.iter().enumerate() {
            match body_values::<R>(body) {
                Ok(values) => active_models.push(new_active_model::<R>(&values)?),
                Err(CrudError::Validation { errors: messages }) => errors.extend(
                    messages
                        .into_iter()
                        .map(|message| format!("bodies[{index}]: {message}")),
                ),
                Err(other) => return Err(other),
            }
        }
        if !errors.is_empty() {
            return Err(CrudError::validation_many(errors));
        }

        let txn = self.db.begin().await?;
        let mut records = Vec::with_capacity(active_models.len());
        for active in active_models {
            let model = active.insert(&txn).await.map_err(CrudError::from_write)?;
            records.push(to_record(&model)?);
        }
        txn.commit().await?;

        Ok(shape_many(records, policy, &R::primary_key_fields()))
    }

    /// Fetch one record by primary key.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed key, field selection or relation list, `NotFound` when no
    /// visible record matches.
    pub async fn read_one(&self, request: ReadOneRequest) -> Result<Option<JsonValue>, CrudError> {
        tracing::debug!(resource = R::RESOURCE_NAME, method = %Method::ReadOne, "handling request");
        let policy = self.policy.response(request.response);
        let with_deleted = request
            .soft_deleted
            .unwrap_or(self.policy.read_soft_deleted);
        let columns = resolve_fields::<R>(request.fields.as_deref())?;
        let relations = resolve_relations::<R>(request.relations.as_deref())?;
        let (condition, _) = key_condition::<R>(&request.params)?;

        let record = find_record::<R, _>(&self.db, condition, &columns, with_deleted)
            .await?
            .ok_or_else(|| not_found::<R>(&request.params))?;

        let mut records = vec![record];
        self.attach_relations(&mut records, &relations).await?;
        Ok(records
            .pop()
            .and_then(|record| shape(record, policy, &R::primary_key_fields())))
    }

    /// Fetch one page of records matching the equality query.
    ///
    /// # Errors
    ///
    /// `Validation` for an invalid page size, filter, relation list or pagination token.
    pub async fn read_many(&self, request: ReadManyRequest) -> Result<PaginationResponse, CrudError> {
        tracing::debug!(resource = R::RESOURCE_NAME, method = %Method::ReadMany, "handling request");
        let sort = request.sort.unwrap_or(self.policy.default_sort);
        let with_deleted = request
            .soft_deleted
            .unwrap_or(self.policy.read_soft_deleted);
        let relations = resolve_relations::<R>(request.relations.as_deref())?;
        let select = visible_select::<R>(&R::columns(), with_deleted);

        let mut page = match &request.pagination {
            PaginationRequest::Cursor { next_cursor, query } => {
                let page = CursorPage {
                    next_cursor: next_cursor.as_deref(),
                    query: query.as_deref(),
                    equality: &request.query,
                    sort,
                    limit: self.policy.take(request.take)?,
                };
                paginate_cursor::<R, _>(&self.db, select, page).await?
            }
            PaginationRequest::Offset {
                offset,
                limit,
                query,
            } => {
                let page = OffsetPage {
                    offset: *offset,
                    explicit: offset.is_some() || limit.is_some(),
                    query: query.as_deref(),
                    equality: &request.query,
                    sort,
                    take: self.policy.take(limit.or(request.take))?,
                };
                paginate_offset::<R, _>(&self.db, select, page).await?
            }
        };

        self.attach_relations(&mut page.data, &relations).await?;
        Ok(page)
    }

    /// Run a structured search: projection, OR-of-AND filter, explicit order and a limit.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown fields anywhere in the request, unsupported operators, malformed
    /// operands or an invalid `take`.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, CrudError> {
        tracing::debug!(resource = R::RESOURCE_NAME, method = %Method::Search, "handling request");
        let columns = resolve_fields::<R>(request.select.as_deref())?;
        let condition = build_filter_condition::<R>(&request.filter)?;
        let order = resolve_order::<R>(&request.order, self.policy.default_sort)?;
        let take = self.policy.take(request.take)?;
        let relations = resolve_relations::<R>(request.relations.as_deref())?;
        let with_deleted = request
            .with_deleted
            .unwrap_or(self.policy.read_soft_deleted);

        let mut query = visible_select::<R>(&columns, with_deleted).filter(condition);
        for (column, direction) in order {
            query = query.order_by(column, direction);
        }
        let mut data = query.limit(take).into_json().all(&self.db).await?;

        self.attach_relations(&mut data, &relations).await?;
        Ok(SearchResponse { data })
    }

    /// Change the supplied fields of an existing record.
    ///
    /// # Errors
    ///
    /// `Validation` when the body touches a primary key field or does not fit the columns,
    /// `NotFound` when no record matches (soft-deleted records only with `soft_deleted`).
    pub async fn update(&self, request: UpdateRequest) -> Result<Option<JsonValue>, CrudError> {
        tracing::debug!(resource = R::RESOURCE_NAME, method = %Method::Update, "handling request");
        let policy = self.policy.response(request.response);
        let values = update_values::<R>(&request.body)?;
        let (condition, key) = key_condition::<R>(&request.params)?;

        let existing = find_record::<R, _>(
            &self.db,
            condition,
            &lookup_columns::<R>(policy),
            request.soft_deleted.unwrap_or(false),
        )
        .await?
        .ok_or_else(|| not_found::<R>(&request.params))?;

        if values.is_empty() {
            return Ok(shape(existing, policy, &R::primary_key_fields()));
        }
        let record = self.save(&key, values).await?;
        Ok(shape(record, policy, &R::primary_key_fields()))
    }

    /// Update the record when it exists, create it from the key and body otherwise.
    ///
    /// # Errors
    ///
    /// `Conflict` when the record is soft-deleted, `Validation` for an invalid key or body.
    pub async fn upsert(&self, request: UpsertRequest) -> Result<Option<JsonValue>, CrudError> {
        tracing::debug!(resource = R::RESOURCE_NAME, method = %Method::Upsert, "handling request");
        let policy = self.policy.response(request.response);
        let values = update_values::<R>(&request.body)?;
        let (condition, key) = key_condition::<R>(&request.params)?;

        let existing =
            find_record::<R, _>(&self.db, condition, &lookup_columns::<R>(policy), true).await?;
        let record = match existing {
            Some(record) if is_soft_deleted::<R>(&record) => {
                return Err(CrudError::conflict("deleted record cannot be upserted"));
            }
            Some(record) if values.is_empty() => record,
            Some(_) => self.save(&key, values).await?,
            None => {
                let mut seeded = key;
                seeded.extend(values);
                let model = new_active_model::<R>(&seeded)?
                    .insert(&self.db)
                    .await
                    .map_err(CrudError::from_write)?;
                to_record(&model)?
            }
        };
        Ok(shape(record, policy, &R::primary_key_fields()))
    }

    /// Soft-delete or remove a record.
    ///
    /// Without an explicit `soft_deleted` the record is soft-deleted when the resource has a
    /// soft-delete column and removed otherwise. A soft delete responds with the saved record,
    /// a hard delete with the record as it was before removal.
    ///
    /// # Errors
    ///
    /// `Conflict` when the resource has no primary key or a soft delete is requested on a
    /// resource without a soft-delete column, `NotFound` when no active record matches.
    pub async fn delete(&self, request: DeleteRequest) -> Result<Option<JsonValue>, CrudError> {
        tracing::debug!(
            resource = R::RESOURCE_NAME,
            method = %Method::Delete,
            soft_deleted = ?request.soft_deleted,
            "handling request"
        );
        let policy = self.policy.response(request.response);
        let marker = match (request.soft_deleted, R::soft_delete_column()) {
            (Some(false), _) | (None, None) => None,
            (_, Some(marker)) => Some(marker),
            (Some(true), None) => {
                return Err(CrudError::conflict(format!(
                    "{} does not support soft delete",
                    R::RESOURCE_NAME
                )));
            }
        };
        let (condition, key) = key_condition::<R>(&request.params)?;

        let existing = find_record::<R, _>(
            &self.db,
            condition,
            &lookup_columns::<R>(policy),
            false,
        )
        .await?
        .ok_or_else(|| not_found::<R>(&request.params))?;

        let record = if let Some(marker) = marker {
            self.save(&key, vec![(marker, now_value(marker))]).await?
        } else {
            new_active_model::<R>(&key)?
                .delete(&self.db)
                .await
                .map_err(CrudError::from_write)?;
            existing
        };
        Ok(shape(record, policy, &R::primary_key_fields()))
    }

    /// Clear the soft-delete marker of a record.
    ///
    /// # Errors
    ///
    /// `Conflict` when the resource has no soft-delete column, `NotFound` when no record
    /// matches.
    pub async fn recover(&self, request: RecoverRequest) -> Result<Option<JsonValue>, CrudError> {
        tracing::debug!(resource = R::RESOURCE_NAME, method = %Method::Recover, "handling request");
        let policy = self.policy.response(request.response);
        let marker = R::soft_delete_column().ok_or_else(|| {
            CrudError::conflict(format!("{} does not support soft delete", R::RESOURCE_NAME))
        })?;
        let (condition, key) = key_condition::<R>(&request.params)?;

        find_record::<R, _>(
            &self.db,
            condition,
            &lookup_columns::<R>(policy),
            true,
        )
        .await?
        .ok_or_else(|| not_found::<R>(&request.params))?;

        let cleared = json_to_value(marker, &JsonValue::Null)?;
        let record = self.save(&key, vec![(marker, cleared)]).await?;
        Ok(shape(record, policy, &R::primary_key_fields()))
    }

    /// Write `values` onto the record addressed by `key` through the active model, so the
    /// entity's `ActiveModelBehavior` hooks run, and return the saved record.
    async fn save(
        &self,
        key: &KeyValues<R>,
        values: Vec<(ResourceColumn<R>, Value)>,
    ) -> Result<JsonValue, CrudError> {
        let mut active = new_active_model::<R>(key)?;
        for (column, value) in values {
            set_field::<R>(&mut active, column, value)?;
        }
        let model = active
            .update(&self.db)
            .await
            .map_err(CrudError::from_write)?;
        to_record(&model)
    }

    async fn attach_relations(
        &self,
        records: &mut [JsonValue],
        relations: &[String],
    ) -> Result<(), CrudError> {
        if relations.is_empty() || records.is_empty() {
            return Ok(());
        }
        tracing::trace!(resource = R::RESOURCE_NAME, ?relations, "loading relations");
        R::load_relations(&self.db, records, relations).await?;
        Ok(())
    }
}

/// Columns a mutation reads before writing
fn lookup_columns<R: CrudResource>(policy: ResponsePolicy) -> Vec<ResourceColumn<R>> {
    if policy == ResponsePolicy::FullEntity {
        R::columns()
    } else {
        key_columns::<R>()
    }
}

fn not_found<R: CrudResource>(params: &JsonMap) -> CrudError {
    CrudError::not_found(R::RESOURCE_NAME, Some(render_key(params)))
}

/// Typed column values of a request body
fn body_values<R: CrudResource>(
    body: &JsonMap,
) -> Result<Vec<(ResourceColumn<R>, Value)>, CrudError> {
    let mut errors = Vec::new();
    let mut values = Vec::with_capacity(body.len());
    for (field, json) in body {
        let Some(column) = R::find_column(field) else {
            errors.push(format!("unknown field '{field}'"));
            continue;
        };
        if json.is_null() && !column.def().is_null() {
            errors.push(format!("field '{field}' cannot be null"));
            continue;
        }
        match json_to_value(column, json) {
            Ok(value) => values.push((column, value)),
            Err(CrudError::Validation { errors: messages }) => errors.extend(messages),
            Err(other) => return Err(other),
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(CrudError::validation_many(errors))
    }
}

/// Body values of an update, which must leave the primary key alone
fn update_values<R: CrudResource>(
    body: &JsonMap,
) -> Result<Vec<(ResourceColumn<R>, Value)>, CrudError> {
    let primary_key = R::primary_key_fields();
    let touched: Vec<String> = body
        .keys()
        .filter(|field| primary_key.contains(field))
        .map(|field| format!("primary key field '{field}' cannot be changed"))
        .collect();
    if !touched.is_empty() {
        return Err(CrudError::validation_many(touched));
    }
    body_values::<R>(body)
}

fn new_active_model<R: CrudResource>(
    values: &[(ResourceColumn<R>, Value)],
) -> Result<R::ActiveModelType, CrudError> {
    let mut active = <R::ActiveModelType as ActiveModelBehavior>::new();
    for (column, value) in values {
        set_field::<R>(&mut active, *column, value.clone())?;
    }
    Ok(active)
}

/// Set one field, retrying timestamps as `DateTime<Utc>` for fields declared with that type
fn set_field<R: CrudResource>(
    active: &mut R::ActiveModelType,
    column: ResourceColumn<R>,
    value: Value,
) -> Result<(), CrudError> {
    match active.try_set(column, value.clone()) {
        Ok(()) => Ok(()),
        Err(DbErr::Type(_)) => utc_timestamp(&value)
            .and_then(|utc| active.try_set(column, utc).ok())
            .ok_or_else(|| {
                CrudError::validation(format!(
                    "field '{}' cannot hold {value:?}",
                    column.as_str()
                ))
            }),
        Err(other) => Err(other.into()),
    }
}
