use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select};

use super::codec::{decode_opt, encode};
use super::metadata::offset_metadata;
use crate::core::CrudResource;
use crate::errors::CrudError;
use crate::filtering::{Sort, build_equality_condition, primary_key_order};
use crate::models::{JsonMap, PaginationResponse};

/// Inputs of one offset page. `take` is the already validated page size.
#[derive(Debug, Clone, Copy)]
pub struct OffsetPage<'a> {
    pub offset: Option<u64>,
    pub explicit: bool,
    pub query: Option<&'a str>,
    pub equality: &'a JsonMap,
    pub sort: Sort,
    pub take: u64,
}

/// Fetch one page by offset pagination.
///
/// When the request carries an explicit offset or limit the filter comes from its `query`
/// token, otherwise from `equality`. The total counts every record matching the filter under
/// the same soft-delete visibility as the page.
///
/// # Errors
///
/// Returns `CrudError::Validation` for a malformed `query` token or filter and a database
/// error if a query fails.
pub async fn paginate_offset<R, C>(
    db: &C,
    select: Select<R::EntityType>,
    page: OffsetPage<'_>,
) -> Result<PaginationResponse, CrudError>
where
    R: CrudResource,
    C: ConnectionTrait,
{
    let filter = if page.explicit {
        decode_opt(page.query)?
    } else {
        page.equality.clone()
    };
    let filtered = select.filter(build_equality_condition::<R>(&filter)?);

    let total = filtered.clone().count(db).await?;

    let mut query = filtered;
    for (column, order) in primary_key_order::<R>(page.sort) {
        query = query.order_by(column, order);
    }
    let records = query
        .offset(page.offset.unwrap_or(0))
        .limit(page.take)
        .into_json()
        .all(db)
        .await?;
    tracing::trace!(
        resource = R::RESOURCE_NAME,
        total,
        returned = records.len(),
        "offset page fetched"
    );

    let metadata_query = page.query.map_or_else(|| encode(&filter), str::to_string);
    Ok(PaginationResponse {
        metadata: offset_metadata(page.offset, page.take, total, records.len(), metadata_query),
        data: records,
    })
}
