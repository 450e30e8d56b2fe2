use crate::models::PageMetadata;

/// 1-based page number of an offset. Without an explicit offset the page is 1.
#[must_use]
pub fn page_number(offset: Option<u64>, take: u64) -> u64 {
    match offset {
        Some(offset) if offset > 0 && take > 0 => offset / take + 1,
        _ => 1,
    }
}

/// Number of pages needed for `total` records, never less than 1
#[must_use]
pub fn page_count(total: u64, take: u64) -> u64 {
    if total == 0 || take == 0 {
        1
    } else {
        total.div_ceil(take)
    }
}

/// Metadata of an offset page.
///
/// The returned `offset` is where the next page starts.
#[must_use]
pub fn offset_metadata(
    offset: Option<u64>,
    take: u64,
    total: u64,
    returned: usize,
    query: String,
) -> PageMetadata {
    PageMetadata::Offset {
        page: page_number(offset, take),
        pages: page_count(total, take),
        total,
        offset: offset.unwrap_or(0) + returned as u64,
        query,
    }
}

/// Metadata of a cursor page
#[must_use]
pub fn cursor_metadata(next_cursor: String, limit: u64, query: String) -> PageMetadata {
    PageMetadata::Cursor {
        next_cursor,
        limit,
        query,
    }
}
