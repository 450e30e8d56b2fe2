//! # Pagination
//!
//! Two strategies over the same request model:
//!
//! - **Offset** ([`paginate_offset`]): `skip`/`take` with a total count and page numbers.
//! - **Cursor** ([`paginate_cursor`]): keyset pagination over the primary key. Each page
//!   continues strictly after the last primary key of the previous one, so concurrent inserts
//!   never shift pages.
//!
//! Both return opaque tokens produced by [`codec`]: `query` snapshots the filter of the first
//! page so later pages can be requested with the token alone, and cursor pages also return
//! `nextCursor`.

pub mod codec;
pub mod cursor;
pub mod metadata;
pub mod offset;

pub use codec::{decode, encode};
pub use cursor::{CursorPage, cursor_keys, keyset_condition, paginate_cursor, primary_key_of};
pub use metadata::{offset_metadata, page_count, page_number};
pub use offset::{OffsetPage, paginate_offset};
