//! # Paging & Counting
//!
//! Page position arithmetic ([`PageRequest`]), the window a renderer asks
//! for ([`PageWindow`]), how totals are obtained ([`CountStrategy`]),
//! count-query derivation for SQL text, and continuation tokens for stores
//! without offset paging.

mod count;
mod cursor;
mod errors;
mod request;

pub use count::{count_sql, count_sql_as, TOTAL_COLUMN};
pub use cursor::{decode_token, encode_token};
pub use errors::{PagingError, PagingResult};
pub use request::{CountStrategy, PageRequest, PageWindow};
