//! Continuation tokens for cursor-paged stores.
//!
//! Stores hand back raw paging state (a Cassandra page state, a serialized
//! DynamoDB start key, a Firestore document id). Callers only ever see it
//! hex-encoded.

use super::errors::{PagingError, PagingResult};

pub fn encode_token(state: &[u8]) -> String {
    hex::encode(state)
}

/// Decode a caller-supplied token. Blank tokens mean "first page".
pub fn decode_token(token: Option<&str>) -> PagingResult<Option<Vec<u8>>> {
    match token.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(t) => hex::decode(t)
            .map(Some)
            .map_err(|err| PagingError::InvalidCursor {
                token: t.to_string(),
                reason: err.to_string(),
            }),
    }
}
