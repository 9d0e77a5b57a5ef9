//! Mapping of SQLx failures onto store errors.

use crate::domain::store::StoreError;

/// SQLSTATE raised when a referenced table does not exist.
const UNDEFINED_TABLE: &str = "42P01";

/// Extracts the relation name from a Postgres "relation ... does not exist" message.
fn relation_name(message: &str) -> Option<String> {
    let start = message.find("relation \"")? + "relation \"".len();
    let end = message[start..].find('"')? + start;
    let name = &message[start..end];
    Some(name.rsplit('.').next().unwrap_or(name).to_string())
}

/// Converts a SQLx error into the store error taxonomy.
///
/// - undefined table → [`StoreError::MissingCollection`]
/// - pool, I/O and TLS failures → [`StoreError::Unavailable`]
/// - row decoding failures → [`StoreError::Malformed`]
/// - everything else → [`StoreError::Backend`]
pub fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.code().as_deref() == Some(UNDEFINED_TABLE) {
            let name = relation_name(db_err.message()).unwrap_or_else(|| "publications".into());
            return StoreError::MissingCollection(name);
        }
        return StoreError::Backend(db_err.message().to_string());
    }

    match e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(e.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Malformed(e.to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}
