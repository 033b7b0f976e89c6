use docflow_core::Error;

/// Collapse driver errors into the workflow taxonomy. Row-not-found keeps
/// its meaning; everything else is a storage fault the caller can only
/// report.
pub(crate) fn map_sqlx(context: &str, e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::RowNotFound => Error::NotFound(context.to_string()),
        other => Error::Database(format!("{context}: {other}")),
    }
}

/// A stored enum value no variant matches. Only reachable if the table was
/// written by something other than this crate.
pub(crate) fn corrupt(context: &str, value: &str) -> Error {
    Error::Database(format!("corrupt {context} value '{value}'"))
}
