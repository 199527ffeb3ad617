use sqlx::PgPool;

/// Executor for the SQL command/query structs defined in [`crate::entities`].
///
/// Each database operation is a struct implementing
/// `kanau::processor::Processor` against this type, keeping every SQL
/// statement a named, testable unit.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
