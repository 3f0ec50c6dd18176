use crate::models::EntityKind;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{} not found", .entity.label())]
    NotFound { entity: EntityKind, id: i64 },
    #[error("{field} references unknown {} {id}", .entity.singular())]
    ForeignKey {
        field: &'static str,
        entity: EntityKind,
        id: i64,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("failed to read import file: {0}")]
    FileRead(std::io::Error),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
}

impl CoreError {
    /// Whether the error was caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidInput(_)
                | CoreError::NotFound { .. }
                | CoreError::ForeignKey { .. }
                | CoreError::Conflict(_)
        )
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return CoreError::Conflict(format!("unique constraint violated: {}", db.message()));
            }
            if db.is_foreign_key_violation() {
                return CoreError::Conflict(format!(
                    "foreign key constraint violated: {}",
                    db.message()
                ));
            }
        }
        CoreError::Database(e)
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
