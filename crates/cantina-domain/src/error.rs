//! # Service Error Types
//!
//! One error type across the domain services. Variants map 1:1 onto how the
//! UI layer reacts: NotFound/Validation are user-correctable, Conflict names
//! the other session's responsible person, Db/Remote are infrastructure.

use thiserror::Error;

/// Result type alias for domain service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error from a domain service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced entity does not exist (or is not in the required
    /// state, e.g. closing when no workday is open).
    #[error("{0} not found")]
    NotFound(String),

    /// Caller input failed a domain rule.
    #[error(transparent)]
    Validation(#[from] cantina_core::ValidationError),

    /// The open-workday lock is held by another session.
    #[error("A workday is already open{}", .responsible.as_deref().map(|r| format!(" (opened by {r})")).unwrap_or_default())]
    Conflict { responsible: Option<String> },

    /// Local store failure.
    #[error(transparent)]
    Db(#[from] cantina_db::DbError),

    /// Remote store failure that the operation could not absorb.
    #[error(transparent)]
    Remote(#[from] cantina_remote::RemoteError),
}

impl ServiceError {
    /// Shorthand for the common entity-not-found case.
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_responsible() {
        let err = ServiceError::Conflict { responsible: Some("Carlos".into()) };
        assert!(err.to_string().contains("Carlos"));
    }

    #[test]
    fn test_db_not_found_converts() {
        let db_err = cantina_db::DbError::not_found("Product", 7);
        let err: ServiceError = db_err.into();
        assert!(matches!(err, ServiceError::Db(_)));
    }
}
