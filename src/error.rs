//! Error types for the onboarding pipeline.
//!
//! Insufficient user input is never an error here: the classifier and the
//! extractor report it as data (a clarification request). These types cover
//! configuration, persistence, and rejected state transitions only.

use uuid::Uuid;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError),

    #[error("Rate limited: {key}")]
    RateLimited { key: String },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Curriculum/mentor assignment errors.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("Curriculum item {item_id} is not assigned to user {user_id}")]
    NotAssigned { user_id: String, item_id: Uuid },

    #[error("Assignment for item {item_id} already {state}, cannot move to {target}")]
    InvalidTransition {
        item_id: Uuid,
        state: String,
        target: String,
    },
}

/// Failure of one repair step. Recorded in the step outcome, never
/// returned: the job moves on to the next step.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("Repair step {step} failed for user {user_id}: {reason}")]
    StepFailed {
        step: String,
        user_id: String,
        reason: String,
    },
}

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
