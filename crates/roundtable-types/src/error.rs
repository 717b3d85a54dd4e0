use thiserror::Error;

/// Errors related to role operations.
#[derive(Debug, Error)]
pub enum RoleError {
    #[error("role not found")]
    NotFound,

    #[error("role '{0}' already exists")]
    NameConflict(String),

    #[error("invalid role name: {0}")]
    InvalidName(String),

    #[error("invalid role status: '{0}'")]
    InvalidStatus(String),

    #[error("unknown ability '{0}'")]
    UnknownAbility(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to room operations.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,

    #[error("unknown role '{0}' in assignment")]
    UnknownAssignedRole(String),

    #[error("room title must not be empty")]
    EmptyTitle,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to ability resolution and execution.
#[derive(Debug, Error)]
pub enum AbilityError {
    #[error("ability '{0}' not found")]
    NotFound(String),

    #[error("ability '{0}' already exists")]
    IdConflict(String),

    #[error("the dialogue ability cannot be modified")]
    BuiltinImmutable,

    #[error("ability '{0}' comes from configuration and cannot be modified here")]
    ConfiguredImmutable(String),

    #[error("missing parameter '{name}' for placeholder substitution")]
    MissingParameter { name: String },

    #[error("unsafe argument '{argument}': {reason}")]
    UnsafeArgument { argument: String, reason: String },

    #[error("ability '{0}' has no executable template")]
    NoTemplate(String),

    #[error("command timed out after {0} seconds")]
    Timeout(u64),

    #[error("failed to spawn command: {0}")]
    Spawn(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in roundtable-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
