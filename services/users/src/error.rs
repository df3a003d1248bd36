/// Users core error variants.
#[derive(Debug, thiserror::Error)]
pub enum UsersServiceError {
    #[error("{field} already in use")]
    Conflict { field: &'static str },
    #[error("administrator privileges required")]
    AdminRequired,
    #[error("authentication required")]
    AuthenticationFailed,
    #[error("filter not permitted: {field} {operator}")]
    FilterParsing { field: String, operator: String },
    #[error("no serializer registered for key: {key}")]
    Serialization { key: String },
    #[error("unknown view: {view}")]
    UnknownView { view: String },
    #[error("neither a view nor explicit keys were supplied")]
    NoViewSupplied,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl UsersServiceError {
    /// Stable discriminant for transport-layer status mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "CONFLICT",
            Self::AdminRequired => "ADMIN_REQUIRED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::FilterParsing { .. } => "FILTER_PARSING",
            Self::Serialization { .. } => "SERIALIZATION",
            Self::UnknownView { .. } => "UNKNOWN_VIEW",
            Self::NoViewSupplied => "NO_VIEW_SUPPLIED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}
