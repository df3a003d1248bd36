use chrono::{DateTime, Utc};
use serde::Serialize;

use workbench_domain::id::{ApiKeyId, RequestId, UserId};
use workbench_domain::sort::Sort;

use crate::filter::Predicate;

/// User account record.
///
/// `password` is an opaque credential as handed to the core; hashing is an
/// external collaborator's job. It is never emitted by any serialized view.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub password: String,
    pub active: bool,
    pub is_admin: bool,
    pub deleted: bool,
    pub purged: bool,
    pub disk_usage: u64,
    pub tags_used: Vec<String>,
    pub requests: Vec<RequestId>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Rotating secret credential. At most one key per user is valid at a time;
/// inserting a new one supersedes the previous.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub user_id: UserId,
    pub key: String,
    pub valid: bool,
    #[serde(serialize_with = "workbench_core::serde::to_rfc3339_ms")]
    pub create_time: DateTime<Utc>,
}

/// Orderings a store must support for user queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrderBy {
    /// UUIDv7 ids, so ascending id order is creation order.
    Id(Sort),
    CreateTime(Sort),
    Email(Sort),
}

impl Default for UserOrderBy {
    /// The documented default list order: id ascending (= creation order).
    fn default() -> Self {
        Self::Id(Sort::Asc)
    }
}

/// A query handed to the store: predicates, ordering, then limit/offset.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub filters: Vec<Predicate>,
    pub order_by: Option<UserOrderBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
