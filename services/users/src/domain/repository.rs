#![allow(async_fn_in_trait)]

use workbench_domain::id::UserId;

use crate::domain::types::{ApiKey, User, UserQuery};
use crate::error::UsersServiceError;
use crate::filter::{FilterValue, UserField};

/// Store for user records (the Entity Store collaborator).
///
/// Implementations must give at least read-committed consistency and
/// serialize concurrent inserts so that of two racers colliding on email or
/// username exactly one succeeds and the other observes `Conflict`.
pub trait UserStore: Send + Sync {
    /// Insert a new user. Email and username uniqueness among non-purged
    /// rows is enforced atomically with the write.
    async fn insert(&self, user: &User) -> Result<UserId, UsersServiceError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, UsersServiceError>;

    /// Run a predicate/order/limit/offset query. Ordering defaults to
    /// [`UserOrderBy::default`] when the query carries none.
    async fn query(&self, query: &UserQuery) -> Result<Vec<User>, UsersServiceError>;

    /// Whether any non-purged user has `field` exactly equal to `value`.
    async fn exists(
        &self,
        field: UserField,
        value: &FilterValue,
    ) -> Result<bool, UsersServiceError>;
}

/// Store for issued API keys.
pub trait ApiKeyStore: Send + Sync {
    /// Persist a new key and invalidate any previously valid key for the
    /// same user, atomically.
    async fn insert(&self, key: &ApiKey) -> Result<(), UsersServiceError>;

    /// The most recently issued valid key for the user, if any.
    async fn find_valid(&self, user_id: UserId) -> Result<Option<ApiKey>, UsersServiceError>;
}
