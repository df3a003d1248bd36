//! User lifecycle operations and authorization checks.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use workbench_domain::id::{ApiKeyId, UserId};
use workbench_domain::sort::Sort;

use crate::context::RequestContext;
use crate::domain::repository::{ApiKeyStore, UserStore};
use crate::domain::types::{ApiKey, User, UserOrderBy, UserQuery};
use crate::error::UsersServiceError;
use crate::filter::{FilterOperator, FilterValue, Predicate, UserField};

/// Input for [`UserManager::create`]. The password arrives pre-hashed or
/// opaque; the core stores it as given.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Parameters for [`UserManager::list`]. `limit`/`offset` apply after
/// ordering; the default order is id ascending, which is creation order.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order_by: Option<UserOrderBy>,
    pub filters: Vec<Predicate>,
}

/// Entity manager for user accounts and their API keys.
pub struct UserManager<S, K> {
    users: S,
    api_keys: K,
}

impl<S: UserStore, K: ApiKeyStore> UserManager<S, K> {
    pub fn new(users: S, api_keys: K) -> Self {
        Self { users, api_keys }
    }

    /// Create a user, enforcing email and username uniqueness among
    /// non-purged accounts. The store re-checks under its write lock, so
    /// concurrent racers serialize and exactly one wins.
    pub async fn create(
        &self,
        _ctx: &RequestContext,
        input: NewUser,
    ) -> Result<User, UsersServiceError> {
        for (field, value) in [
            (UserField::Email, &input.email),
            (UserField::Username, &input.username),
        ] {
            let taken = self
                .users
                .exists(field, &FilterValue::Text(value.clone()))
                .await?;
            if taken {
                tracing::warn!(field = field.as_str(), "rejected duplicate user");
                return Err(UsersServiceError::Conflict {
                    field: field.as_str(),
                });
            }
        }

        let now = Utc::now();
        let user = User {
            id: UserId(Uuid::now_v7()),
            email: input.email,
            username: input.username,
            password: input.password,
            active: true,
            is_admin: false,
            deleted: false,
            purged: false,
            disk_usage: 0,
            tags_used: Vec::new(),
            requests: Vec::new(),
            create_time: now,
            update_time: now,
        };
        self.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, "created user");
        Ok(user)
    }

    pub async fn by_id(
        &self,
        _ctx: &RequestContext,
        id: UserId,
    ) -> Result<Option<User>, UsersServiceError> {
        self.users.get(id).await
    }

    /// Fetch several users, returned in the requested id order. Missing ids
    /// are omitted, not an error.
    pub async fn by_ids(
        &self,
        _ctx: &RequestContext,
        ids: &[UserId],
    ) -> Result<Vec<User>, UsersServiceError> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(user) = self.users.get(id).await? {
                out.push(user);
            }
        }
        Ok(out)
    }

    /// List users: filters, then ordering, then offset/limit.
    pub async fn list(
        &self,
        _ctx: &RequestContext,
        params: ListParams,
    ) -> Result<Vec<User>, UsersServiceError> {
        self.users
            .query(&UserQuery {
                filters: params.filters,
                order_by: params.order_by,
                limit: params.limit,
                offset: params.offset,
            })
            .await
    }

    pub async fn by_email(
        &self,
        _ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, UsersServiceError> {
        let mut found = self
            .users
            .query(&UserQuery {
                filters: vec![Predicate::new(
                    UserField::Email,
                    FilterOperator::Eq,
                    FilterValue::Text(email.to_owned()),
                )],
                limit: Some(1),
                ..UserQuery::default()
            })
            .await?;
        Ok(found.pop())
    }

    /// Users whose email matches the SQL-LIKE `pattern`, ordered
    /// alphabetically by email.
    pub async fn by_email_like(
        &self,
        _ctx: &RequestContext,
        pattern: &str,
    ) -> Result<Vec<User>, UsersServiceError> {
        self.users
            .query(&UserQuery {
                filters: vec![Predicate::new(
                    UserField::Email,
                    FilterOperator::Like,
                    FilterValue::Text(pattern.to_owned()),
                )],
                order_by: Some(UserOrderBy::Email(Sort::Asc)),
                ..UserQuery::default()
            })
            .await
    }

    pub fn is_admin(&self, _ctx: &RequestContext, user: &User) -> bool {
        user.is_admin
    }

    /// All users with the administrative flag set, in creation order.
    pub async fn admins(&self, _ctx: &RequestContext) -> Result<Vec<User>, UsersServiceError> {
        self.users
            .query(&UserQuery {
                filters: vec![Predicate::new(
                    UserField::IsAdmin,
                    FilterOperator::Eq,
                    FilterValue::Bool(true),
                )],
                ..UserQuery::default()
            })
            .await
    }

    /// Pass the user through unchanged if an administrator, else fail.
    pub fn error_unless_admin<'a>(
        &self,
        _ctx: &RequestContext,
        user: &'a User,
    ) -> Result<&'a User, UsersServiceError> {
        if user.is_admin {
            Ok(user)
        } else {
            Err(UsersServiceError::AdminRequired)
        }
    }

    /// The actor bound to the context. Never re-derived from the store.
    pub fn current_user<'a>(&self, ctx: &'a RequestContext) -> Option<&'a User> {
        ctx.current_actor()
    }

    /// Pass the user through unchanged if present, else fail.
    pub fn error_if_anonymous<'a>(
        &self,
        _ctx: &RequestContext,
        user: Option<&'a User>,
    ) -> Result<&'a User, UsersServiceError> {
        user.ok_or(UsersServiceError::AuthenticationFailed)
    }

    /// Issue a new API key for the user, superseding any prior key. Returns
    /// the raw key string — shown exactly once, never logged.
    pub async fn create_api_key(
        &self,
        _ctx: &RequestContext,
        user: &User,
    ) -> Result<String, UsersServiceError> {
        let key = generate_key();
        let record = ApiKey {
            id: ApiKeyId(Uuid::new_v4()),
            user_id: user.id,
            key: key.clone(),
            valid: true,
            create_time: Utc::now(),
        };
        self.api_keys.insert(&record).await?;
        tracing::info!(user_id = %user.id, "rotated api key");
        Ok(key)
    }

    /// The currently valid API key record for the user, or `None` if no key
    /// has ever been issued.
    pub async fn valid_api_key(
        &self,
        _ctx: &RequestContext,
        user: &User,
    ) -> Result<Option<ApiKey>, UsersServiceError> {
        self.api_keys.find_valid(user.id).await
    }
}

/// 32 lowercase hex characters from 16 random bytes.
fn generate_key() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
