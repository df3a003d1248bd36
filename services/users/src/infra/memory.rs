//! In-process store implementation.
//!
//! Reference implementation of the store traits for embedders and the test
//! suite. Uniqueness checks run under the table's write lock, and API-key
//! supersession is one critical section, so the concurrency contract of
//! [`crate::domain::repository`] holds.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use workbench_domain::id::UserId;

use crate::domain::repository::{ApiKeyStore, UserStore};
use crate::domain::types::{ApiKey, User, UserOrderBy, UserQuery};
use crate::error::UsersServiceError;
use crate::filter::{FilterOperator, FilterValue, Predicate, UserField};

#[derive(Default)]
struct Tables {
    users: RwLock<Vec<User>>,
    api_keys: RwLock<Vec<ApiKey>>,
}

/// Shared-handle in-memory store. Clones point at the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_users(&self) -> Result<RwLockReadGuard<'_, Vec<User>>, UsersServiceError> {
        self.tables
            .users
            .read()
            .map_err(|_| poisoned("user table"))
    }

    fn write_users(&self) -> Result<RwLockWriteGuard<'_, Vec<User>>, UsersServiceError> {
        self.tables
            .users
            .write()
            .map_err(|_| poisoned("user table"))
    }

    fn read_keys(&self) -> Result<RwLockReadGuard<'_, Vec<ApiKey>>, UsersServiceError> {
        self.tables
            .api_keys
            .read()
            .map_err(|_| poisoned("api key table"))
    }

    fn write_keys(&self) -> Result<RwLockWriteGuard<'_, Vec<ApiKey>>, UsersServiceError> {
        self.tables
            .api_keys
            .write()
            .map_err(|_| poisoned("api key table"))
    }
}

fn poisoned(table: &str) -> UsersServiceError {
    UsersServiceError::Internal(anyhow::anyhow!("{table} lock poisoned"))
}

fn unique_field_taken(users: &[User], field: UserField, value: &str) -> bool {
    users.iter().any(|u| {
        !u.purged
            && match field {
                UserField::Email => u.email == value,
                UserField::Username => u.username == value,
                _ => false,
            }
    })
}

impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<UserId, UsersServiceError> {
        let mut users = self.write_users()?;
        // Re-check uniqueness under the write lock: racing creates serialize
        // here and the loser observes the conflict.
        for (field, value) in [
            (UserField::Email, &user.email),
            (UserField::Username, &user.username),
        ] {
            if unique_field_taken(&users, field, value) {
                return Err(UsersServiceError::Conflict {
                    field: field.as_str(),
                });
            }
        }
        users.push(user.clone());
        Ok(user.id)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, UsersServiceError> {
        Ok(self.read_users()?.iter().find(|u| u.id == id).cloned())
    }

    async fn query(&self, query: &UserQuery) -> Result<Vec<User>, UsersServiceError> {
        let users = self.read_users()?;
        let mut out: Vec<User> = users
            .iter()
            .filter(|u| query.filters.iter().all(|p| p.matches(u)))
            .cloned()
            .collect();
        drop(users);

        match query.order_by.unwrap_or_default() {
            UserOrderBy::Id(sort) => out.sort_by(|a, b| sort.apply(a.id.cmp(&b.id))),
            // Tie-break on id so equal timestamps still give a total order.
            UserOrderBy::CreateTime(sort) => out.sort_by(|a, b| {
                sort.apply(a.create_time.cmp(&b.create_time).then(a.id.cmp(&b.id)))
            }),
            UserOrderBy::Email(sort) => {
                out.sort_by(|a, b| sort.apply(a.email.cmp(&b.email).then(a.id.cmp(&b.id))))
            }
        }

        let offset = query.offset.unwrap_or(0);
        let mut out: Vec<User> = out.into_iter().skip(offset).collect();
        if let Some(limit) = query.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn exists(
        &self,
        field: UserField,
        value: &FilterValue,
    ) -> Result<bool, UsersServiceError> {
        let probe = Predicate::new(field, FilterOperator::Eq, value.clone());
        Ok(self
            .read_users()?
            .iter()
            .any(|u| !u.purged && probe.matches(u)))
    }
}

impl ApiKeyStore for MemoryStore {
    async fn insert(&self, key: &ApiKey) -> Result<(), UsersServiceError> {
        let mut keys = self.write_keys()?;
        for existing in keys.iter_mut().filter(|k| k.user_id == key.user_id) {
            existing.valid = false;
        }
        keys.push(key.clone());
        Ok(())
    }

    async fn find_valid(&self, user_id: UserId) -> Result<Option<ApiKey>, UsersServiceError> {
        // Insertion order is issuance order; the newest valid key wins.
        Ok(self
            .read_keys()?
            .iter()
            .rev()
            .find(|k| k.user_id == user_id && k.valid)
            .cloned())
    }
}
