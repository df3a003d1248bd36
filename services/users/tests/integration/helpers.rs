use chrono::Utc;
use uuid::Uuid;

use workbench_domain::id::UserId;
use workbench_users::context::RequestContext;
use workbench_users::domain::repository::UserStore;
use workbench_users::domain::types::User;
use workbench_users::infra::memory::MemoryStore;
use workbench_users::manager::{NewUser, UserManager};

pub const DEFAULT_PASSWORD: &str = "123456";

pub type TestManager = UserManager<MemoryStore, MemoryStore>;

/// Manager plus a handle onto the same store, for direct seeding.
pub fn test_manager() -> (TestManager, MemoryStore) {
    workbench_core::tracing::init_tracing();
    let store = MemoryStore::new();
    (UserManager::new(store.clone(), store.clone()), store)
}

pub fn new_user(n: u32) -> NewUser {
    NewUser {
        email: format!("user{n}@user{n}.user{n}"),
        username: format!("user{n}"),
        password: DEFAULT_PASSWORD.to_owned(),
    }
}

/// Insert an administrator directly into the store (the manager never
/// creates admins itself).
pub async fn seed_admin(store: &MemoryStore) -> User {
    let now = Utc::now();
    let admin = User {
        id: UserId(Uuid::now_v7()),
        email: "admin@admin.admin".into(),
        username: "admin".into(),
        password: DEFAULT_PASSWORD.into(),
        active: true,
        is_admin: true,
        deleted: false,
        purged: false,
        disk_usage: 0,
        tags_used: vec![],
        requests: vec![],
        create_time: now,
        update_time: now,
    };
    store.insert(&admin).await.unwrap();
    admin
}

pub fn context_for(user: &User) -> RequestContext {
    RequestContext::authenticated(user.clone())
}
