//! View-based serialization of users into JSON-safe projections.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value, json};

use workbench_core::bytes::nice_size;
use workbench_core::serde::format_rfc3339_ms;

use crate::context::RequestContext;
use crate::domain::types::User;
use crate::error::UsersServiceError;

/// A registered per-key computation. Each key is independent and must
/// produce a JSON-safe value.
type KeyFn = fn(&RequestContext, &User) -> Value;

const SUMMARY_VIEW: &[&str] = &["id", "email", "username"];
const DETAILED_VIEW: &[&str] = &[
    "id",
    "email",
    "username",
    "update_time",
    "create_time",
    "is_admin",
    "active",
    "deleted",
    "purged",
    "total_disk_usage",
    "nice_total_disk_usage",
    "quota_percent",
    "tags_used",
    "requests",
];

/// Keys computable for an anonymous actor: usage and quota come from the
/// context's active session; everything identity-derived is unavailable.
const ANONYMOUS_KEYS: &[&str] = &[
    "id",
    "total_disk_usage",
    "nice_total_disk_usage",
    "quota_percent",
];

// ── UserSerializer ───────────────────────────────────────────────────────────

/// Projects a user into a flat mapping of independently-computed keys,
/// selected by named view or explicit key list.
pub struct UserSerializer {
    serializers: BTreeMap<&'static str, KeyFn>,
    views: BTreeMap<&'static str, &'static [&'static str]>,
}

impl UserSerializer {
    pub fn new() -> Self {
        let mut serializers: BTreeMap<&'static str, KeyFn> = BTreeMap::new();
        serializers.insert("id", |_, u| json!(u.id.to_string()));
        serializers.insert("email", |_, u| json!(u.email));
        serializers.insert("username", |_, u| json!(u.username));
        serializers.insert("create_time", |_, u| json!(format_rfc3339_ms(&u.create_time)));
        serializers.insert("update_time", |_, u| json!(format_rfc3339_ms(&u.update_time)));
        serializers.insert("active", |_, u| json!(u.active));
        serializers.insert("is_admin", |_, u| json!(u.is_admin));
        serializers.insert("deleted", |_, u| json!(u.deleted));
        serializers.insert("purged", |_, u| json!(u.purged));
        serializers.insert("total_disk_usage", |_, u| json!(u.disk_usage as f64));
        serializers.insert("nice_total_disk_usage", |_, u| json!(nice_size(u.disk_usage)));
        serializers.insert("quota_percent", |ctx, u| quota_percent(ctx, u.disk_usage));
        serializers.insert("tags_used", |_, u| json!(u.tags_used));
        serializers.insert("requests", |_, u| {
            json!(u.requests.iter().map(|r| r.to_string()).collect::<Vec<_>>())
        });

        let mut views: BTreeMap<&'static str, &'static [&'static str]> = BTreeMap::new();
        views.insert("summary", SUMMARY_VIEW);
        views.insert("detailed", DETAILED_VIEW);

        Self { serializers, views }
    }

    /// The full set of keys this serializer can compute.
    pub fn serializable_keyset(&self) -> BTreeSet<&'static str> {
        self.serializers.keys().copied().collect()
    }

    /// Named views and their ordered key lists.
    pub fn views(&self) -> &BTreeMap<&'static str, &'static [&'static str]> {
        &self.views
    }

    /// Compute each requested key. A key with no registered serializer fails
    /// with [`UsersServiceError::Serialization`] — never silently dropped.
    pub fn serialize(
        &self,
        ctx: &RequestContext,
        user: &User,
        keys: &[&str],
    ) -> Result<Map<String, Value>, UsersServiceError> {
        let mut out = Map::new();
        for &key in keys {
            let key_fn = self
                .serializers
                .get(key)
                .ok_or_else(|| UsersServiceError::Serialization { key: key.to_owned() })?;
            out.insert(key.to_owned(), key_fn(ctx, user));
        }
        Ok(out)
    }

    /// Serialize the union of a named view's keys and explicit `keys`.
    ///
    /// Precedence: `view` if given, else `default_view`, else explicit keys
    /// alone; no view and no keys is a configuration error.
    pub fn serialize_to_view(
        &self,
        ctx: &RequestContext,
        user: &User,
        view: Option<&str>,
        default_view: Option<&str>,
        keys: &[&str],
    ) -> Result<Map<String, Value>, UsersServiceError> {
        let resolved = self.resolve_keys(view, default_view, keys)?;
        self.serialize(ctx, user, &resolved)
    }

    /// Resolve the view/default-view/keys precedence into a duplicate-free,
    /// order-preserving key list.
    fn resolve_keys<'a>(
        &self,
        view: Option<&'a str>,
        default_view: Option<&'a str>,
        keys: &[&'a str],
    ) -> Result<Vec<&'a str>, UsersServiceError> {
        let mut resolved: Vec<&str> = Vec::new();
        match view.or(default_view) {
            Some(name) => {
                let view_keys =
                    self.views
                        .get(name)
                        .ok_or_else(|| UsersServiceError::UnknownView {
                            view: name.to_owned(),
                        })?;
                resolved.extend(view_keys.iter().copied());
            }
            None if keys.is_empty() => return Err(UsersServiceError::NoViewSupplied),
            None => {}
        }
        for &key in keys {
            if !resolved.contains(&key) {
                resolved.push(key);
            }
        }
        Ok(resolved)
    }
}

impl Default for UserSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn quota_percent(ctx: &RequestContext, usage: u64) -> Value {
    match ctx.quota_bytes() {
        Some(quota) if quota > 0 => json!(usage as f64 / quota as f64 * 100.0),
        _ => Value::Null,
    }
}

// ── CurrentUserSerializer ────────────────────────────────────────────────────

/// Serializer for "the current user", which may be anonymous. For an
/// authenticated actor it behaves exactly like [`UserSerializer`]; for an
/// anonymous one it restricts the requested keys to those computable without
/// an identity and reports usage against the context's session.
pub struct CurrentUserSerializer {
    inner: UserSerializer,
}

impl CurrentUserSerializer {
    pub fn new() -> Self {
        Self {
            inner: UserSerializer::new(),
        }
    }

    pub fn views(&self) -> &BTreeMap<&'static str, &'static [&'static str]> {
        self.inner.views()
    }

    pub fn serialize_to_view(
        &self,
        ctx: &RequestContext,
        user: Option<&User>,
        view: Option<&str>,
        default_view: Option<&str>,
        keys: &[&str],
    ) -> Result<Map<String, Value>, UsersServiceError> {
        match user {
            Some(user) => self.inner.serialize_to_view(ctx, user, view, default_view, keys),
            None => self.serialize_anonymous(ctx, view, default_view, keys),
        }
    }

    fn serialize_anonymous(
        &self,
        ctx: &RequestContext,
        view: Option<&str>,
        default_view: Option<&str>,
        keys: &[&str],
    ) -> Result<Map<String, Value>, UsersServiceError> {
        let requested = self.inner.resolve_keys(view, default_view, keys)?;
        let usage = ctx.session_disk_usage();

        let mut out = Map::new();
        for key in requested {
            if !ANONYMOUS_KEYS.contains(&key) {
                continue;
            }
            let value = match key {
                "id" => Value::Null,
                "total_disk_usage" => json!(usage as f64),
                "nice_total_disk_usage" => json!(nice_size(usage)),
                "quota_percent" => quota_percent(ctx, usage),
                _ => unreachable!("anonymous key list is fixed"),
            };
            out.insert(key.to_owned(), value);
        }
        Ok(out)
    }
}

impl Default for CurrentUserSerializer {
    fn default() -> Self {
        Self::new()
    }
}
