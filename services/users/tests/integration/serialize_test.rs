use serde_json::Value;

use workbench_users::context::RequestContext;
use workbench_users::domain::types::User;
use workbench_users::error::UsersServiceError;
use workbench_users::serialize::{CurrentUserSerializer, UserSerializer};

use crate::helpers::{new_user, test_manager};

async fn created_user() -> (RequestContext, User) {
    let (manager, _store) = test_manager();
    let ctx = RequestContext::anonymous();
    let user = manager.create(&ctx, new_user(2)).await.unwrap();
    (ctx, user)
}

fn assert_keys(map: &serde_json::Map<String, Value>, expected: &[&str]) {
    let mut actual: Vec<&str> = map.keys().map(String::as_str).collect();
    let mut expected: Vec<&str> = expected.to_vec();
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(actual, expected);
}

// ── views ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serialize_the_summary_view() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let summary = serializer
        .serialize_to_view(&ctx, &user, Some("summary"), None, &[])
        .unwrap();
    assert_keys(&summary, serializer.views()["summary"]);
}

#[tokio::test]
async fn should_use_default_view_when_no_view_given() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let defaulted = serializer
        .serialize_to_view(&ctx, &user, None, Some("summary"), &[])
        .unwrap();
    assert_keys(&defaulted, serializer.views()["summary"]);
}

#[tokio::test]
async fn should_union_view_keys_with_explicit_keys() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let serialized = serializer
        .serialize_to_view(&ctx, &user, Some("summary"), None, &["create_time"])
        .unwrap();
    assert_keys(&serialized, &["id", "email", "username", "create_time"]);

    // A key already in the view must not appear twice or change the set.
    let serialized = serializer
        .serialize_to_view(&ctx, &user, Some("summary"), None, &["email"])
        .unwrap();
    assert_keys(&serialized, &["id", "email", "username"]);
}

#[tokio::test]
async fn should_serialize_explicit_keys_on_their_own() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let serialized = serializer
        .serialize_to_view(&ctx, &user, None, None, &["tags_used", "is_admin"])
        .unwrap();
    assert_keys(&serialized, &["tags_used", "is_admin"]);
}

#[tokio::test]
async fn should_have_a_serializer_for_every_serializable_key() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let all_keys: Vec<&str> = serializer.serializable_keyset().into_iter().collect();
    let serialized = serializer.serialize(&ctx, &user, &all_keys).unwrap();
    assert_eq!(serialized.len(), all_keys.len());
}

#[tokio::test]
async fn should_fail_on_unregistered_key() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let err = serializer
        .serialize(&ctx, &user, &["password"])
        .unwrap_err();
    assert!(matches!(err, UsersServiceError::Serialization { .. }));
}

#[tokio::test]
async fn should_fail_without_view_default_view_or_keys() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let err = serializer
        .serialize_to_view(&ctx, &user, None, None, &[])
        .unwrap_err();
    assert!(matches!(err, UsersServiceError::NoViewSupplied));

    let err = serializer
        .serialize_to_view(&ctx, &user, Some("nope"), None, &[])
        .unwrap_err();
    assert!(matches!(err, UsersServiceError::UnknownView { .. }));
}

// ── value types ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serialize_every_key_with_its_contracted_type() {
    let (_, user) = created_user().await;
    let ctx = RequestContext::anonymous().with_quota_bytes(1024 * 1024);
    let serializer = UserSerializer::new();

    let all_keys: Vec<&str> = serializer.serializable_keyset().into_iter().collect();
    let serialized = serializer.serialize(&ctx, &user, &all_keys).unwrap();

    let id = serialized["id"].as_str().unwrap();
    assert!(id.parse::<uuid::Uuid>().is_ok());
    for key in ["create_time", "update_time"] {
        let ts = serialized[key].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "{key}: {ts}");
    }
    for key in ["deleted", "purged", "active", "is_admin"] {
        assert!(serialized[key].is_boolean(), "{key} should be boolean");
    }
    assert!(serialized["total_disk_usage"].is_f64());
    assert!(serialized["nice_total_disk_usage"].is_string());
    assert!(serialized["quota_percent"].is_f64());
    assert!(serialized["tags_used"].is_array());
    assert!(serialized["requests"].is_array());
    assert!(serialized["tags_used"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn should_report_null_quota_percent_without_a_quota() {
    let (ctx, user) = created_user().await;
    let serializer = UserSerializer::new();

    let serialized = serializer.serialize(&ctx, &user, &["quota_percent"]).unwrap();
    assert!(serialized["quota_percent"].is_null());
}

#[tokio::test]
async fn should_round_trip_through_json_text_without_type_loss() {
    let (_, user) = created_user().await;
    let ctx = RequestContext::anonymous().with_quota_bytes(500_000);
    let serializer = UserSerializer::new();

    let all_keys: Vec<&str> = serializer.serializable_keyset().into_iter().collect();
    let serialized = serializer.serialize(&ctx, &user, &all_keys).unwrap();

    let text = serde_json::to_string(&serialized).unwrap();
    let decoded: serde_json::Map<String, Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, serialized);
    assert!(decoded["is_admin"].is_boolean());
    assert!(decoded["total_disk_usage"].is_f64());
    assert!(decoded["tags_used"].is_array());
}

// ── current user / anonymous ─────────────────────────────────────────────────

#[tokio::test]
async fn should_serialize_an_anonymous_actor_with_session_usage() {
    let serializer = CurrentUserSerializer::new();
    let ctx = RequestContext::anonymous()
        .with_session_disk_usage(2048)
        .with_quota_bytes(4096);

    let serialized = serializer
        .serialize_to_view(&ctx, None, Some("detailed"), None, &[])
        .unwrap();
    assert_keys(
        &serialized,
        &["id", "total_disk_usage", "nice_total_disk_usage", "quota_percent"],
    );

    assert!(serialized["id"].is_null());
    assert_eq!(serialized["total_disk_usage"], Value::from(2048.0));
    assert_eq!(serialized["nice_total_disk_usage"], Value::from("2.0 KB"));
    assert_eq!(serialized["quota_percent"], Value::from(50.0));

    let text = serde_json::to_string(&serialized).unwrap();
    let decoded: serde_json::Map<String, Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, serialized);
}

#[tokio::test]
async fn should_report_null_quota_for_anonymous_actor_without_quota() {
    let serializer = CurrentUserSerializer::new();
    let ctx = RequestContext::anonymous();

    let serialized = serializer
        .serialize_to_view(&ctx, None, Some("detailed"), None, &[])
        .unwrap();
    assert_eq!(serialized["total_disk_usage"], Value::from(0.0));
    assert!(serialized["quota_percent"].is_null());
}

#[tokio::test]
async fn should_serialize_an_authenticated_actor_like_the_user_serializer() {
    let (ctx, user) = created_user().await;
    let current = CurrentUserSerializer::new();
    let plain = UserSerializer::new();

    let via_current = current
        .serialize_to_view(&ctx, Some(&user), Some("detailed"), None, &[])
        .unwrap();
    let via_plain = plain
        .serialize_to_view(&ctx, &user, Some("detailed"), None, &[])
        .unwrap();
    assert_eq!(via_current, via_plain);
}
