// ABOUTME: Integration tests for client-facing model projections and enum parsing
// ABOUTME: Confirms secret-bearing fields never reach the serialized client-facing shapes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use altus4_server::models::{
    ApiKey, ApiKeyEnvironment, ApiKeyTier, ConnectionStatus, DbConnection, Permission, User,
    UserRole,
};
use chrono::Utc;
use uuid::Uuid;

fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "ada@example.com".to_owned(),
        name: "Ada".to_owned(),
        password_hash: "bcrypt$very-secret-hash".to_owned(),
        role: UserRole::User,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_api_key(permissions: Vec<Permission>) -> ApiKey {
    ApiKey {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        key_prefix: "altus4_sk_test_AbCd1234".to_owned(),
        key_hash: "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef".to_owned(),
        name: "ci key".to_owned(),
        environment: ApiKeyEnvironment::Test,
        permissions,
        rate_limit_tier: ApiKeyTier::Free,
        expires_at: None,
        is_active: true,
        usage_count: 0,
        last_used: None,
        created_at: Utc::now(),
    }
}

fn sample_connection() -> DbConnection {
    DbConnection {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "primary".to_owned(),
        host: "tenant.example.com".to_owned(),
        port: 3306,
        database: "shop".to_owned(),
        username: "app".to_owned(),
        password_encrypted: "super-secret-ciphertext".to_owned(),
        ssl_enabled: true,
        is_active: true,
        connection_status: ConnectionStatus::Unknown,
        last_tested: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn user_response_has_no_password_field_on_the_wire() {
    let user = sample_user();
    let value = serde_json::to_value(user.into_response()).expect("serialize");
    assert!(!value.as_object().unwrap().contains_key("password_hash"));
}

#[test]
fn api_key_response_has_no_hash_or_owner_field_on_the_wire() {
    let key = sample_api_key(vec![Permission::Search]);
    let value = serde_json::to_value(key.into_response()).expect("serialize");
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("key_hash"));
    assert!(!obj.contains_key("user_id"));
    assert!(obj.contains_key("key_prefix"));
}

#[test]
fn db_connection_response_has_no_password_field_on_the_wire() {
    let conn = sample_connection();
    let value = serde_json::to_value(conn.into_response()).expect("serialize");
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("password_encrypted"));
}

#[test]
fn admin_permission_implies_every_scope() {
    let key = sample_api_key(vec![Permission::Admin]);
    assert!(key.has_permission(Permission::Search));
    assert!(key.has_permission(Permission::Analytics));
    assert!(key.has_permission(Permission::Admin));
}

#[test]
fn scoped_key_only_has_its_own_permission() {
    let key = sample_api_key(vec![Permission::Search]);
    assert!(key.has_permission(Permission::Search));
    assert!(!key.has_permission(Permission::Analytics));
}

#[test]
fn key_with_past_expiry_is_expired() {
    let mut key = sample_api_key(vec![Permission::Search]);
    key.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
    assert!(key.is_expired());
}

#[test]
fn key_with_no_expiry_never_expires() {
    let key = sample_api_key(vec![Permission::Search]);
    assert!(!key.is_expired());
}

#[test]
fn role_parsing_defaults_to_least_privileged() {
    assert_eq!(UserRole::from_str_or_default("admin"), UserRole::Admin);
    assert_eq!(UserRole::from_str_or_default("ADMIN"), UserRole::Admin);
    assert_eq!(UserRole::from_str_or_default("whatever"), UserRole::User);
}

#[test]
fn tier_parsing_defaults_to_free() {
    assert_eq!(ApiKeyTier::from_str_or_default("pro"), ApiKeyTier::Pro);
    assert_eq!(ApiKeyTier::from_str_or_default("enterprise"), ApiKeyTier::Enterprise);
    assert_eq!(ApiKeyTier::from_str_or_default("bogus"), ApiKeyTier::Free);
}

#[test]
fn environment_parsing_defaults_to_test() {
    assert_eq!(ApiKeyEnvironment::from_str_or_default("live"), ApiKeyEnvironment::Live);
    assert_eq!(ApiKeyEnvironment::from_str_or_default("LIVE"), ApiKeyEnvironment::Live);
    assert_eq!(ApiKeyEnvironment::from_str_or_default("nope"), ApiKeyEnvironment::Test);
}

#[test]
fn connection_status_parsing_defaults_to_unknown() {
    assert_eq!(ConnectionStatus::from_str_or_default("connected"), ConnectionStatus::Connected);
    assert_eq!(ConnectionStatus::from_str_or_default("failed"), ConnectionStatus::Failed);
    assert_eq!(ConnectionStatus::from_str_or_default("???"), ConnectionStatus::Unknown);
}
