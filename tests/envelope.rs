use chaintrack_api::{
    dto::suppliers::UpdateSupplierRequest,
    middleware::auth::{AuthUser, ensure_admin, ensure_roles},
    models::{Role, device_type_from_user_agent, mock_transaction_hash},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::auth_service::validate_password,
};
use uuid::Uuid;

#[test]
fn envelope_omits_absent_fields() {
    let ok = ApiResponse::success("Created", serde_json::json!({ "id": 1 }), None);
    let value = serde_json::to_value(&ok).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["message"], "Created");
    assert!(value.get("error").is_none());
    assert!(value.get("meta").is_none());
    assert!(value.get("timestamp").is_some());

    let err = ApiResponse::<serde_json::Value>::error("boom");
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "boom");
    assert!(value.get("data").is_none());
    assert!(value.get("message").is_none());
}

#[test]
fn meta_rounds_total_pages_up() {
    assert_eq!(Meta::new(2, 20, 41).total_pages, 3);
    assert_eq!(Meta::new(1, 20, 40).total_pages, 2);
    assert_eq!(Meta::new(1, 20, 0).total_pages, 0);
}

#[test]
fn pagination_normalizes_out_of_range_values() {
    let clamped = Pagination {
        page: Some(0),
        per_page: Some(1000),
    }
    .normalize();
    assert_eq!(clamped, (1, 100, 0));

    let defaults = Pagination {
        page: None,
        per_page: None,
    }
    .normalize();
    assert_eq!(defaults, (1, 20, 0));

    let offset = Pagination {
        page: Some(3),
        per_page: Some(10),
    }
    .normalize();
    assert_eq!(offset, (3, 10, 20));
}

#[test]
fn role_checks_reject_outsiders() {
    let staff = AuthUser {
        user_id: Uuid::new_v4(),
        email: "staff@example.com".into(),
        role: Role::Staff,
        supplier_id: None,
    };
    assert!(ensure_roles(&staff, &[Role::Admin, Role::Staff]).is_ok());
    assert!(ensure_admin(&staff).is_err());

    let customer = AuthUser {
        user_id: Uuid::new_v4(),
        email: "customer@example.com".into(),
        role: Role::Customer,
        supplier_id: None,
    };
    assert!(ensure_roles(&customer, &[Role::Admin, Role::Staff, Role::Supplier]).is_err());
}

#[test]
fn mock_hash_is_prefixed_64_hex() {
    let hash = mock_transaction_hash();
    assert!(hash.starts_with("0x"));
    assert_eq!(hash.len(), 66);
    assert!(hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn device_type_classification() {
    assert_eq!(
        device_type_from_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Mobile/15E148"),
        "mobile"
    );
    assert_eq!(
        device_type_from_user_agent("Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X)"),
        "tablet"
    );
    assert_eq!(
        device_type_from_user_agent("Mozilla/5.0 (X11; Linux x86_64)"),
        "desktop"
    );
}

#[test]
fn password_policy_requires_mixed_case_and_digit() {
    assert!(validate_password("Abcdef12").is_ok());
    assert!(validate_password("Ab1").is_err());
    assert!(validate_password("alllowercase1").is_err());
    assert!(validate_password("ALLUPPERCASE1").is_err());
    assert!(validate_password("NoDigitsHere").is_err());
}

#[test]
fn supplier_self_update_restrictions() {
    let payload = UpdateSupplierRequest {
        name: Some("New Name".into()),
        location: None,
        contact_phone: Some("+1-555-0100".into()),
        blockchain_address: None,
        sustainability_score: Some(9.0),
        performance_rating: None,
        on_time_delivery: None,
        quality_score: None,
        cost_efficiency: None,
        certification_level: None,
        specialties: Some(vec!["Electronics".into()]),
    };
    assert_eq!(payload.restricted_fields(), vec!["name", "sustainability_score"]);

    let allowed = UpdateSupplierRequest {
        name: None,
        location: None,
        contact_phone: Some("+1-555-0100".into()),
        blockchain_address: None,
        sustainability_score: None,
        performance_rating: None,
        on_time_delivery: None,
        quality_score: None,
        cost_efficiency: None,
        certification_level: None,
        specialties: Some(vec![]),
    };
    assert!(allowed.restricted_fields().is_empty());
}
