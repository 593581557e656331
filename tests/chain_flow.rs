use chaintrack_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        blockchain::VerifyRequest,
        inventory::{AdjustInventoryRequest, UpsertInventoryRequest},
        products::CreateProductRequest,
        suppliers::{CreateSupplierRequest, VerifySupplierRequest},
        tracking::{CreateTrackingEventRequest, ScanRequest},
    },
    error::AppError,
    events::EventHub,
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::Role,
    routes::params::{InventoryQuery, Pagination},
    services::{
        blockchain_service, inventory_service, product_service, supplier_service, tracking_service,
    },
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

// Integration flow: admin registers a supplier and a product, tracking events
// and a public QR scan accumulate, the mock ledger verifies the product, and
// inventory adjustments stay row-consistent.
#[tokio::test]
async fn supply_chain_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        email: "admin@example.com".into(),
        role: Role::Admin,
        supplier_id: None,
    };

    // Supplier starts unverified with baseline metrics
    let supplier = supplier_service::create_supplier(
        &state,
        &admin,
        CreateSupplierRequest {
            name: "Test Farms".into(),
            location: "Fresno, CA".into(),
            contact_email: "contact@test-farms.example".into(),
            contact_phone: None,
            blockchain_address: None,
            sustainability_score: 8.0,
            certification_level: "Silver".into(),
            specialties: vec!["Food".into()],
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!supplier.verified);
    assert_eq!(supplier.performance_rating, 5.0);

    let verified = supplier_service::verify_supplier(
        &state,
        &admin,
        supplier.id,
        VerifySupplierRequest {
            verified: Some(true),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(verified.verified);

    let product = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Heirloom Apples".into(),
            category: "Food".into(),
            sku: "TF-APL-001".into(),
            description: Some("Mixed heirloom apples, 2 lb bag".into()),
            price: 5.99,
            weight: Some(0.9),
            dimensions: None,
            sustainability_score: 8.5,
            carbon_footprint: 0.3,
            supplier_id: Some(supplier.id),
        },
    )
    .await?
    .data
    .unwrap();

    // Duplicate SKU is a conflict
    let duplicate = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Another Product".into(),
            category: "Food".into(),
            sku: "TF-APL-001".into(),
            description: None,
            price: 1.0,
            weight: None,
            dimensions: None,
            sustainability_score: 5.0,
            carbon_footprint: 1.0,
            supplier_id: Some(supplier.id),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let event = tracking_service::create_event(
        &state,
        &admin,
        CreateTrackingEventRequest {
            product_id: product.id,
            location: "Packing facility, Fresno".into(),
            status: "created".into(),
            description: "Batch packed".into(),
            coordinates: None,
            temperature: Some(4.5),
            humidity: Some(60.0),
            blockchain_tx_hash: None,
            metadata: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(event.status, "created");
    assert_eq!(event.scanned_by, Some(admin.user_id));

    // Anonymous QR scan: writes a scan log, an in_store event, and a
    // confirmed ledger record
    let scan = tracking_service::scan(
        &state,
        &OptionalAuthUser::default(),
        Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Mobile/15E148".into()),
        ScanRequest {
            product_id: product.id,
            scan_location: "Store #4512 - Dallas, TX".into(),
            coordinates: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(scan.product.sku, "TF-APL-001");
    assert_eq!(scan.product.supplier_name, "Test Farms");
    let latest = scan.latest_tracking.expect("latest tracking event");
    assert_eq!(latest.status, "in_store");

    let stats = tracking_service::scan_stats(&state, Some("7d".into()))
        .await?
        .data
        .unwrap();
    assert_eq!(stats.total_scans, 1);
    assert_eq!(stats.successful_scans, 1);
    assert_eq!(stats.success_rate, 100.0);
    assert_eq!(stats.device_breakdown.mobile, 1);

    let journey = product_service::get_journey(&state, product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(journey.journey.len(), 2);
    assert_eq!(journey.journey[0].event.status, "created");
    assert_eq!(journey.journey[1].event.status, "in_store");

    // The scan recorded a confirmed transaction and the supplier is verified
    let verification = blockchain_service::verify(
        &state,
        VerifyRequest {
            product_id: Some(product.id),
            transaction_hash: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(verification.verified);
    assert_eq!(verification.verification_details.authenticity_score, 100);
    assert!(verification.transaction.block_number.is_some());

    // Inventory: upsert, locked delta adjustment, low-stock listing
    let record = inventory_service::upsert_inventory(
        &state,
        &admin,
        UpsertInventoryRequest {
            product_id: product.id,
            store_location: "Store #4512 - Dallas, TX".into(),
            quantity: 5,
            reserved_quantity: None,
            reorder_point: Some(10),
            max_stock: Some(50),
            batch_number: Some("B-2024-07".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(record.quantity, 5);

    let adjusted = inventory_service::adjust_inventory(
        &state,
        &admin,
        record.id,
        AdjustInventoryRequest { delta: -2 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(adjusted.quantity, 3);

    let low = inventory_service::list_low_stock(
        &state,
        &admin,
        InventoryQuery {
            pagination: Pagination {
                page: Some(1),
                per_page: Some(20),
            },
            product_id: None,
            store_location: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(
        low.records.iter().any(|r| r.id == record.id),
        "expected record at or below its reorder point in the low-stock list"
    );

    // Stock cannot go negative
    let overdraw = inventory_service::adjust_inventory(
        &state,
        &admin,
        record.id,
        AdjustInventoryRequest { delta: -10 },
    )
    .await;
    assert!(matches!(overdraw, Err(AppError::BadRequest(_))));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE audit_logs, inventory, qr_scan_logs, blockchain_transactions, tracking_events, products, suppliers, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        events: EventHub::default(),
    })
}
