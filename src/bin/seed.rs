use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chaintrack_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

// Minimal fixture: one admin, one supplier with a linked account, one product
// with a stock record. Everything else comes in through the API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let supplier_id = ensure_supplier(&pool).await?;
    let admin_id = ensure_user(&pool, "admin@chaintrack.dev", "Admin1234", "admin", None).await?;
    ensure_user(
        &pool,
        "supplier@chaintrack.dev",
        "Supplier1234",
        "supplier",
        Some(supplier_id),
    )
    .await?;
    let product_id = ensure_product(&pool, supplier_id).await?;
    ensure_inventory(&pool, product_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Supplier ID: {supplier_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
    supplier_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role, supplier_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(email.split('@').next().unwrap_or("user"))
    .bind(role)
    .bind(supplier_id)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_supplier(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let email = "contact@greenleaf-farms.example";
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO suppliers
            (id, name, location, contact_email, sustainability_score, verified,
             certification_level, specialties)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (contact_email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("GreenLeaf Farms")
    .bind("Salinas, CA")
    .bind(email)
    .bind(8.7_f64)
    .bind(true)
    .bind("Gold")
    .bind(serde_json::json!(["Food", "Organic Produce"]))
    .fetch_optional(pool)
    .await?;

    let supplier_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) =
                sqlx::query_as("SELECT id FROM suppliers WHERE contact_email = $1")
                    .bind(email)
                    .fetch_one(pool)
                    .await?;
            existing.0
        }
    };

    println!("Ensured supplier GreenLeaf Farms");
    Ok(supplier_id)
}

async fn ensure_product(pool: &sqlx::PgPool, supplier_id: Uuid) -> anyhow::Result<Uuid> {
    let sku = "GLF-TOM-001";
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO products
            (id, name, category, supplier_id, sku, description, price,
             sustainability_score, carbon_footprint)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (sku) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Organic Roma Tomatoes")
    .bind("Food")
    .bind(supplier_id)
    .bind(sku)
    .bind("Vine-ripened organic tomatoes, 1 lb pack")
    .bind(3.49_f64)
    .bind(9.1_f64)
    .bind(0.4_f64)
    .fetch_optional(pool)
    .await?;

    let product_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM products WHERE sku = $1")
                .bind(sku)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured product {sku}");
    Ok(product_id)
}

async fn ensure_inventory(pool: &sqlx::PgPool, product_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory (id, product_id, store_location, quantity, reorder_point, max_stock)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (product_id, store_location) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind("Store #4512 - Dallas, TX")
    .bind(120)
    .bind(25)
    .bind(200)
    .execute(pool)
    .await?;

    println!("Seeded inventory");
    Ok(())
}
