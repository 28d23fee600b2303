use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_food_delivery_api::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "Admin", "ADMIN").await?;
    let customer_id =
        ensure_user(&pool, "customer@example.com", "customer123", "Customer", "CUSTOMER").await?;
    let owner_id = ensure_user(&pool, "owner@example.com", "owner123", "Owner", "RESTAURANT").await?;
    let courier_id =
        ensure_user(&pool, "courier@example.com", "courier123", "Courier", "DELIVERY").await?;

    let restaurant_id = seed_restaurant(&pool, owner_id).await?;
    seed_menu(&pool, restaurant_id).await?;

    println!(
        "Seed completed. Admin: {admin_id}, Customer: {customer_id}, Owner: {owner_id}, Courier: {courier_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> anyhow::Result<i64> {
    if let Some((id,)) = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
    {
        return Ok(id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, password_hash, name, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn seed_restaurant(pool: &sqlx::PgPool, owner_id: i64) -> anyhow::Result<i64> {
    if let Some((id,)) =
        sqlx::query_as::<_, (i64,)>("SELECT id FROM restaurants WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_optional(pool)
            .await?
    {
        return Ok(id);
    }

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO restaurants (name, address, cuisine_type, description, approved, owner_id)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        RETURNING id
        "#,
    )
    .bind("Demo Diner")
    .bind("1 Demo Street")
    .bind("American")
    .bind("Seeded demo restaurant")
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn seed_menu(pool: &sqlx::PgPool, restaurant_id: i64) -> anyhow::Result<()> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM menu_items WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .fetch_one(pool)
            .await?;
    if count > 0 {
        return Ok(());
    }

    for (name, price, category) in [
        ("Classic Burger", "9.50", "Mains"),
        ("Caesar Salad", "7.00", "Salads"),
        ("Fries", "3.50", "Sides"),
    ] {
        sqlx::query(
            "INSERT INTO menu_items (name, price, restaurant_id, category) VALUES ($1, $2::numeric, $3, $4)",
        )
        .bind(name)
        .bind(price)
        .bind(restaurant_id)
        .bind(category)
        .execute(pool)
        .await?;
    }

    Ok(())
}
