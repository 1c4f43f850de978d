// Runs against a real Postgres when DATABASE_URL is set; skipped otherwise.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;

use invoice_dashboard::config::AppConfig;
use invoice_dashboard::database::{
    DatabaseManager, InvoiceChanges, InvoiceStatus, InvoiceStore, NewInvoice, PgInvoiceStore,
};

async fn connect() -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping postgres store test");
        return Ok(None);
    };

    let mut config = AppConfig::development().database;
    config.url = Some(url);
    config.max_connections = 2;

    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(pool))
}

async fn insert_customer(pool: &PgPool, name: &str) -> Result<String> {
    let id: String = sqlx::query_scalar("INSERT INTO customers (name, email) VALUES ($1, $2) RETURNING id::text")
        .bind(name)
        .bind(format!("{}@example.com", name))
        .fetch_one(pool)
        .await?;
    Ok(id)
}

#[tokio::test]
async fn postgres_store_runs_invoice_statements() -> Result<()> {
    let Some(pool) = connect().await? else {
        return Ok(());
    };
    let store = PgInvoiceStore::new(pool.clone());
    store.health_check().await?;

    let customer = insert_customer(&pool, "evil-rabbit").await?;
    let other_customer = insert_customer(&pool, "delba-de-oliveira").await?;
    let date = NaiveDate::from_ymd_opt(2024, 3, 14).context("bad date")?;

    let id = store
        .insert(&NewInvoice {
            customer_id: customer.clone(),
            amount_in_cents: 1250,
            status: InvoiceStatus::Pending,
            date,
        })
        .await?;

    let stored = store.find(&id).await?.context("inserted invoice not found")?;
    assert_eq!(stored.id, id);
    assert_eq!(stored.customer_id, customer);
    assert_eq!(stored.amount, 1250);
    assert_eq!(stored.status, InvoiceStatus::Pending);
    assert_eq!(stored.date, date);
    assert!(store.list().await?.iter().any(|invoice| invoice.id == id));

    let changes = InvoiceChanges {
        customer_id: other_customer.clone(),
        amount_in_cents: 9999,
        status: InvoiceStatus::Paid,
    };
    assert_eq!(store.update(&id, &changes).await?, 1);

    let updated = store.find(&id).await?.context("updated invoice not found")?;
    assert_eq!(updated.customer_id, other_customer);
    assert_eq!(updated.amount, 9999);
    assert_eq!(updated.status, InvoiceStatus::Paid);
    assert_eq!(updated.date, date);

    let missing = uuid::Uuid::new_v4().to_string();
    assert_eq!(store.update(&missing, &changes).await?, 0);
    assert!(store.find(&missing).await?.is_none());
    assert!(store.find("not-a-uuid").await?.is_none());
    assert!(store.delete("not-a-uuid").await.is_err());

    let orphan = NewInvoice {
        customer_id: uuid::Uuid::new_v4().to_string(),
        amount_in_cents: 100,
        status: InvoiceStatus::Paid,
        date,
    };
    assert!(store.insert(&orphan).await.is_err(), "customer reference must exist");

    assert_eq!(store.delete(&id).await?, 1);
    assert_eq!(store.delete(&id).await?, 0);
    assert!(store.find(&id).await?.is_none());

    sqlx::query("DELETE FROM customers WHERE id = ANY($1::uuid[])")
        .bind(vec![customer, other_customer])
        .execute(&pool)
        .await?;
    Ok(())
}
