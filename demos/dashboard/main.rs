//! Dashboard demo: in-memory store, one signed-in demo user
//!
//! ```sh
//! cargo run --example dashboard -- demos/dashboard/dashboard.yaml
//! ```

use chrono::{Duration, Utc};
use dashboard::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn placeholder_customers() -> Vec<Customer> {
    [
        ("c-delba", "Delba de Oliveira", "delba@oliveira.com"),
        ("c-lee", "Lee Robinson", "lee@robinson.com"),
        ("c-hector", "Hector Simpson", "hector@simpson.com"),
    ]
    .into_iter()
    .map(|(id, name, email)| Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        image_url: None,
    })
    .collect()
}

async fn seed(store: &dyn InvoiceStore, customers: &[Customer]) -> DashboardResult<()> {
    let today = Utc::now().date_naive();
    let amounts = [15795, 20348, 3040, 44800, 34577, 54246];

    for (i, amount) in amounts.into_iter().enumerate() {
        let customer = &customers[i % customers.len()];
        let status = if i % 2 == 0 {
            InvoiceStatus::Pending
        } else {
            InvoiceStatus::Paid
        };
        store
            .insert(Invoice {
                id: Uuid::new_v4().to_string(),
                customer_id: customer.id.clone(),
                amount: Cents::new(amount),
                status,
                date: today - Duration::days(i as i64 * 7),
            })
            .await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dashboard=debug,tower_http=debug")),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => DashboardConfig::from_yaml_file(path)?,
        None => DashboardConfig::default(),
    };
    if config.customers.is_empty() {
        config.customers = placeholder_customers();
    }

    let store: Arc<dyn InvoiceStore> = open_store(&config).await?;
    seed(store.as_ref(), &config.customers).await?;

    let sessions = InMemorySessionProvider::new().with_cookie_name(&config.session.cookie_name);
    let token = sessions.issue("demo-user")?;

    let bind = config.server.bind;
    tracing::info!(cookie = %sessions.cookie_name(), %token, "demo session issued");
    println!("Try:");
    println!(
        "  curl -i -H 'Authorization: Bearer {}' http://{}{}",
        token, bind, config.routes.invoices_route
    );
    println!(
        "  curl -i -H 'Authorization: Bearer {}' -d 'customerId=c-lee&amount=19.99&status=pending' http://{}{}",
        token, bind, config.routes.invoices_route
    );

    DashboardBuilder::new()
        .with_config(config)
        .with_shared_store(store)
        .with_session_provider(sessions)
        .serve()
        .await
}

#[cfg(feature = "postgres")]
async fn open_store(config: &DashboardConfig) -> Result<Arc<dyn InvoiceStore>> {
    match &config.database {
        Some(db) => {
            let store = PostgresInvoiceStore::connect(db).await?;
            for customer in &config.customers {
                store.upsert_customer(customer).await?;
            }
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(
            InMemoryInvoiceStore::new().with_customers(config.customers.iter().cloned()),
        )),
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &DashboardConfig) -> Result<Arc<dyn InvoiceStore>> {
    if config.database.is_some() {
        tracing::warn!("database configured but the postgres feature is off, using memory");
    }
    Ok(Arc::new(
        InMemoryInvoiceStore::new().with_customers(config.customers.iter().cloned()),
    ))
}
