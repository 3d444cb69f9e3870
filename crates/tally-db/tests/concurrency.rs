//! Multi-connection behaviour against a file-backed database.
//!
//! In-memory databases are pinned to one connection, so these tests use a
//! temporary file with a real pool to let sales actually race.

use std::time::Duration;

use tally_core::{CartLine, CoreError, Money, NewTransaction, PaymentMethod, Percentage, TransactionStatus};
use tally_db::{Database, DbConfig, EngineError, NewProduct};
use tempfile::TempDir;

async fn file_db(dir: &TempDir) -> Database {
    let config = DbConfig::new(dir.path().join("tally.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(30));
    Database::new(config).await.unwrap()
}

fn one_unit(product_id: &str) -> NewTransaction {
    NewTransaction {
        customer_name: None,
        items: vec![CartLine {
            product_id: product_id.to_string(),
            quantity: 1,
        }],
        discount_percentage: Percentage::zero(),
        payment_method: PaymentMethod::Cash,
        payment_amount: Money::from_cents(1000),
        notes: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let dir = TempDir::new().unwrap();
    let db = file_db(&dir).await;
    let product = db
        .products()
        .insert(NewProduct::new("LAST", "Last Units", Money::from_cents(1000), 5))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..12 {
        let engine = db.engine();
        let id = product.id.clone();
        handles.push(tokio::spawn(async move {
            engine
                .create_transaction(&one_unit(&id), &format!("cashier-{}", i))
                .await
        }));
    }

    let mut sold = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(EngineError::Core(CoreError::InsufficientStock { available, .. })) => {
                assert_eq!(available, 0);
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(sold, 5);
    assert_eq!(rejected, 7);

    let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(after.stock_quantity, 0);

    let summary = db.reports().today_sales_summary().await.unwrap();
    assert_eq!(summary.total_transactions, 5);
    assert_eq!(summary.total_sales, Money::from_cents(5000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancels_restore_stock_once() {
    let dir = TempDir::new().unwrap();
    let db = file_db(&dir).await;
    let product = db
        .products()
        .insert(NewProduct::new("ONE", "One", Money::from_cents(1000), 10))
        .await
        .unwrap();

    let mut request = one_unit(&product.id);
    request.items[0].quantity = 4;
    let sale = db.engine().create_transaction(&request, "cashier").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let engine = db.engine();
        let id = sale.transaction.id.clone();
        handles.push(tokio::spawn(async move {
            engine
                .update_transaction_status(&id, TransactionStatus::Cancelled)
                .await
        }));
    }
    for handle in handles {
        let detail = handle.await.unwrap().unwrap();
        assert_eq!(detail.transaction.status, TransactionStatus::Cancelled);
    }

    let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(after.stock_quantity, 10);
}
