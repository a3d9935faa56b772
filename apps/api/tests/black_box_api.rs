//! Black-box tests: the same router as production, bound to an
//! ephemeral port over an in-memory database.

use reqwest::StatusCode;
use serde_json::{json, Value};

use motowash_db::{Database, DbConfig};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("failed to open in-memory database");
        let app = motowash_api::build_app(db);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn seed_product(client: &reqwest::Client, base_url: &str, name: &str, stock: i64, price: i64) {
    let res = client
        .post(format!("{}/api/products", base_url))
        .json(&json!({
            "name": name,
            "stock": stock,
            "priceCents": price,
            "costCents": price / 2,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

fn sale_body(lines: Value, payments: Value) -> Value {
    json!({
        "plate": "ABC123",
        "mileage": 12000,
        "discountBps": 0,
        "laborCents": 0,
        "lines": lines,
        "payments": payments,
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn available_products_and_price_lookup() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    seed_product(&client, &srv.base_url, "Chain oil", 3, 1500).await;
    seed_product(&client, &srv.base_url, "Empty shelf", 0, 900).await;

    let res = client
        .get(format!("{}/api/products/available", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Chain oil");
    assert_eq!(items[0]["stock"], 3);
    assert_eq!(items[0]["priceCents"], 1500);

    // Known name → its price; unknown name → 0, not 404.
    let res = client
        .get(format!("{}/api/products/price", srv.base_url))
        .query(&[("name", "Chain oil")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["priceCents"], 1500);

    let res = client
        .get(format!("{}/api/products/price", srv.base_url))
        .query(&[("name", "nothing")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["priceCents"], 0);
}

#[tokio::test]
async fn sale_deducts_stock_and_feeds_the_till() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    seed_product(&client, &srv.base_url, "Wax", 5, 500).await;

    let res = client
        .post(format!("{}/api/till/open", srv.base_url))
        .header("x-operator", "ana")
        .json(&json!({ "openingCashCents": 10000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let till: Value = res.json().await.unwrap();
    let till_id = till["id"].as_str().unwrap().to_string();

    // Split tender: $4.00 cash + $6.00 transfer for 2 × $5.00.
    let res = client
        .post(format!("{}/api/sales", srv.base_url))
        .header("x-operator", "ana")
        .json(&sale_body(
            json!([{ "productName": "wax", "quantity": 2, "unitPriceCents": 500 }]),
            json!([
                { "method": "cash", "amountCents": 400 },
                { "method": "transfer", "amountCents": 600 },
            ]),
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let sale: Value = res.json().await.unwrap();
    assert_eq!(sale["subtotalCents"], 1000);
    assert_eq!(sale["totalCents"], 1000);
    assert_eq!(sale["tillId"].as_str().unwrap(), till_id);

    // Stock went 5 → 3.
    let res = client
        .get(format!("{}/api/products/available", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body[0]["stock"], 3);

    // The ledger carries one movement per payment method.
    let res = client
        .get(format!("{}/api/till/{}/summary", srv.base_url, till_id))
        .send()
        .await
        .unwrap();
    let summary: Value = res.json().await.unwrap();
    assert_eq!(summary["cashSalesCents"], 400);
    assert_eq!(summary["transferSalesCents"], 600);
    assert_eq!(summary["expectedCashCents"], 10400);
    assert_eq!(summary["expectedTransferCents"], 600);
}

#[tokio::test]
async fn insufficient_stock_is_rejected_and_rolled_back() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    seed_product(&client, &srv.base_url, "Wax", 1, 500).await;

    let res = client
        .post(format!("{}/api/sales", srv.base_url))
        .json(&sale_body(
            json!([{ "productName": "Wax", "quantity": 2, "unitPriceCents": 500 }]),
            json!([{ "method": "cash", "amountCents": 1000 }]),
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");

    // Nothing was deducted, nothing was recorded.
    let res = client
        .get(format!("{}/api/products/available", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body[0]["stock"], 1);

    let res = client
        .get(format!("{}/api/sales", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn payment_split_must_match_total() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    seed_product(&client, &srv.base_url, "Wax", 5, 500).await;

    let res = client
        .post(format!("{}/api/sales", srv.base_url))
        .json(&sale_body(
            json!([{ "productName": "Wax", "quantity": 2, "unitPriceCents": 500 }]),
            json!([{ "method": "cash", "amountCents": 700 }]),
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "payment_mismatch");
}

#[tokio::test]
async fn discount_and_labor_change_the_required_payment() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    seed_product(&client, &srv.base_url, "Full wash", 10, 10000).await;

    // $100.00 − 10% + $20.00 labor = $110.00.
    let mut body = sale_body(
        json!([{ "productName": "Full wash", "quantity": 1, "unitPriceCents": 10000 }]),
        json!([{ "method": "cash", "amountCents": 11000 }]),
    );
    body["discountBps"] = json!(1000);
    body["laborCents"] = json!(2000);

    let res = client
        .post(format!("{}/api/sales", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let sale: Value = res.json().await.unwrap();
    assert_eq!(sale["discountCents"], 1000);
    assert_eq!(sale["totalCents"], 11000);
}

#[tokio::test]
async fn second_till_conflicts_and_closed_till_locks_sales() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    seed_product(&client, &srv.base_url, "Wax", 5, 500).await;

    let res = client
        .post(format!("{}/api/till/open", srv.base_url))
        .json(&json!({ "openingCashCents": 0 }))
        .send()
        .await
        .unwrap();
    let till: Value = res.json().await.unwrap();
    let till_id = till["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/till/open", srv.base_url))
        .json(&json!({ "openingCashCents": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(format!("{}/api/sales", srv.base_url))
        .json(&sale_body(
            json!([{ "productName": "Wax", "quantity": 1, "unitPriceCents": 500 }]),
            json!([{ "method": "cash", "amountCents": 500 }]),
        ))
        .send()
        .await
        .unwrap();
    let sale: Value = res.json().await.unwrap();
    let sale_id = sale["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/till/{}/close", srv.base_url, till_id))
        .json(&json!({ "closingCashCents": 500, "closingTransferCents": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The sale now belongs to a reconciled session.
    let res = client
        .delete(format!("{}/api/sales/{}", srv.base_url, sale_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn work_order_deposit_lands_in_the_open_till() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/till/open", srv.base_url))
        .json(&json!({ "openingCashCents": 0 }))
        .send()
        .await
        .unwrap();
    let till: Value = res.json().await.unwrap();
    let till_id = till["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/work-orders", srv.base_url))
        .header("x-operator", "luis")
        .json(&json!({
            "vehicle": "Honda CB190",
            "plate": "XYZ99",
            "mileage": 30000,
            "depositCents": 5000,
            "depositMethod": "transfer",
            "services": [
                { "description": "Oil change", "priceCents": 8000 },
                { "description": "", "priceCents": 0 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: Value = res.json().await.unwrap();
    assert_eq!(order["servicesTotalCents"], 8000);
    assert_eq!(order["balanceDueCents"], 3000);
    assert_eq!(order["services"].as_array().unwrap().len(), 1);

    let res = client
        .get(format!("{}/api/till/{}", srv.base_url, till_id))
        .send()
        .await
        .unwrap();
    let detail: Value = res.json().await.unwrap();
    let movements = detail["movements"].as_array().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0]["kind"], "income");
    assert_eq!(movements[0]["method"], "transfer");
    assert_eq!(movements[0]["recordedBy"], "luis");
    assert_eq!(detail["summary"]["transferDepositsCents"], 5000);
}

#[tokio::test]
async fn invalid_plate_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    seed_product(&client, &srv.base_url, "Wax", 5, 500).await;

    let mut body = sale_body(
        json!([{ "productName": "Wax", "quantity": 1, "unitPriceCents": 500 }]),
        json!([{ "method": "cash", "amountCents": 500 }]),
    );
    body["plate"] = json!("abc-123");

    let res = client
        .post(format!("{}/api/sales", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");
}
