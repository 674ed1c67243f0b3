//! Runs the production client against a local axum server standing in for the
//! MealFlow API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use mealflow_core::{
    ApiClient, FetchError, HttpClient, Ingredient, MealflowConfig, OrderLinkAssembler,
    OrderLinkError, StoreResolutionError,
};
use serde_json::{json, Value};

const API_KEY: &str = "test-key";

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn map_ingredients(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let products: Vec<Value> = body["ingredients"]
        .as_array()
        .ok_or(StatusCode::BAD_REQUEST)?
        .iter()
        .enumerate()
        .map(|(i, item)| json!({"id": format!("p{}", i + 1), "name": item["name"]}))
        .collect();

    Ok(Json(json!({
        "products": products,
        "metadata": {"mapping_confidence": "high", "lang": body["language"]}
    })))
}

async fn fallback_app(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    match params.get("country").map(String::as_str) {
        Some("UA") => Ok(Json(json!({
            "stores": [{
                "store_link": "https://store.example/order",
                "platform": params.get("platform")
            }],
            "country": "UA"
        }))),
        _ => Ok(Json(json!({"stores": []}))),
    }
}

fn api_routes() -> Router {
    Router::new()
        .route("/api/v1/map-ingredients", post(map_ingredients))
        .route("/api/v1/fallback-app", get(fallback_app))
}

async fn spawn_server() -> SocketAddr {
    serve(api_routes()).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config(addr: SocketAddr, api_key: &str) -> MealflowConfig {
    let mut config = MealflowConfig::new(api_key);
    config.base_url = format!("http://{}", addr);
    config.timeout = Duration::from_secs(5);
    config
}

#[tokio::test]
async fn generates_link_through_real_http() {
    let addr = spawn_server().await;
    let config = config(addr, API_KEY);
    let client = ApiClient::from_config(&config).unwrap();
    let assembler = OrderLinkAssembler::from_config(client, &config);

    let link = assembler
        .generate_order_link(&[
            Ingredient::new("1", "Milk", 1.0, "l"),
            Ingredient::new("2", "Eggs", 6.0, "pcs"),
        ])
        .await
        .unwrap();

    assert_eq!(
        link.as_str(),
        "https://store.example/order?ids=p1,p2&titles=milk%2Ceggs"
    );
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    // Only reachable under the prefix, as behind a reverse proxy.
    let addr = serve(Router::new().nest("/proxy", api_routes())).await;
    let mut config = config(addr, API_KEY);
    config.base_url = format!("http://{}/proxy", addr);
    let client = ApiClient::from_config(&config).unwrap();
    let assembler = OrderLinkAssembler::from_config(client, &config);

    let link = assembler
        .generate_order_link(&[Ingredient::new("1", "Milk", 1.0, "l")])
        .await
        .unwrap();

    assert_eq!(
        link.as_str(),
        "https://store.example/order?ids=p1&titles=milk"
    );
}

#[tokio::test]
async fn missing_api_key_is_rejected() {
    let addr = spawn_server().await;
    let client = ApiClient::from_config(&config(addr, "wrong-key")).unwrap();

    let err = client
        .get_json("/api/v1/fallback-app?platform=web&country=UA")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 401, .. }));
}

#[tokio::test]
async fn unknown_country_has_no_stores() {
    let addr = spawn_server().await;
    let mut config = config(addr, API_KEY);
    config.country = "PL".to_string();
    let client = ApiClient::from_config(&config).unwrap();
    let assembler = OrderLinkAssembler::from_config(client, &config);

    let err = assembler
        .generate_order_link(&[Ingredient::new("1", "Milk", 1.0, "l")])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderLinkError::StoreResolution(StoreResolutionError::NoStores)
    ));
}

#[tokio::test]
async fn unreachable_server_is_request_error() {
    // Bind and drop to get a port with nothing listening.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::from_config(&config(addr, API_KEY)).unwrap();

    let err = client
        .post_json("/api/v1/map-ingredients", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::RequestFailed(_)));
}
