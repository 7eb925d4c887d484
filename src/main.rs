//! Argento Storefront - Multi-merchant storefront backend

use anyhow::Result;
use argento_storefront::config::AppConfig;
use argento_storefront::domain::merchant::{calculate_commission, CommissionLine, CommissionResult, MerchantRegistry, OrderContext};
use argento_storefront::domain::order::{Customer, Order, OrderSource, OrderStatus, PaymentMethod, ShippingAddress};
use argento_storefront::domain::shipment::{canonical_city, ShipmentFormatter};
use argento_storefront::store::{CatalogStore, OrderStore};
use argento_storefront::sync::FacebookSync;
use argento_storefront::StorefrontError;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub orders: Arc<OrderStore>,
    pub merchants: Arc<MerchantRegistry>,
    pub config: Arc<AppConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
    let state = AppState {
        catalog: Arc::new(CatalogStore::new(data_dir.join("catalog_cache.json"))),
        orders: Arc::new(OrderStore::new(data_dir.join("orders.json"))),
        merchants: Arc::new(MerchantRegistry::builtin()),
        config: Arc::new(AppConfig::egypt()),
    };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "argento-storefront"})) }))
        .route("/api/products", get(list_products))
        .route("/api/products/:id", get(get_product))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/status", post(update_order_status))
        .route("/api/commission/preview", post(commission_preview))
        .route("/api/cities-areas", get(cities_areas))
        .route("/api/dashboard-stats", get(dashboard_stats))
        .route("/admin/export-speedaf", get(export_speedaf))
        .route("/admin/update-catalog", post(update_catalog))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "10000".to_string());
    tracing::info!("argento-storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

fn app_error(e: StorefrontError) -> (StatusCode, String) {
    let status = match &e {
        StorefrontError::Validation(_) => StatusCode::BAD_REQUEST,
        StorefrontError::ProductNotFound(_) | StorefrontError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

// ========== Catalog ==========

#[derive(Debug, Serialize)]
pub struct ProductListResponse { pub success: bool, pub products: Vec<argento_storefront::domain::product::Product>, pub count: usize, pub last_updated: Option<chrono::DateTime<Utc>> }

async fn list_products(State(s): State<AppState>) -> Result<Json<ProductListResponse>, (StatusCode, String)> {
    let doc = s.catalog.load().map_err(app_error)?;
    Ok(Json(ProductListResponse { count: doc.products.len(), last_updated: doc.metadata.last_updated, products: doc.products, success: true }))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let product = s.catalog.find_by_id_or_slug(&id).map_err(app_error)?;
    Ok(Json(serde_json::json!({"success": true, "product": product})))
}

// ========== Orders ==========

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "customer phone is required"))]
    pub customer_phone: String,
    pub customer_whatsapp: Option<String>,
    pub customer_email: Option<String>,
    pub customer_notes: Option<String>,
    #[validate(length(min = 1, message = "shipping address is required"))]
    pub shipping_address: String,
    #[validate(length(min = 1, message = "shipping city is required"))]
    pub shipping_city: String,
    pub shipping_area: Option<String>,
    pub shipping_building: Option<String>,
    pub shipping_floor: Option<String>,
    pub shipping_apartment: Option<String>,
    pub shipping_landmark: Option<String>,
    #[validate(length(min = 1, message = "order needs at least one item"))]
    pub items: Vec<OrderItemRequest>,
    pub payment_method: Option<PaymentMethod>,
    pub source: Option<OrderSource>,
    /// Carrier region for the shipping rate; derived from the city when absent.
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OrderItemRequest { pub product_id: String, pub quantity: u32, pub commission_value: Option<Decimal> }

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse { pub success: bool, pub order_id: String, pub valid: bool, pub total: Decimal, pub free_shipping: bool, pub message: String }

async fn create_order(State(s): State<AppState>, Json(req): Json<CreateOrderRequest>) -> Result<Json<CreateOrderResponse>, (StatusCode, String)> {
    req.validate().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let customer = Customer { name: req.customer_name, phone: req.customer_phone, whatsapp: req.customer_whatsapp, email: req.customer_email, notes: req.customer_notes };
    let shipping = ShippingAddress { address: req.shipping_address, city: req.shipping_city, area: req.shipping_area, building: req.shipping_building, floor: req.shipping_floor, apartment: req.shipping_apartment, landmark: req.shipping_landmark, notes: None };
    let mut order = Order::create(customer, shipping);
    if let Some(method) = req.payment_method { order.payment_method = method; }
    if let Some(source) = req.source { order.source = source; }

    for item in &req.items {
        let product = s.catalog.find_by_id_or_slug(&item.product_id).map_err(app_error)?;
        let merchant = s.merchants.lookup(&product.merchant_id);
        order.add_line(&product, item.quantity, merchant, item.commission_value).map_err(app_error)?;
    }

    let region = match &req.region {
        Some(r) => r.clone(),
        None => canonical_city(&s.config.carrier, &order.shipping.city).value,
    };
    order.set_shipping_cost(&region, &s.config.shipping, &s.config.free_shipping);

    // invalid orders are reported back, never persisted
    if order.valid {
        s.orders.append(&order).map_err(app_error)?;
        tracing::info!(order_id = %order.order_id, total = %order.total, "order received");
    } else {
        tracing::warn!(order_id = %order.order_id, "rejected invalid order submission");
    }

    Ok(Json(CreateOrderResponse {
        success: order.valid,
        order_id: order.order_id.clone(),
        valid: order.valid,
        total: order.total,
        free_shipping: order.free_shipping,
        message: if order.valid { "تم استلام طلبك بنجاح".to_string() } else { "بيانات الطلب غير مكتملة".to_string() },
    }))
}

async fn list_orders(State(s): State<AppState>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let orders = s.orders.load().map_err(app_error)?;
    Ok(Json(serde_json::json!({"success": true, "count": orders.len(), "orders": orders})))
}

async fn get_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let order = s.orders.find(&id).map_err(app_error)?;
    Ok(Json(serde_json::json!({"success": true, "order": order})))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest { pub status: OrderStatus, pub note: Option<String> }

async fn update_order_status(State(s): State<AppState>, Path(id): Path<String>, Json(req): Json<UpdateStatusRequest>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let order = s.orders.update_status(&id, req.status, req.note).map_err(app_error)?;
    Ok(Json(serde_json::json!({"success": true, "order_id": order.order_id, "status": order.status})))
}

// ========== Commission preview ==========

#[derive(Debug, Deserialize)]
pub struct CommissionPreviewRequest { pub product_id: String, pub quantity: u32, pub commission_value: Option<Decimal>, pub shipping_cost: Option<Decimal>, pub offer_total: Option<Decimal> }

#[derive(Debug, Serialize)]
pub struct CommissionPreviewResponse { pub success: bool, pub product_id: String, pub merchant_id: String, pub merchant_name: String, pub quantity: u32, pub line_total: Decimal, pub manual_entry_expected: bool, pub commission: CommissionResult }

async fn commission_preview(State(s): State<AppState>, Json(req): Json<CommissionPreviewRequest>) -> Result<Json<CommissionPreviewResponse>, (StatusCode, String)> {
    if req.quantity == 0 { return Err((StatusCode::BAD_REQUEST, "quantity must be at least 1".to_string())); }
    let product = s.catalog.find_by_id_or_slug(&req.product_id).map_err(app_error)?;
    let merchant = s.merchants.lookup(&product.merchant_id);
    let line = CommissionLine { unit_price: product.price, quantity: req.quantity, manual_value: req.commission_value };
    let ctx = OrderContext { shipping_cost: req.shipping_cost.unwrap_or(Decimal::ZERO), merchant_offer_total: req.offer_total };
    let commission = calculate_commission(merchant, &line, Some(&ctx));
    Ok(Json(CommissionPreviewResponse {
        success: true,
        product_id: product.id,
        merchant_id: merchant.id.clone(),
        merchant_name: merchant.name.clone(),
        quantity: req.quantity,
        line_total: product.price * Decimal::from(req.quantity),
        manual_entry_expected: merchant.scheme.needs_manual_entry(),
        commission,
    }))
}

// ========== Reference data & stats ==========

async fn cities_areas(State(s): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"success": true, "cities": s.config.carrier.cities(), "areas": s.config.carrier.areas()}))
}

async fn dashboard_stats(State(s): State<AppState>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let orders = s.orders.load().map_err(app_error)?;
    let catalog = s.catalog.load().map_err(app_error)?;
    let count_by = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
    let pending = count_by(OrderStatus::Pending);
    let confirmed = count_by(OrderStatus::Confirmed);
    let processing = count_by(OrderStatus::Processing);
    Ok(Json(serde_json::json!({
        "success": true,
        "total_orders": orders.len(),
        "pending_orders": pending,
        "confirmed_orders": confirmed,
        "exportable_orders": pending + confirmed + processing,
        "total_products": catalog.metadata.total_products,
        "catalog_updated": catalog.metadata.last_updated,
    })))
}

// ========== Carrier export & catalog sync ==========

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Comma-separated status filter; defaults to pending,confirmed,processing.
    pub status: Option<String>,
}

async fn export_speedaf(State(s): State<AppState>, Query(params): Query<ExportParams>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let orders = match &params.status {
        None => s.orders.exportable().map_err(app_error)?,
        Some(raw) => {
            let statuses: Vec<OrderStatus> = raw
                .split(',')
                .filter_map(|t| serde_json::from_value(serde_json::Value::String(t.trim().to_string())).ok())
                .collect();
            if statuses.is_empty() {
                return Err((StatusCode::BAD_REQUEST, format!("unknown status filter: {raw}")));
            }
            s.orders.load().map_err(app_error)?.into_iter().filter(|o| statuses.contains(&o.status)).collect()
        }
    };
    let formatter = ShipmentFormatter::new(&s.config.carrier);
    let batch = formatter.generate_csv_content(&orders, &s.merchants);
    Ok(Json(serde_json::json!({
        "success": true,
        "csv_content": batch.content,
        "row_count": batch.row_count,
        "skipped": batch.skipped,
        "filename": format!("speedaf_export_{}.csv", Utc::now().format("%Y%m%d_%H%M")),
    })))
}

async fn update_catalog(State(s): State<AppState>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let Some(sync) = FacebookSync::from_env(&s.merchants) else {
        return Err((StatusCode::SERVICE_UNAVAILABLE, "facebook sync is not configured".to_string()));
    };
    let (report, products) = sync.sync_all(&s.merchants).await;
    if report.success {
        s.catalog.save(products).map_err(app_error)?;
    }
    Ok(Json(serde_json::json!({
        "success": report.success,
        "products_count": report.total_products,
        "catalogs": report.catalogs,
        "errors": report.errors,
        "updated_at": report.completed_at,
    })))
}
