use std::collections::BTreeMap;

use axum::{extract::Extension, response::Json as RespJson, routing::get, Router};
use serde::Serialize;

use super::now;
use crate::model::dress::Dress;
use crate::model::product::Product;
use crate::model::user::User;
use crate::state::AppState;

#[derive(Debug, Serialize, PartialEq)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ProductStats {
    pub total: usize,
    pub stock_units: i64,
    pub inventory_value: f64,
    pub low_stock: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DressStats {
    pub total: usize,
    pub this_month: usize,
    pub by_branch: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub users: UserStats,
    pub products: ProductStats,
    pub dresses: DressStats,
    pub timestamp: String,
    /// Some figure was computed from sample data.
    pub fallback: bool,
}

pub fn dashboard_router() -> Router {
    Router::new().route("/api/dashboard", get(dashboard))
}

async fn dashboard(Extension(state): Extension<AppState>) -> RespJson<DashboardResponse> {
    let ((users, users_fallback), (products, products_fallback), (dresses, dresses_fallback)) = tokio::join!(
        state.users().load_or_fallback(),
        state.products().load_or_fallback(),
        state.dresses().load_or_fallback(),
    );

    let month = chrono::Local::now().format("%Y-%m").to_string();
    let response = DashboardResponse {
        success: true,
        users: user_stats(&users),
        products: product_stats(&products, state.low_stock_threshold()),
        dresses: dress_stats(&dresses, &month),
        timestamp: now(),
        fallback: users_fallback || products_fallback || dresses_fallback,
    };
    tracing::info!(
        users = response.users.total,
        products = response.products.total,
        dresses = response.dresses.total,
        fallback = response.fallback,
        "Dashboard computed"
    );
    RespJson(response)
}

fn user_stats(users: &[User]) -> UserStats {
    UserStats {
        total: users.len(),
        active: users
            .iter()
            .filter(|u| u.status.eq_ignore_ascii_case("active"))
            .count(),
    }
}

fn product_stats(products: &[Product], low_stock_threshold: i64) -> ProductStats {
    ProductStats {
        total: products.len(),
        stock_units: products.iter().map(|p| p.stock_quantity).sum(),
        inventory_value: products.iter().map(Product::stock_value).sum(),
        low_stock: products
            .iter()
            .filter(|p| p.stock_quantity <= low_stock_threshold)
            .count(),
    }
}

/// `month` is `YYYY-MM`.
fn dress_stats(dresses: &[Dress], month: &str) -> DressStats {
    let mut by_branch = BTreeMap::new();
    for dress in dresses {
        let branch = if dress.branch.trim().is_empty() {
            "(none)".to_string()
        } else {
            dress.branch.clone()
        };
        *by_branch.entry(branch).or_insert(0) += 1;
    }
    DressStats {
        total: dresses.len(),
        this_month: dresses
            .iter()
            .filter(|d| d.month().as_deref() == Some(month))
            .count(),
        by_branch,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::routes::test_support::{app_with, broken_app, call, sheet};
    use crate::table::Record;

    #[test]
    fn test_product_stats() {
        let stats = product_stats(&Product::fallback(), 30);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.stock_units, 180);
        assert_eq!(stats.inventory_value, 10000.0 * 50.0 + 20000.0 * 30.0 + 15000.0 * 100.0);
        assert_eq!(stats.low_stock, 1);
    }

    #[test]
    fn test_dress_stats_by_month_and_branch() {
        let mut second = Dress::fallback().remove(0);
        second.date = "03/07/2025".to_string();
        second.branch = "SHILA HVH".to_string();
        let dresses = vec![Dress::fallback().remove(0), second];

        let stats = dress_stats(&dresses, "2025-06");
        assert_eq!(stats.total, 2);
        assert_eq!(stats.this_month, 1);
        assert_eq!(stats.by_branch.get("SHILA HVH"), Some(&1));
        assert_eq!(stats.by_branch.get("LINH NGA Hà Nội"), Some(&1));
    }

    #[test]
    fn test_user_stats() {
        let stats = user_stats(&User::fallback());
        assert_eq!(stats, UserStats { total: 3, active: 2 });
    }

    #[tokio::test]
    async fn test_dashboard_endpoint() {
        let (router, _) = app_with(vec![
            sheet(0, "users", &[&["name", "status"], &["Lan", "active"], &["Minh", "pending"]]),
            sheet(1, "products", &[&["product_name", "cost_price", "stock_quantity"], &["Ren", "100", "2"]]),
            sheet(2, "dress", &[&["dress_code", "branch"], &["DR1", "LINH NGA HCM"]]),
        ]);
        let (status, body) = call(&router, "GET", "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"]["total"], 2);
        assert_eq!(body["users"]["active"], 1);
        assert_eq!(body["products"]["inventory_value"], 200.0);
        assert_eq!(body["products"]["low_stock"], 1);
        assert_eq!(body["dresses"]["by_branch"]["LINH NGA HCM"], 1);
        assert_eq!(body["fallback"], false);

        let (_, body) = call(&broken_app(), "GET", "/api/dashboard", None).await;
        assert_eq!(body["fallback"], true);
        assert_eq!(body["users"]["total"], 3);
    }
}
