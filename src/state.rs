//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::model::dress::Dress;
use crate::model::product::Product;
use crate::model::user::User;
use crate::sheets::SheetBackend;
use crate::table::{ManualLimits, SheetSelector, SheetTable};

/// Tables over the three tabs of the document. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    backend_name: &'static str,
    users: SheetTable<User>,
    products: SheetTable<Product>,
    dresses: SheetTable<Dress>,
    low_stock_threshold: i64,
}

/// Per-tab lookup rules.
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    pub products_gid: i64,
    pub dresses_gid: i64,
    pub low_stock_threshold: i64,
}

impl SheetLayout {
    pub const fn from_config(config: &AppConfig) -> Self {
        Self {
            products_gid: config.products_gid,
            dresses_gid: config.dresses_gid,
            low_stock_threshold: config.low_stock_threshold,
        }
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            products_gid: crate::config::DEFAULT_PRODUCTS_GID,
            dresses_gid: crate::config::DEFAULT_DRESSES_GID,
            low_stock_threshold: 5,
        }
    }
}

impl AppState {
    pub fn new(backend: Arc<dyn SheetBackend>, layout: SheetLayout) -> Self {
        let users = SheetTable::new(
            Arc::clone(&backend),
            SheetSelector::new(&["users", "Users"], None, &[0]),
            ManualLimits {
                max_sheet_row: 1000,
                max_data_rows: None,
            },
        );
        let products = SheetTable::new(
            Arc::clone(&backend),
            SheetSelector::new(&["products", "Products", "Sản phẩm"], Some(layout.products_gid), &[1, 0]),
            ManualLimits {
                max_sheet_row: 100,
                max_data_rows: Some(49),
            },
        );
        let dresses = SheetTable::new(
            Arc::clone(&backend),
            SheetSelector::new(&["dress", "Dress", "DRESS"], Some(layout.dresses_gid), &[2]),
            ManualLimits {
                max_sheet_row: 1000,
                max_data_rows: None,
            },
        );

        Self {
            inner: Arc::new(AppStateInner {
                backend_name: backend.name(),
                users,
                products,
                dresses,
                low_stock_threshold: layout.low_stock_threshold,
            }),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend_name
    }

    pub fn users(&self) -> &SheetTable<User> {
        &self.inner.users
    }

    pub fn products(&self) -> &SheetTable<Product> {
        &self.inner.products
    }

    pub fn dresses(&self) -> &SheetTable<Dress> {
        &self.inner.dresses
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.inner.low_stock_threshold
    }
}
