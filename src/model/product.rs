use serde::{Deserialize, Serialize};

use super::{assign, contains_ci, loose_float, loose_int, loose_text, required, search_term, InputError};
use crate::table::{dates, FieldSpec, Record, RowView};

const PRODUCT_CODE: FieldSpec = FieldSpec::new("product_code", &["product_code", "Mã hàng"]);
const PRODUCT_NAME: FieldSpec = FieldSpec::new("product_name", &["product_name", "Tên hàng"]);
const CATEGORY: FieldSpec = FieldSpec::new("category", &["category", "Loại"]);
const COST_PRICE: FieldSpec = FieldSpec::new("cost_price", &["cost_price", "Giá vốn"]);
const STOCK_QUANTITY: FieldSpec = FieldSpec::new("stock_quantity", &["stock_quantity", "Tồn kho"]);
const UNIT: FieldSpec = FieldSpec::new("unit", &["unit", "ĐVT"]);
const IMAGE_URL: FieldSpec = FieldSpec::new("image_url", &["image_url", "Hình ảnh"]);
const SUPPLIER: FieldSpec = FieldSpec::new("supplier", &["supplier", "Nhà cung cấp"]);
const ORDER_LINK: FieldSpec = FieldSpec::new("order_link", &["order_link", "Link đặt hàng"]);
const CREATED_AT: FieldSpec =
    FieldSpec::new("created_at", &["created_at", "CREATED_AT", "Ngày tạo", "Created", "Date"]);

static FIELDS: [FieldSpec; 10] = [
    PRODUCT_CODE,
    PRODUCT_NAME,
    CATEGORY,
    COST_PRICE,
    STOCK_QUANTITY,
    UNIT,
    IMAGE_URL,
    SUPPLIER,
    ORDER_LINK,
    CREATED_AT,
];

/// Inventory item (fabric, lace, beads, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub product_code: String,
    pub product_name: String,
    pub category: String,
    pub cost_price: f64,
    pub stock_quantity: i64,
    pub unit: String,
    pub image_url: String,
    pub supplier: String,
    pub order_link: String,
    pub created_at: String,
}

impl Product {
    pub fn stock_value(&self) -> f64 {
        self.cost_price * self.stock_quantity as f64
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub product_code: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "loose_float")]
    pub cost_price: Option<f64>,
    #[serde(default, deserialize_with = "loose_int")]
    pub stock_quantity: Option<i64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub order_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub product_code: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "loose_float")]
    pub cost_price: Option<f64>,
    #[serde(default, deserialize_with = "loose_int")]
    pub stock_quantity: Option<i64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub order_link: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub search: Option<String>,
}

impl CreateProductRequest {
    pub fn into_product(self, today: &str) -> Result<Product, InputError> {
        let product_code = required(self.product_code, "product_code")?;
        let product_name = required(self.product_name, "product_name")?;
        let category = required(self.category, "category")?;
        let cost_price = self.cost_price.ok_or(InputError::Missing("cost_price"))?;
        let stock_quantity = self
            .stock_quantity
            .ok_or(InputError::Missing("stock_quantity"))?;
        let unit = required(self.unit, "unit")?;

        Ok(Product {
            id: 0,
            product_code,
            product_name,
            category,
            cost_price,
            stock_quantity,
            unit,
            image_url: self.image_url.unwrap_or_default(),
            supplier: self.supplier.unwrap_or_default(),
            order_link: self.order_link.unwrap_or_default(),
            created_at: today.to_string(),
        })
    }
}

impl UpdateProductRequest {
    pub fn into_change(self) -> Result<impl FnOnce(&mut Product) -> Vec<&'static str>, InputError> {
        let untouched = self.product_code.is_none()
            && self.product_name.is_none()
            && self.category.is_none()
            && self.cost_price.is_none()
            && self.stock_quantity.is_none()
            && self.unit.is_none()
            && self.image_url.is_none()
            && self.supplier.is_none()
            && self.order_link.is_none()
            && self.created_at.is_none();
        if untouched {
            return Err(InputError::EmptyUpdate);
        }

        Ok(move |p: &mut Product| {
            let mut changed = Vec::new();
            assign(&mut p.product_code, self.product_code, "product_code", &mut changed);
            assign(&mut p.product_name, self.product_name, "product_name", &mut changed);
            assign(&mut p.category, self.category, "category", &mut changed);
            assign(&mut p.cost_price, self.cost_price, "cost_price", &mut changed);
            assign(&mut p.stock_quantity, self.stock_quantity, "stock_quantity", &mut changed);
            assign(&mut p.unit, self.unit, "unit", &mut changed);
            assign(&mut p.image_url, self.image_url, "image_url", &mut changed);
            assign(&mut p.supplier, self.supplier, "supplier", &mut changed);
            assign(&mut p.order_link, self.order_link, "order_link", &mut changed);
            assign(&mut p.created_at, self.created_at, "created_at", &mut changed);
            changed
        })
    }
}

impl ProductFilter {
    pub fn from_query(query: &ProductQuery) -> Self {
        Self {
            search: search_term(query.search.as_deref()),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        let Some(term) = &self.search else {
            return true;
        };
        [
            &product.product_code,
            &product.product_name,
            &product.category,
            &product.supplier,
        ]
        .iter()
        .any(|field| contains_ci(field, term))
    }
}

/// Money cells are written without a trailing `.0` for whole amounts.
fn money_cell(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl Record for Product {
    const KIND: &'static str = "Product";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn from_row(id: i64, row: &RowView<'_>) -> Self {
        Self {
            id,
            product_code: row.text(&PRODUCT_CODE),
            product_name: row.text(&PRODUCT_NAME),
            category: row.text(&CATEGORY),
            cost_price: row.float(&COST_PRICE),
            stock_quantity: row.int(&STOCK_QUANTITY),
            unit: row.text(&UNIT),
            image_url: row.text(&IMAGE_URL),
            supplier: row.text(&SUPPLIER),
            order_link: row.text(&ORDER_LINK),
            created_at: row
                .get(CREATED_AT.aliases)
                .map_or_else(dates::today, str::to_string),
        }
    }

    fn cell(&self, field: &str) -> String {
        match field {
            "product_code" => self.product_code.clone(),
            "product_name" => self.product_name.clone(),
            "category" => self.category.clone(),
            "cost_price" => money_cell(self.cost_price),
            "stock_quantity" => self.stock_quantity.to_string(),
            "unit" => self.unit.clone(),
            "image_url" => self.image_url.clone(),
            "supplier" => self.supplier.clone(),
            "order_link" => self.order_link.clone(),
            "created_at" => self.created_at.clone(),
            _ => String::new(),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn is_blank(&self) -> bool {
        self.product_name.trim().is_empty()
    }

    fn fallback() -> Vec<Self> {
        let sample = |id: i64, category: &str, cost_price: f64, stock_quantity: i64, unit: &str, supplier: &str, created_at: &str| Product {
            id,
            product_code: format!("SP{id:03}"),
            product_name: format!("Sản phẩm {id}"),
            category: category.to_string(),
            cost_price,
            stock_quantity,
            unit: unit.to_string(),
            image_url: format!("http://example.com/image{id}.jpg"),
            supplier: supplier.to_string(),
            order_link: format!("http://example.com/order{id}"),
            created_at: created_at.to_string(),
        };
        vec![
            sample(1, "fabric", 10000.0, 50, "meter", "Nhà cung cấp A", "2024-01-15"),
            sample(2, "lace", 20000.0, 30, "piece", "Nhà cung cấp B", "2024-01-16"),
            sample(3, "beads", 15000.0, 100, "kg", "Nhà cung cấp C", "2024-01-17"),
        ]
    }
}
