//! # Product listing handler.

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

const PAGE_LIMIT: u32 = 10;

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Price, as a decimal string.
    pub price: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Pagination block of a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    /// Page size.
    pub limit: u32,
    /// Requested offset, echoed back as given.
    pub offset: i64,
    /// Total number of products.
    pub total: u64,
    /// Current page (1-based).
    pub page: u32,
}

/// Response body of `GET /products`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductList {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub paginator: Paginator,
}

/// Router with the listing mounted at `/products`.
pub fn router() -> Router {
    Router::new().route("/products", get(products))
}

/// Query parameters of `GET /products`; an absent or empty offset means 0.
#[derive(Debug, Default, Deserialize)]
struct ProductsQuery {
    offset: Option<String>,
}

async fn products(Query(query): Query<ProductsQuery>) -> Response {
    let offset = match parse_offset(query.offset.as_deref()) {
        Ok(offset) => offset,
        Err(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
    };
    Json(catalog(offset)).into_response()
}

fn parse_offset(raw: Option<&str>) -> Result<i64, &'static str> {
    match raw.unwrap_or_default() {
        "" => Ok(0),
        raw => raw.parse().map_err(|_| "Invalid offset value"),
    }
}

fn catalog(offset: i64) -> ProductList {
    let products = vec![
        Product {
            id: 1,
            name: "Product 1".into(),
            price: "100".into(),
            description: "Description".into(),
        },
        Product {
            id: 2,
            name: "Product 2".into(),
            price: "200".into(),
            description: "Description 2".into(),
        },
    ];
    ProductList {
        paginator: Paginator {
            limit: PAGE_LIMIT,
            offset,
            total: products.len() as u64,
            page: 1,
        },
        products,
    }
}
