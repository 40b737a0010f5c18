//! HTTP-serving task.
//!
//! [`HttpServer`] is a [`Task`](crate::Task) that serves the product listing
//! until its lifetime is cancelled, then finishes in-flight requests and exits.
//!
//! ```text
//! GET /products?offset=N
//!   └─► TraceLayer ─► RequestDecompressionLayer (gzip) ─► CompressionLayer (gzip)
//!         ─► CorsLayer ─► products()
//! ```

mod products;
mod task;

pub use products::{Paginator, Product, ProductList, router};
pub use task::{HttpServer, ServerConfig};
