//! catalog_core: the movie catalog domain.
//!
//! Storage and token handling sit behind the traits in [`ports`]; everything
//! here is pure logic over those traits. `catalog_postgres` supplies the sqlx
//! adapters and `catalog_server` the HTTP surface.

pub mod error;
pub mod memory;
pub mod merge;
pub mod ports;
pub mod principal;
pub mod relation;
pub mod resolution;
pub mod service;
pub mod types;
pub mod validate;

pub use error::CatalogError;
pub use principal::{JwtClaims, Principal};
pub use service::{CatalogService, CatalogServiceImpl, MovieCreation};
