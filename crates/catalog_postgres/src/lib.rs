//! catalog_postgres: sqlx/Postgres adapters for the catalog_core ports.

pub mod pool;
pub mod store;
mod sqlx_types;

pub use pool::{connect_with_retry, migrate};
pub use store::{
    PgActorStore, PgMovieActorStore, PgMovieStore, PgRoleStore, PgStores, PgUserStore,
};
