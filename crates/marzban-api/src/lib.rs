// marzban-api: Async Rust client for the Marzban panel REST API
//
// Two layers: `schema` validates every payload against its record type in
// `models`; `api` owns the HTTP session, the bearer token and the retrying
// dispatcher. `error` is the flat error taxonomy shared by both.

pub mod api;
pub mod error;
pub mod models;
pub mod schema;
pub mod transport;

pub use api::MarzbanClient;
pub use error::Error;
pub use schema::{Entity, EntityKind, SchemaError};
pub use transport::{TlsMode, TransportConfig};
