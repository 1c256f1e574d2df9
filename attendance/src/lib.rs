pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::ServiceError;
pub use service::Service;
pub use store::{MemoryStore, Store};
