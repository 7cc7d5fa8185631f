// SQLite-backed persistence for named shopping lists
// Lists survive restarts; the in-memory collection stays the source of
// truth until a save succeeds.

pub mod store;

pub use store::{ListDb, StoreError};

pub type Result<T> = std::result::Result<T, StoreError>;
