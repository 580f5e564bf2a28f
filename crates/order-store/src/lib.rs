pub mod error;
pub mod memory;
pub mod page;
pub mod postgres;
pub mod store;

pub use common::{Money, Order, OrderId, Product, UserId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryOrderStore, StoreCalls};
pub use page::{Page, PageRequest};
pub use postgres::PostgresOrderStore;
pub use store::{OrderStore, validate_order_fields};
