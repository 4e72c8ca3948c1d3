pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{Meow, MeowId};
pub use error::{Result, StoreError};
pub use memory::InMemoryMeowStore;
pub use postgres::PostgresMeowStore;
pub use store::MeowStore;
