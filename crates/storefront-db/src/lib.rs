pub mod pool;
pub mod repos;
pub mod search;

// Re-export commonly used items
pub use pool::{create_pool, run_migrations};
pub use repos::notice::{NoticeRepo, NoticeRow};
pub use repos::order::{
    assemble_orders, NewOrder, OrderItemRow, OrderRepo, OrderRow, PlaceOrderOutcome,
};
pub use repos::product::{DeleteOutcome, NewProduct, ProductRepo, ProductRow};
pub use repos::user::{NewUser, ProfileUpdate, UserRepo, UserRow};
pub use search::contains_pattern;
