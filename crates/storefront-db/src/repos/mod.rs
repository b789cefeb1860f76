pub mod notice;
pub mod order;
pub mod product;
pub mod user;
