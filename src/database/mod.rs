pub mod manager;
pub mod row;
pub mod schema;
