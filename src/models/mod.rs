pub mod customer;
pub mod outsource;
pub mod outsource_cost;
pub mod sale;
pub mod sale_item;
pub mod sale_type;
pub mod user;
