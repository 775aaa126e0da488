pub mod cascade;
pub mod customer_service;
pub mod outsource_service;
pub mod report_service;
pub mod sale_service;
pub mod sale_type_service;
