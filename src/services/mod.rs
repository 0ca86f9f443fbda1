pub mod catalog_service;
pub mod customer_service;
pub mod ledger;
pub mod order_assembler;
pub mod order_service;
pub mod store_service;
