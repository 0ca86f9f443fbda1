pub mod audit_logs;
pub mod customers;
pub mod order_items;
pub mod orders;
pub mod point_transactions;
pub mod points_accounts;
pub mod services;
pub mod store_members;
pub mod stores;

pub use audit_logs::Entity as AuditLogs;
pub use customers::Entity as Customers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use point_transactions::Entity as PointTransactions;
pub use points_accounts::Entity as PointsAccounts;
pub use services::Entity as Services;
pub use store_members::Entity as StoreMembers;
pub use stores::Entity as Stores;
