//! Pure order and loyalty rules with no I/O.

pub mod money;
pub mod phone;
pub mod points;
pub mod pricing;
pub mod status;
