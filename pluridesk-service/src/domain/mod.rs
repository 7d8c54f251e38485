//! Pure financial computations shared by handlers and the database layer.

pub mod aggregate;
pub mod currency;
pub mod line_items;

pub use aggregate::sum_by_currency;
pub use currency::{format_amount, parse_amount};
pub use line_items::{invoice_total, job_total, line_amount, round2, subtotal};
