//! Domain logic for the workbook
//!
//! Pure functions over the data model: the cost formula and rollups, the
//! propagation rules for budget cells, and dataset comparison.

pub mod compare;
pub mod cost;
pub mod propagation;

pub use compare::{compare, Comparison, DiffStatus, FieldDiff, ServiceDiff};
pub use cost::{cost, grand_total, month_totals, monthly_costs, service_annual_cost};
pub use propagation::{clear_override, set_field};
