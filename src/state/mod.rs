//! Model/version store
//!
//! The closed set of [`Action`]s, the [`reduce`] transition function and the
//! [`Workbook`] controller that owns the state.

pub mod action;
pub mod clock;
mod journal;
pub mod reducer;
pub mod workbook;

pub use action::{Action, ImportMode};
pub use clock::{Clock, ManualClock, SystemClock};
pub use reducer::{merge_versions, reduce};
pub use workbook::{load_state, DataRef, Workbook};
