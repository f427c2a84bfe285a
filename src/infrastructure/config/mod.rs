//! Infrastructure configuration modules.

pub mod accrual;
pub mod logging;
pub mod reconciler;
pub mod settings;
