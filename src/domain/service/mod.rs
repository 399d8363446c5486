//! Domain services: pure calculations with no I/O

pub mod billing;
pub mod check_digit;
