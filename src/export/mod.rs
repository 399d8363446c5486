//! Report export to external file formats

pub mod excel;

pub use excel::export_billing_to_excel;
