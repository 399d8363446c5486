//! File-format adapters around the domain model

pub mod csv_io;

pub use csv_io::parse_datetime;
