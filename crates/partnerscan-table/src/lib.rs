pub mod combine;
pub mod error;
pub mod table;

pub use combine::{combine, Combined};
pub use error::TableError;
pub use table::{load, read_records, save, write_records, COLUMNS};
