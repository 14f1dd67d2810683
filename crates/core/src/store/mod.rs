pub mod csv_file;
pub mod memory;
pub mod traits;
