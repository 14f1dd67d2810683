pub mod registry;
pub mod stooq;
pub mod traits;
pub mod yahoo;
