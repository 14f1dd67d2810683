pub mod cache;
pub mod position;
pub mod series;
pub mod settings;
pub mod view;
