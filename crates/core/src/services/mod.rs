pub mod aggregator;
pub mod validator;
