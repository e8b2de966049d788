pub mod query_converter;
pub use query_converter::*;
