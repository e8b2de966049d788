pub mod field_type;
pub use field_type::*;

pub mod converter_config;
pub use converter_config::*;
