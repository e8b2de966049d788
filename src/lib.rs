pub mod parser;

pub mod error;
pub use error::{ConversionError, ConversionResult};

pub mod config;
pub use config::{ConverterConfig, FieldType};

pub mod document;
pub use document::{Document, MongoCommand, ObjectId, Value};

pub mod analyzer;

pub mod translator;

pub mod converter;
pub use converter::QueryConverter;
