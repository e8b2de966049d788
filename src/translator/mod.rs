pub mod function_names;

pub mod normalizer;
pub use normalizer::ValueNormalizer;

pub mod predicate;
pub use predicate::{MongoOperator, PredicateCompiler};

pub mod join;

pub mod query_holder;
pub use query_holder::*;

pub mod aggregation;

pub mod stages;
pub use stages::{run_stages, QueryStage};

pub mod assembler;

use crate::{analyzer::CommandInfo, config::ConverterConfig, document::MongoCommand, ConversionError};

/// Runs the stages over an already validated command and picks its shape.
pub fn translate_info(info: &CommandInfo, config: &ConverterConfig) -> Result<MongoCommand, ConversionError> {
    let holder = run_stages(info)?;
    Ok(assembler::assemble(info, holder, config.aggregation_options()))
}
