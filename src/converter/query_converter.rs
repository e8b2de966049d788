use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    analyzer::{validate, CommandInfoBuilder},
    config::ConverterConfig,
    document::MongoCommand,
    parser::ast::Statement,
    translator::translate_info,
    ConversionError,
};

/// Entry point of the crate: SQL text in, shell command out.
///
/// A converter holds only its configuration, so one instance can be shared
/// and reused for any number of statements.
#[derive(Debug, Clone, Default)]
pub struct QueryConverter {
    config: ConverterConfig,
}

impl QueryConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Converts `sql` and renders the result as shell text.
    pub fn convert(&self, sql: &str) -> Result<String, ConversionError> {
        let conversion_id = Uuid::new_v4();
        let started = Instant::now();

        let rendered = self.translate(sql).and_then(|command| command.render());

        match &rendered {
            Ok(converted) if self.config.log_query_enabled => info!(
                %conversion_id,
                original = sql,
                converted = converted.as_str(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "query converted"
            ),
            Ok(_) => {}
            Err(err) => warn!(%conversion_id, original = sql, error = %err, "query conversion failed"),
        }
        rendered
    }

    /// Converts `sql` into a command without rendering it.
    pub fn translate(&self, sql: &str) -> Result<MongoCommand, ConversionError> {
        // 1) Parse
        let statement = Statement::try_from(sql)?;
        self.translate_statement(&statement)
    }

    pub fn translate_statement(&self, statement: &Statement) -> Result<MongoCommand, ConversionError> {
        // 2) Build the command description
        let info = CommandInfoBuilder::new(&self.config).build(statement)?;

        // 3) Validate
        validate(&info)?;

        // 4) Translate
        let command = translate_info(&info, &self.config)?;
        debug!(command = command.name(), collection = command.collection(), "statement translated");
        Ok(command)
    }
}
