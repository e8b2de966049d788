pub mod text_collector;
pub use text_collector::*;

pub mod column;
pub use column::*;

pub mod literal;
pub use literal::*;

pub mod function;
pub use function::*;

pub mod operators;
pub use operators::*;

pub mod expr;
pub use expr::*;

pub mod expr_parser;

pub mod from_item;
pub use from_item::*;

pub mod select;
pub use select::*;

pub mod dml;
pub use dml::*;

pub mod statement;
pub use statement::*;
