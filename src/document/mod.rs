pub mod object_id;
pub use object_id::*;

pub mod value;
pub use value::*;

pub mod command;
pub use command::*;
