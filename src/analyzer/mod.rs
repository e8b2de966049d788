pub mod alias_holder;
pub use alias_holder::*;

pub mod alias_stripper;
pub use alias_stripper::*;

pub mod from_info;
pub use from_info::*;

pub mod command_info;
pub use command_info::*;

pub mod validation;
pub use validation::*;
