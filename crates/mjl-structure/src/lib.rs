mod balance;
mod errors;
mod literal;

pub use balance::check_structure;
pub use errors::StructureError;
pub use literal::parse_literal;
