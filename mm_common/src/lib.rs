mod credits;
mod helpers;

pub mod op;

pub use credits::{Credits, CreditsConversionError, MATCH_REQUEST_COST};
pub use helpers::parse_boolean_flag;
