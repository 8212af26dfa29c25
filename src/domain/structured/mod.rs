//! Parsing of untrusted structured output from the remote services.

mod parser;
mod repair;
mod sanitizer;

pub use parser::{FieldDefault, ParseFailure, ParsedResponse, ResponseSchema, StructuredResponseParser};
pub use repair::{
    default_strategies, BalanceBrackets, InsertMissingSeparators, RepairStrategy, StripFencing,
    TruncateIncomplete,
};
pub use sanitizer::{ContentSanitizer, SanitizationError, MAX_FIELD_LENGTH, MAX_RESPONSE_LENGTH};
