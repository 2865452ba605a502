//! Extraction of transaction rows from the plain text layout of a bank
//! statement.
//!
//! Text comes in as lines (see [`model::StatementDocument`]). The
//! [`parser::StatementParser`] walks them once, resolving the statement date
//! when it first appears and classifying every other line as either a
//! transaction or noise.

pub mod amount;
pub mod classify;
pub mod currency;
pub mod cursor;
pub mod date;
pub mod lookahead;
pub mod model;
pub mod parser;
pub mod statement_date;

pub use model::{StatementDocument, Transaction};
pub use parser::{parse_statement_text, ParseOptions, StatementParser};
