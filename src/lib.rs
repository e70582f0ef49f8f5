//! Generates Swift client libraries and command-line tools from Google
//! API discovery documents.

pub mod codegen;
pub mod error;
pub mod parse;
