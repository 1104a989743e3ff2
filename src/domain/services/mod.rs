mod response_parser;

pub use response_parser::{Directive, ResponseParser};
