//! Raw message input: RFC 5322 `.eml` adaptation.

pub mod eml;
