//! `sparkpayload` — turn an email message into a SparkPost transmission payload.
//!
//! The core is [`payload::build_payload`], a pure transform from anything
//! implementing [`model::MailMessage`] to a [`payload::Payload`] ready to be
//! serialized as JSON. Messages can be assembled in code, loaded from a
//! TOML/JSON description ([`loader`]) or adapted from an `.eml` file
//! ([`parser::eml`]).

pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod payload;

pub use error::{PayloadError, Result};
pub use model::{MailMessage, Message};
pub use payload::{build_payload, Payload};
