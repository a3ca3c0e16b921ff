//! Core data model types for email messages, addresses, attachments and send options.

pub mod address;
pub mod attachment;
pub mod message;
pub mod options;

pub use address::{AddressList, EmailAddress};
pub use attachment::Attachment;
pub use message::{Data, Header, MailMessage, Message, Transmission};
pub use options::SendOptions;
