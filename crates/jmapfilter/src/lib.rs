//! # jmapfilter
//!
//! A JMAP (RFC 8620 / RFC 8621) mail client built around batched mutations.
//!
//! ## Features
//!
//! - **Session discovery**: resolves the API URL and the account matching
//!   the login name from the well-known discovery document
//! - **Request composition**: several method calls per request, with
//!   back-references (`#ids` → `resultOf`) between them
//! - **Catalog snapshots**: cached mailbox list and message query result,
//!   replaced whole on each bootstrap
//! - **Mutation batch**: mark read/unread, flag/unflag, move to trash or
//!   other mailboxes, all sent in one `flush()`
//!
//! ## Quick Start
//!
//! ```ignore
//! use jmapfilter::{Config, Credentials, JmapClient};
//!
//! #[tokio::main]
//! async fn main() -> jmapfilter::Result<()> {
//!     let credentials = Credentials::new("me@example.com", "app-password");
//!     let client = JmapClient::connect(Config::default(), credentials).await?;
//!
//!     let catalog = client.catalog();
//!     for message in catalog.messages() {
//!         if message.is_addressed_to("me+test@example.com") {
//!             client.mark_seen(message)?;
//!             client.flag(message)?;
//!             client.move_to_trash(message)?;
//!         }
//!     }
//!
//!     let responses = client.flush().await?;
//!     for set in jmapfilter::set_responses(&responses)? {
//!         println!("updated {} messages", set.updated.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`envelope`]: request envelope and method-call types
//! - [`methods`]: builders for the calls this crate issues
//! - [`response`]: response envelope and `/set` result parsing
//! - [`session`]: discovery document and session resolution
//! - [`catalog`]: mailbox and message snapshots
//! - [`transport`]: HTTP collaborator

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod call_id;
pub mod catalog;
mod client;
pub mod config;
pub mod envelope;
mod error;
pub mod methods;
pub mod response;
pub mod session;
pub mod transport;

pub use batch::MutationBatch;
pub use call_id::CallIdGenerator;
pub use catalog::{Catalog, EmailAddress, MailboxRecord, MailboxRole, MessageRecord};
pub use client::JmapClient;
pub use config::{Config, ConfigBuilder};
pub use envelope::{MethodCall, Request, ResultReference};
pub use error::{Error, ErrorKind, Result};
pub use methods::Patch;
pub use response::{MethodError, MethodResponse, Response, SetError, SetResponse, set_responses};
pub use session::{AccountInfo, Session, SessionResource};
pub use transport::{Credentials, HttpTransport, Transport};
