//! Cached mailbox and message snapshots.
//!
//! A [`Catalog`] is an immutable snapshot. Bootstrap calls build a new one
//! and swap it in whole, so readers never observe a half-updated cache.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Standard purpose of a mailbox (RFC 8621 Section 2).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailboxRole {
    /// Incoming mail.
    Inbox,
    /// Deleted mail.
    Trash,
    /// Sent mail.
    Sent,
    /// Archived mail.
    Archive,
    /// Unsent drafts.
    Drafts,
    /// Spam.
    Junk,
    /// Important mail.
    Important,
    /// Every message.
    All,
    /// Flagged mail.
    Flagged,
    /// Any role this crate does not name.
    #[serde(untagged)]
    Other(String),
}

impl MailboxRole {
    /// Returns the wire form of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => "inbox",
            Self::Trash => "trash",
            Self::Sent => "sent",
            Self::Archive => "archive",
            Self::Drafts => "drafts",
            Self::Junk => "junk",
            Self::Important => "important",
            Self::All => "all",
            Self::Flagged => "flagged",
            Self::Other(role) => role,
        }
    }
}

impl From<&str> for MailboxRole {
    fn from(role: &str) -> Self {
        match role {
            "inbox" => Self::Inbox,
            "trash" => Self::Trash,
            "sent" => Self::Sent,
            "archive" => Self::Archive,
            "drafts" => Self::Drafts,
            "junk" => Self::Junk,
            "important" => Self::Important,
            "all" => Self::All,
            "flagged" => Self::Flagged,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MailboxRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mailbox as returned by `Mailbox/get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxRecord {
    /// Server id.
    pub id: String,
    /// Role, if the mailbox has one.
    #[serde(default)]
    pub role: Option<MailboxRole>,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// A name/address pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Address.
    pub email: String,
}

/// A message as returned by `Email/get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Server id.
    pub id: String,
    /// Recipients.
    #[serde(default)]
    pub to: Option<Vec<EmailAddress>>,
    /// Senders.
    #[serde(default)]
    pub from: Option<Vec<EmailAddress>>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Mailbox membership.
    #[serde(default)]
    pub mailbox_ids: HashMap<String, bool>,
    /// Keywords such as `$seen`.
    #[serde(default)]
    pub keywords: HashMap<String, bool>,
    /// Arrival time.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

impl MessageRecord {
    /// Returns the recipient addresses.
    #[must_use]
    pub fn recipients(&self) -> &[EmailAddress] {
        self.to.as_deref().unwrap_or_default()
    }

    /// Returns true if `address` is among the recipients.
    #[must_use]
    pub fn is_addressed_to(&self, address: &str) -> bool {
        self.recipients().iter().any(|to| to.email == address)
    }

    /// Returns true if the message carries `keyword`.
    #[must_use]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.get(keyword).copied().unwrap_or(false)
    }
}

impl AsRef<str> for MessageRecord {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// Snapshot of the mailbox list and the last message query.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    mailboxes: Vec<MailboxRecord>,
    messages: Vec<MessageRecord>,
}

impl Catalog {
    /// Creates a catalog from records.
    #[must_use]
    pub const fn new(mailboxes: Vec<MailboxRecord>, messages: Vec<MessageRecord>) -> Self {
        Self {
            mailboxes,
            messages,
        }
    }

    /// Builds a catalog with a new mailbox list, keeping the messages.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is not a valid mailbox.
    pub fn with_mailbox_list(&self, list: &[Value]) -> Result<Self> {
        Ok(Self {
            mailboxes: parse_list(list)?,
            messages: self.messages.clone(),
        })
    }

    /// Builds a catalog with a new message list, keeping the mailboxes.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is not a valid message.
    pub fn with_message_list(&self, list: &[Value]) -> Result<Self> {
        Ok(Self {
            mailboxes: self.mailboxes.clone(),
            messages: parse_list(list)?,
        })
    }

    /// Returns the cached mailboxes in server order.
    #[must_use]
    pub fn mailboxes(&self) -> &[MailboxRecord] {
        &self.mailboxes
    }

    /// Returns the cached messages in query order.
    #[must_use]
    pub fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    /// Returns the id of the first cached mailbox with `role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MailboxNotFound`] if no mailbox has that role.
    pub fn mailbox_by_role(&self, role: &MailboxRole) -> Result<&str> {
        self.mailboxes
            .iter()
            .find(|mailbox| mailbox.role.as_ref() == Some(role))
            .map(|mailbox| mailbox.id.as_str())
            .ok_or_else(|| Error::MailboxNotFound(role.clone()))
    }

    /// Returns a cached message by id.
    #[must_use]
    pub fn message(&self, id: &str) -> Option<&MessageRecord> {
        self.messages.iter().find(|message| message.id == id)
    }
}

fn parse_list<T: serde::de::DeserializeOwned>(list: &[Value]) -> Result<Vec<T>> {
    list.iter()
        .map(|item| serde_json::from_value(item.clone()).map_err(Into::into))
        .collect()
}
