//! Builders for the method calls this crate issues.

use serde_json::{Map, Value, json};

use crate::envelope::{MethodCall, ResultReference};

/// `Mailbox/get` method name.
pub const MAILBOX_GET: &str = "Mailbox/get";
/// `Email/query` method name.
pub const EMAIL_QUERY: &str = "Email/query";
/// `Email/get` method name.
pub const EMAIL_GET: &str = "Email/get";
/// `Email/set` method name.
pub const EMAIL_SET: &str = "Email/set";

/// Keyword marking a message as read.
pub const KEYWORD_SEEN: &str = "$seen";
/// Keyword marking a message as flagged.
pub const KEYWORD_FLAGGED: &str = "$flagged";

/// `Mailbox/get` for every mailbox in the account.
#[must_use]
pub fn mailbox_get(account_id: &str, call_id: impl Into<String>) -> MethodCall {
    MethodCall::new(MAILBOX_GET, call_id)
        .arg("accountId", account_id)
        .arg("ids", Value::Null)
}

/// `Email/query` for up to `limit` messages in one mailbox.
#[must_use]
pub fn email_query(
    account_id: &str,
    mailbox_id: &str,
    limit: u32,
    call_id: impl Into<String>,
) -> MethodCall {
    MethodCall::new(EMAIL_QUERY, call_id)
        .arg("accountId", account_id)
        .arg("filter", json!({ "inMailbox": mailbox_id }))
        .arg("limit", limit)
}

/// `Email/get` whose ids come from `query`'s `/ids` result.
#[must_use]
pub fn email_get_from_query(
    account_id: &str,
    query: &MethodCall,
    call_id: impl Into<String>,
) -> MethodCall {
    MethodCall::new(EMAIL_GET, call_id)
        .arg("accountId", account_id)
        .reference("ids", &ResultReference::new(query, "/ids"))
}

/// Partial update applied to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Sets (`true`) or clears (`false`) a keyword.
    Keyword {
        /// Keyword such as `$seen`.
        keyword: String,
        /// Whether the keyword is set.
        set: bool,
    },
    /// Replaces mailbox membership with exactly these mailboxes.
    MailboxIds(Vec<String>),
}

impl Patch {
    /// Keyword patch.
    #[must_use]
    pub fn keyword(keyword: impl Into<String>, set: bool) -> Self {
        Self::Keyword {
            keyword: keyword.into(),
            set,
        }
    }

    /// Converts to the patch object sent under `update.<id>`.
    ///
    /// Cleared keywords are sent as `null`, which removes the key.
    #[must_use]
    pub fn to_object(&self) -> Map<String, Value> {
        let mut object = Map::new();
        match self {
            Self::Keyword { keyword, set } => {
                let value = if *set { Value::Bool(true) } else { Value::Null };
                object.insert(format!("keywords/{keyword}"), value);
            }
            Self::MailboxIds(ids) => {
                let ids: Map<String, Value> = ids
                    .iter()
                    .map(|id| (id.clone(), Value::Bool(true)))
                    .collect();
                object.insert("mailboxIds".to_string(), Value::Object(ids));
            }
        }
        object
    }
}

/// `Email/set` updating one message.
#[must_use]
pub fn email_set_update(
    account_id: &str,
    message_id: &str,
    patch: &Patch,
    call_id: impl Into<String>,
) -> MethodCall {
    let mut update = Map::new();
    update.insert(message_id.to_string(), Value::Object(patch.to_object()));

    MethodCall::new(EMAIL_SET, call_id)
        .arg("accountId", account_id)
        .arg("update", Value::Object(update))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_get() {
        let call = mailbox_get("A1", "c0");
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!(["Mailbox/get", {"accountId": "A1", "ids": null}, "c0"])
        );
    }

    #[test]
    fn test_query_then_get() {
        let query = email_query("A1", "M2", 20, "c0");
        let get = email_get_from_query("A1", &query, "c1");

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!(["Email/query", {
                "accountId": "A1",
                "filter": {"inMailbox": "M2"},
                "limit": 20,
            }, "c0"])
        );
        assert_eq!(
            serde_json::to_value(&get).unwrap(),
            json!(["Email/get", {
                "accountId": "A1",
                "#ids": {"name": "Email/query", "path": "/ids", "resultOf": "c0"},
            }, "c1"])
        );
    }

    #[test]
    fn test_keyword_patches() {
        assert_eq!(
            Value::Object(Patch::keyword(KEYWORD_SEEN, true).to_object()),
            json!({"keywords/$seen": true})
        );
        assert_eq!(
            Value::Object(Patch::keyword(KEYWORD_FLAGGED, false).to_object()),
            json!({"keywords/$flagged": null})
        );
    }

    #[test]
    fn test_mailbox_patch_replaces_membership() {
        let patch = Patch::MailboxIds(vec!["M1".into(), "M3".into()]);
        assert_eq!(
            Value::Object(patch.to_object()),
            json!({"mailboxIds": {"M1": true, "M3": true}})
        );
    }

    #[test]
    fn test_email_set_update() {
        let call = email_set_update("A1", "e1", &Patch::keyword(KEYWORD_SEEN, true), "m0");
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!(["Email/set", {
                "accountId": "A1",
                "update": {"e1": {"keywords/$seen": true}},
            }, "m0"])
        );
    }
}
