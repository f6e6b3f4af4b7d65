//! Session discovery.
//!
//! The discovery document (RFC 8620 Section 2) tells the client where to
//! send API requests and which accounts the credentials can reach.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// An account listed in the discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Account display name, usually the login address.
    pub name: String,
    /// Whether this is a personal account.
    #[serde(default)]
    pub is_personal: bool,
    /// Whether the account is read-only.
    #[serde(default)]
    pub is_read_only: bool,
}

/// The discovery document returned by the well-known URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResource {
    /// URL that accepts API requests.
    pub api_url: String,
    /// Accounts as `(id, account)` pairs in document order.
    #[serde(deserialize_with = "accounts_in_order")]
    pub accounts: Vec<(String, AccountInfo)>,
    /// Authenticated username, if reported.
    #[serde(default)]
    pub username: Option<String>,
    /// Session state string, if reported.
    #[serde(default)]
    pub state: Option<String>,
}

impl SessionResource {
    /// Parses a discovery document.
    ///
    /// # Errors
    ///
    /// Returns a discovery error if `apiUrl` or `accounts` is missing or
    /// malformed.
    pub fn from_value(document: Value) -> Result<Self> {
        serde_json::from_value(document).map_err(|e| Error::Discovery(Box::new(e.into())))
    }

    /// Returns the account with the given id.
    #[must_use]
    pub fn account(&self, id: &str) -> Option<&AccountInfo> {
        self.accounts
            .iter()
            .find(|(account_id, _)| account_id == id)
            .map(|(_, account)| account)
    }

    /// Returns the id of the first account named `username`.
    ///
    /// Ties go to the account listed first by the server.
    #[must_use]
    pub fn account_for(&self, username: &str) -> Option<&str> {
        self.accounts
            .iter()
            .find(|(_, account)| account.name == username)
            .map(|(id, _)| id.as_str())
    }
}

fn accounts_in_order<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, AccountInfo)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct AccountsVisitor;

    impl<'de> Visitor<'de> for AccountsVisitor {
        type Value = Vec<(String, AccountInfo)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of account ids to accounts")
        }

        fn visit_map<A: MapAccess<'de>>(
            self,
            mut map: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut accounts = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                accounts.push(entry);
            }
            Ok(accounts)
        }
    }

    deserializer.deserialize_map(AccountsVisitor)
}

/// A resolved session: where to send calls and for which account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// API endpoint.
    pub api_url: String,
    /// Account id matching the authenticated user.
    pub account_id: String,
}

impl Session {
    /// Resolves the session for `username` from a discovery document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if no account carries that name.
    pub fn resolve(resource: &SessionResource, username: &str) -> Result<Self> {
        let account_id = resource
            .account_for(username)
            .ok_or_else(|| Error::AccountNotFound {
                username: username.to_string(),
            })?;

        Ok(Self {
            api_url: resource.api_url.clone(),
            account_id: account_id.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "apiUrl": "https://api.example.com/jmap/api/",
            "accounts": {
                "A1": {"name": "me@example.com", "isPersonal": true},
                "A2": {"name": "other@x"},
            },
            "username": "me@example.com",
            "state": "cyrus-0",
        })
    }

    #[test]
    fn test_resolve_matching_account() {
        let resource = SessionResource::from_value(document()).unwrap();
        let session = Session::resolve(&resource, "me@example.com").unwrap();

        assert_eq!(session.account_id, "A1");
        assert_eq!(session.api_url, "https://api.example.com/jmap/api/");
        assert!(resource.account("A1").unwrap().is_personal);
        assert!(resource.account("A9").is_none());
        assert_eq!(resource.state.as_deref(), Some("cyrus-0"));
    }

    #[test]
    fn test_resolve_other_account() {
        let resource = SessionResource::from_value(document()).unwrap();
        assert_eq!(
            Session::resolve(&resource, "other@x").unwrap().account_id,
            "A2"
        );
    }

    #[test]
    fn test_no_matching_account() {
        let resource = SessionResource::from_value(document()).unwrap();
        let err = Session::resolve(&resource, "nobody@example.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);
    }

    #[test]
    fn test_duplicate_name_resolves_to_first_listed() {
        let document: Value = serde_json::from_str(
            r#"{
                "apiUrl": "https://api.example.com/jmap/api/",
                "accounts": {
                    "Z9": {"name": "me@example.com"},
                    "A1": {"name": "me@example.com"}
                }
            }"#,
        )
        .unwrap();

        let resource = SessionResource::from_value(document).unwrap();
        let ids: Vec<&str> = resource
            .accounts
            .iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(ids, vec!["Z9", "A1"]);

        let session = Session::resolve(&resource, "me@example.com").unwrap();
        assert_eq!(session.account_id, "Z9");
    }

    #[test]
    fn test_missing_api_url() {
        let err = SessionResource::from_value(json!({"accounts": {}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);
    }
}
