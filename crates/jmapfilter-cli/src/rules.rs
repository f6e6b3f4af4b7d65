//! Recipient-based filter rules.

use std::str::FromStr;

use anyhow::bail;
use jmapfilter::{JmapClient, MessageRecord, Transport};

/// Mutation applied to a matching message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Mark as read.
    MarkSeen,
    /// Mark as unread.
    MarkUnseen,
    /// Add the flag.
    Flag,
    /// Remove the flag.
    Unflag,
    /// Move to the trash mailbox.
    Trash,
}

impl Action {
    /// Queues this action for `message` on `client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot build the call.
    pub fn queue<T: Transport>(
        self,
        client: &JmapClient<T>,
        message: &MessageRecord,
    ) -> jmapfilter::Result<()> {
        match self {
            Self::MarkSeen => client.mark_seen(message),
            Self::MarkUnseen => client.mark_unseen(message),
            Self::Flag => client.flag(message),
            Self::Unflag => client.unflag(message),
            Self::Trash => client.move_to_trash(message),
        }
        .map(drop)
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s.trim() {
            "seen" => Self::MarkSeen,
            "unseen" => Self::MarkUnseen,
            "flag" => Self::Flag,
            "unflag" => Self::Unflag,
            "trash" => Self::Trash,
            other => bail!("unknown action {other:?}"),
        })
    }
}

/// Parses a comma-separated action list such as `seen,flag,trash`.
///
/// # Errors
///
/// Returns an error naming the first unknown action.
pub fn parse_actions(list: &str) -> anyhow::Result<Vec<Action>> {
    list.split(',')
        .filter(|item| !item.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Applies `actions` to every message addressed to `recipient`.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Recipient address to match.
    pub recipient: String,
    /// Actions in the order they are queued.
    pub actions: Vec<Action>,
}

impl Rule {
    /// Creates a rule.
    #[must_use]
    pub fn new(recipient: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            recipient: recipient.into(),
            actions,
        }
    }

    /// Creates a rule that marks matches read, flags them and trashes them.
    #[must_use]
    pub fn read_flag_and_trash(recipient: impl Into<String>) -> Self {
        Self::new(recipient, vec![Action::MarkSeen, Action::Flag, Action::Trash])
    }

    /// Returns true if the rule applies to `message`.
    #[must_use]
    pub fn matches(&self, message: &MessageRecord) -> bool {
        message.is_addressed_to(&self.recipient)
    }

    /// Queues the rule's actions for every matching message.
    ///
    /// Returns the number of messages matched.
    ///
    /// # Errors
    ///
    /// Returns the first error from queueing an action.
    pub fn apply<T: Transport>(&self, client: &JmapClient<T>) -> jmapfilter::Result<usize> {
        let catalog = client.catalog();
        let mut matched = 0;
        for message in catalog.messages().iter().filter(|m| self.matches(m)) {
            for action in &self.actions {
                action.queue(client, message)?;
            }
            matched += 1;
        }
        Ok(matched)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jmapfilter::EmailAddress;

    fn message(to: &str) -> MessageRecord {
        MessageRecord {
            id: "e1".into(),
            to: Some(vec![EmailAddress {
                name: None,
                email: to.into(),
            }]),
            from: None,
            subject: None,
            mailbox_ids: std::collections::HashMap::new(),
            keywords: std::collections::HashMap::new(),
            received_at: None,
        }
    }

    #[test]
    fn test_rule_matches_recipient() {
        let rule = Rule::read_flag_and_trash("me+test@example.com");
        assert!(rule.matches(&message("me+test@example.com")));
        assert!(!rule.matches(&message("me@example.com")));
        assert_eq!(
            rule.actions,
            vec![Action::MarkSeen, Action::Flag, Action::Trash]
        );
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(
            parse_actions("seen, unflag,trash").unwrap(),
            vec![Action::MarkSeen, Action::Unflag, Action::Trash]
        );
        assert_eq!(
            parse_actions("unseen,flag,").unwrap(),
            vec![Action::MarkUnseen, Action::Flag]
        );
        assert!(parse_actions("seen,archive").is_err());
    }
}
