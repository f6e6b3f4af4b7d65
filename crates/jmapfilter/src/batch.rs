//! Accumulated `Email/set` calls awaiting a single flush.
//!
//! Each queued call updates one message and carries its own call-id, so
//! responses can be matched back to the mutation that caused them.

use crate::call_id::CallIdGenerator;
use crate::envelope::MethodCall;
use crate::methods::{self, Patch};

/// Prefix for mutation call-ids.
pub const MUTATION_PREFIX: char = 'm';

/// Ordered list of pending mutations.
#[derive(Debug, Clone)]
pub struct MutationBatch {
    calls: Vec<MethodCall>,
    ids: CallIdGenerator,
}

impl MutationBatch {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: Vec::new(),
            ids: CallIdGenerator::new(MUTATION_PREFIX),
        }
    }

    /// Queues an update of `message_id` and returns the queued call.
    pub fn push(&mut self, account_id: &str, message_id: &str, patch: &Patch) -> MethodCall {
        let call = methods::email_set_update(account_id, message_id, patch, self.ids.next_id());
        self.calls.push(call.clone());
        call
    }

    /// Removes and returns every pending call, leaving the batch empty.
    pub fn take(&mut self) -> Vec<MethodCall> {
        self.ids.reset();
        std::mem::take(&mut self.calls)
    }

    /// Returns the pending calls in queue order.
    #[must_use]
    pub fn pending(&self) -> &[MethodCall] {
        &self.calls
    }

    /// Returns the number of pending calls.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl Default for MutationBatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::methods::KEYWORD_SEEN;

    #[test]
    fn test_push_assigns_unique_call_ids() {
        let mut batch = MutationBatch::new();
        let seen = Patch::keyword(KEYWORD_SEEN, true);

        let first = batch.push("A1", "e1", &seen);
        let second = batch.push("A1", "e2", &seen);

        assert_eq!(first.call_id, "m0");
        assert_eq!(second.call_id, "m1");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.pending()[1], second);
    }

    #[test]
    fn test_take_empties_and_restarts_ids() {
        let mut batch = MutationBatch::new();
        let patch = Patch::MailboxIds(vec!["M1".into()]);
        batch.push("A1", "e1", &patch);
        batch.push("A1", "e2", &patch);

        let calls = batch.take();
        assert_eq!(calls.len(), 2);
        assert!(batch.is_empty());
        assert_eq!(batch.push("A1", "e3", &patch).call_id, "m0");
    }
}
