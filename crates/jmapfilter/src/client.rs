//! JMAP client: session bootstrap, call execution and batched mutations.
//!
//! ```text
//! discover() ──→ bootstrap_mailboxes() ──→ bootstrap_messages()
//!                                                │
//!            mark_seen() / flag() / move_to_trash() ...
//!                                                │
//!                                             flush()
//! ```
//!
//! Bootstrap calls take `&mut self` and swap in a fresh [`Catalog`]
//! snapshot. Mutation builders and [`JmapClient::flush`] take `&self`; the
//! batch is guarded by one lock and a flush takes the whole batch under it,
//! so a call queued while a flush is in flight goes into the next batch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::batch::MutationBatch;
use crate::call_id::CallIdGenerator;
use crate::catalog::{Catalog, MailboxRole};
use crate::config::Config;
use crate::envelope::{self, MethodCall};
use crate::error::{Error, Result};
use crate::methods::{
    self, EMAIL_GET, EMAIL_SET, KEYWORD_FLAGGED, KEYWORD_SEEN, MAILBOX_GET, Patch,
};
use crate::response::{MethodResponse, Response, find_response};
use crate::session::{Session, SessionResource};
use crate::transport::{Credentials, HttpTransport, Transport};

/// A JMAP session for one user.
#[derive(Debug)]
pub struct JmapClient<T = HttpTransport> {
    config: Config,
    credentials: Credentials,
    transport: T,
    session: Option<Session>,
    catalog: Arc<Catalog>,
    batch: Mutex<MutationBatch>,
}

impl JmapClient<HttpTransport> {
    /// Connects over HTTP and runs the full bootstrap.
    ///
    /// Equivalent to [`JmapClient::new`] followed by [`JmapClient::bootstrap`].
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or any bootstrap call fails.
    pub async fn connect(config: Config, credentials: Credentials) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        let mut client = Self::new(config, credentials, transport);
        client.bootstrap().await?;
        Ok(client)
    }
}

impl<T: Transport> JmapClient<T> {
    /// Creates an unconnected client.
    #[must_use]
    pub fn new(config: Config, credentials: Credentials, transport: T) -> Self {
        Self {
            config,
            credentials,
            transport,
            session: None,
            catalog: Arc::new(Catalog::default()),
            batch: Mutex::new(MutationBatch::new()),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the resolved session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before a successful discovery.
    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotConnected)
    }

    /// Returns true once discovery has resolved the account.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the current catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    // ========================================================================
    // Session bootstrap
    // ========================================================================

    /// Fetches the discovery document and resolves the user's account.
    ///
    /// On failure the session is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the request fails or the document is
    /// malformed, and [`Error::AccountNotFound`] if no account is named
    /// after the username.
    pub async fn discover(&mut self) -> Result<&Session> {
        let document = self
            .transport
            .get(self.config.discovery_url.as_str(), &self.credentials)
            .await
            .map_err(|e| Error::Discovery(Box::new(e)))?;

        let resource = SessionResource::from_value(document)?;
        let session = Session::resolve(&resource, self.credentials.username())?;
        info!(
            account_id = %session.account_id,
            api_url = %session.api_url,
            "JMAP session established"
        );

        Ok(&*self.session.insert(session))
    }

    /// Fetches every mailbox into the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery, a transport error if
    /// the request fails, and a protocol error if the reply has no
    /// `Mailbox/get` list.
    pub async fn bootstrap_mailboxes(&mut self) -> Result<()> {
        let account_id = self.session()?.account_id.clone();
        let mut ids = CallIdGenerator::default();

        let responses = self
            .execute(&[methods::mailbox_get(&account_id, ids.next_id())])
            .await?;
        let list = find_response(&responses, MAILBOX_GET)?.list()?;

        self.catalog = Arc::new(self.catalog.with_mailbox_list(list)?);
        debug!(count = self.catalog.mailboxes().len(), "Cached mailboxes");
        Ok(())
    }

    /// Fetches up to `limit` messages in `mailbox_id` into the catalog.
    ///
    /// The query and the get travel in one request; the get takes its ids
    /// from the query result by reference.
    ///
    /// # Errors
    ///
    /// Same as [`JmapClient::bootstrap_mailboxes`], with `Email/get` as the
    /// expected method.
    pub async fn bootstrap_messages(&mut self, mailbox_id: &str, limit: u32) -> Result<()> {
        let account_id = self.session()?.account_id.clone();
        let mut ids = CallIdGenerator::default();

        let query = methods::email_query(&account_id, mailbox_id, limit, ids.next_id());
        let get = methods::email_get_from_query(&account_id, &query, ids.next_id());

        let responses = self.execute(&[query, get]).await?;
        let list = find_response(&responses, EMAIL_GET)?.list()?;

        self.catalog = Arc::new(self.catalog.with_message_list(list)?);
        debug!(
            mailbox_id,
            count = self.catalog.messages().len(),
            "Cached messages"
        );
        Ok(())
    }

    /// Fetches up to `limit` inbox messages into the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MailboxNotFound`] if no cached mailbox has the inbox
    /// role, otherwise as [`JmapClient::bootstrap_messages`].
    pub async fn bootstrap_inbox(&mut self, limit: u32) -> Result<()> {
        let inbox = self
            .catalog
            .mailbox_by_role(&MailboxRole::Inbox)?
            .to_string();
        self.bootstrap_messages(&inbox, limit).await
    }

    /// Runs discovery, the mailbox bootstrap and the inbox bootstrap.
    ///
    /// # Errors
    ///
    /// Returns the first error from any step.
    pub async fn bootstrap(&mut self) -> Result<()> {
        self.discover().await?;
        self.bootstrap_mailboxes().await?;
        self.bootstrap_inbox(self.config.message_limit).await
    }

    // ========================================================================
    // Call execution
    // ========================================================================

    /// Sends `calls` in one request and returns the method responses as the
    /// server ordered them.
    ///
    /// Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery, a transport error if
    /// the request fails, and a protocol error if the reply is not a
    /// response envelope.
    pub async fn execute(&self, calls: &[MethodCall]) -> Result<Vec<MethodResponse>> {
        let session = self.session()?;
        let body = serde_json::to_value(envelope::wrap(calls))?;
        debug!(
            methods = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "Executing JMAP request"
        );

        let reply = self
            .transport
            .post(&session.api_url, &self.credentials, &body)
            .await?;
        let response: Response = serde_json::from_value(reply)?;
        Ok(response.method_responses)
    }

    // ========================================================================
    // Mutation batch
    // ========================================================================

    /// Queues adding `$seen` to a message.
    ///
    /// `message` is a [`crate::MessageRecord`] or a message id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery.
    pub fn mark_seen(&self, message: impl AsRef<str>) -> Result<MethodCall> {
        self.queue(message.as_ref(), &Patch::keyword(KEYWORD_SEEN, true))
    }

    /// Queues removing `$seen` from a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery.
    pub fn mark_unseen(&self, message: impl AsRef<str>) -> Result<MethodCall> {
        self.queue(message.as_ref(), &Patch::keyword(KEYWORD_SEEN, false))
    }

    /// Queues adding `$flagged` to a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery.
    pub fn flag(&self, message: impl AsRef<str>) -> Result<MethodCall> {
        self.queue(message.as_ref(), &Patch::keyword(KEYWORD_FLAGGED, true))
    }

    /// Queues removing `$flagged` from a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery.
    pub fn unflag(&self, message: impl AsRef<str>) -> Result<MethodCall> {
        self.queue(message.as_ref(), &Patch::keyword(KEYWORD_FLAGGED, false))
    }

    /// Queues moving a message to the trash.
    ///
    /// This replaces the message's mailbox membership; it leaves every other
    /// mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery, and
    /// [`Error::MailboxNotFound`] if no cached mailbox has the trash role.
    pub fn move_to_trash(&self, message: impl AsRef<str>) -> Result<MethodCall> {
        self.session()?;
        let trash = self.catalog.mailbox_by_role(&MailboxRole::Trash)?;
        let patch = Patch::MailboxIds(vec![trash.to_string()]);
        self.queue(message.as_ref(), &patch)
    }

    /// Queues replacing a message's mailbox membership with `mailbox_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before discovery.
    pub fn move_to_mailboxes<I, S>(
        &self,
        message: impl AsRef<str>,
        mailbox_ids: I,
    ) -> Result<MethodCall>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = mailbox_ids.into_iter().map(Into::into).collect();
        self.queue(message.as_ref(), &Patch::MailboxIds(ids))
    }

    /// Returns a copy of the pending calls in queue order.
    #[must_use]
    pub fn pending(&self) -> Vec<MethodCall> {
        self.lock_batch().pending().to_vec()
    }

    /// Returns the number of pending calls.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock_batch().len()
    }

    /// Sends every pending call in one request and empties the batch.
    ///
    /// The batch is emptied whether or not the request succeeds. An empty
    /// batch returns no responses without contacting the server. Per-message
    /// rejections are reported inside the `Email/set` responses; see
    /// [`crate::set_responses`].
    ///
    /// # Errors
    ///
    /// Same as [`JmapClient::execute`].
    pub async fn flush(&self) -> Result<Vec<MethodResponse>> {
        let calls = self.lock_batch().take();
        if calls.is_empty() {
            debug!("Mutation batch empty, nothing to flush");
            return Ok(Vec::new());
        }

        info!(count = calls.len(), "Flushing mutation batch");
        let responses = self.execute(&calls).await?;

        for response in responses.iter().filter(|r| r.name == EMAIL_SET) {
            match response.set_response() {
                Ok(set) => {
                    for (id, error) in &set.not_updated {
                        warn!(message_id = %id, error = %error.error_type, "Update rejected");
                    }
                }
                Err(e) => warn!(call_id = %response.call_id, ?e, "Unreadable Email/set response"),
            }
        }
        for response in responses.iter().filter(|r| r.is_error()) {
            warn!(call_id = %response.call_id, result = %response.result, "Method error");
        }

        Ok(responses)
    }

    fn queue(&self, message_id: &str, patch: &Patch) -> Result<MethodCall> {
        let account_id = &self.session()?.account_id;
        Ok(self.lock_batch().push(account_id, message_id, patch))
    }

    fn lock_batch(&self) -> MutexGuard<'_, MutationBatch> {
        self.batch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
