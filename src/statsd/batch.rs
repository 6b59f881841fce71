use std::cell::{Cell, RefCell};

use super::client::{Client, Metrics};
use super::Delivery;

/// Buffers stat lines of a [`Client`] and sends them as multi-line datagrams.
///
/// A flush happens as soon as the buffer holds `batch_size` lines, and once
/// more when the batch is dropped, so nothing buffered is lost at the end of
/// the scope.
///
/// Namespace, postfix, host and port setters write through to the wrapped
/// client. The batch size is the only setting local to the batch.
pub struct Batch<'c> {
    client: &'c Client,
    batch_size: Cell<usize>,
    backlog: RefCell<Vec<String>>,
}

impl std::fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("batch_size", &self.batch_size.get())
            .field("backlog", &self.backlog.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<'c> Batch<'c> {
    /// Opens a batch over `client`, starting from the client's batch size.
    #[must_use]
    pub fn new(client: &'c Client) -> Self {
        Self {
            client,
            batch_size: Cell::new(client.batch_size()),
            backlog: RefCell::new(Vec::with_capacity(client.batch_size())),
        }
    }

    /// Number of lines that triggers a flush.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Overrides the flush threshold for this batch only. Values below 1 are
    /// raised to 1.
    pub fn set_batch_size(&self, batch_size: usize) {
        self.batch_size.set(batch_size.max(1));
    }

    /// Number of buffered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backlog.borrow().len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backlog.borrow().is_empty()
    }

    /// Sends every buffered line as one `\n`-joined datagram.
    ///
    /// Does nothing on an empty buffer. The buffer is cleared even when the
    /// send fails.
    pub fn flush(&self) -> Option<usize> {
        let payload = {
            let mut backlog = self.backlog.borrow_mut();
            if backlog.is_empty() {
                return None;
            }
            let payload = backlog.join("\n");
            backlog.clear();
            payload
        };
        self.client.send_datagram(&payload)
    }

    /// Collector host of the wrapped client.
    #[must_use]
    pub fn host(&self) -> String {
        self.client.host()
    }

    /// Sets the host of the wrapped client.
    pub fn set_host<'a>(&self, host: impl Into<Option<&'a str>>) {
        self.client.set_host(host);
    }

    /// Collector port of the wrapped client.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.client.port()
    }

    /// Sets the port of the wrapped client.
    pub fn set_port(&self, port: impl Into<Option<u16>>) {
        self.client.set_port(port);
    }

    /// Namespace of the wrapped client.
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        self.client.namespace()
    }

    /// Sets the namespace of the wrapped client.
    pub fn set_namespace<'a>(&self, namespace: impl Into<Option<&'a str>>) {
        self.client.set_namespace(namespace);
    }

    /// Postfix of the wrapped client.
    #[must_use]
    pub fn postfix(&self) -> Option<String> {
        self.client.postfix()
    }

    /// Sets the postfix of the wrapped client.
    pub fn set_postfix<'a>(&self, postfix: impl Into<Option<&'a str>>) {
        self.client.set_postfix(postfix);
    }
}

impl Metrics for Batch<'_> {
    fn client(&self) -> &Client {
        self.client
    }

    fn emit(&self, line: String) -> Option<Delivery> {
        let full = {
            let mut backlog = self.backlog.borrow_mut();
            backlog.push(line);
            backlog.len() >= self.batch_size.get()
        };
        if full {
            self.flush();
        }
        Some(Delivery::Queued)
    }
}

impl Drop for Batch<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}
