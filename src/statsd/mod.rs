pub mod batch;
pub mod client;
mod line;
pub mod sampling;
pub mod transport;
pub mod value;

pub use line::MetricType;

/// What became of a stat line that passed sampling.
///
/// This is not a delivery receipt: UDP gives none, and a failed send
/// yields `None` exactly like a sampling miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written to the socket as a datagram of this many bytes.
    Sent(usize),
    /// Appended to a batch buffer, to be sent on its next flush.
    Queued,
}
