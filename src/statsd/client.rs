use std::cell::RefCell;
use std::fmt::Display;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use thread_local::ThreadLocal;
use tracing::{debug, warn};

use super::batch::Batch;
use super::line::{compose_line, normalize_name, Decorations, MetricType};
use super::sampling::{sampled, RandomSource, ThreadRandom, FULL_SAMPLE_RATE};
use super::transport::{Transport, TransportFactory, UdpTransportFactory};
use super::value::IntoStatValue;
use super::Delivery;
use crate::MetricResult;

/// Collector host used when none (or an empty one) is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Collector port used when none (or zero) is configured.
pub const DEFAULT_PORT: u16 = 8125;
/// Number of stat lines a batch holds before it flushes.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Trait defining the metric surface shared by [`Client`] and [`Batch`].
///
/// Implementors only decide what happens to a finished stat line
/// ([`Metrics::emit`]); formatting, validation and sampling are provided.
pub trait Metrics {
    /// The client whose settings decorate every stat line.
    fn client(&self) -> &Client;

    /// Delivers a fully formatted stat line.
    fn emit(&self, line: String) -> Option<Delivery>;

    /// Increments a counter by one.
    fn increment<S: Display>(&self, stat: S) -> Option<Delivery> {
        self.increment_sampled(stat, FULL_SAMPLE_RATE)
    }

    /// Increments a counter by one, sent with probability `sample_rate`.
    fn increment_sampled<S: Display>(&self, stat: S, sample_rate: f64) -> Option<Delivery> {
        record(self, stat, Some(1), MetricType::Counter, sample_rate)
    }

    /// Decrements a counter by one.
    fn decrement<S: Display>(&self, stat: S) -> Option<Delivery> {
        self.decrement_sampled(stat, FULL_SAMPLE_RATE)
    }

    /// Decrements a counter by one, sent with probability `sample_rate`.
    fn decrement_sampled<S: Display>(&self, stat: S, sample_rate: f64) -> Option<Delivery> {
        record(self, stat, Some(-1), MetricType::Counter, sample_rate)
    }

    /// Records an absolute gauge value.
    fn gauge<S: Display>(&self, stat: S, value: i64) -> Option<Delivery> {
        self.gauge_sampled(stat, value, FULL_SAMPLE_RATE)
    }

    /// Records an absolute gauge value, sent with probability `sample_rate`.
    fn gauge_sampled<S: Display>(&self, stat: S, value: i64, sample_rate: f64) -> Option<Delivery> {
        record(self, stat, Some(i128::from(value)), MetricType::Gauge, sample_rate)
    }

    /// Records a duration in milliseconds.
    fn timer<S: Display>(&self, stat: S, ms: u64) -> Option<Delivery> {
        self.timer_sampled(stat, ms, FULL_SAMPLE_RATE)
    }

    /// Records a duration in milliseconds, sent with probability `sample_rate`.
    fn timer_sampled<S: Display>(&self, stat: S, ms: u64, sample_rate: f64) -> Option<Delivery> {
        record(self, stat, Some(i128::from(ms)), MetricType::Timer, sample_rate)
    }

    /// Runs `operation`, records how long it took and returns its result.
    fn timed<S: Display, T>(&self, stat: S, operation: impl FnOnce() -> T) -> T {
        self.timed_sampled(stat, FULL_SAMPLE_RATE, operation)
    }

    /// Like [`Metrics::timed`], with the timer sent with probability `sample_rate`.
    ///
    /// The result of `operation` is returned whether or not the timer was sent.
    fn timed_sampled<S: Display, T>(
        &self,
        stat: S,
        sample_rate: f64,
        operation: impl FnOnce() -> T,
    ) -> T {
        let start = Instant::now();
        let result = operation();
        self.timer_sampled(stat, elapsed_millis(start.elapsed()), sample_rate);
        result
    }

    /// Validates `value`, formats the stat line and delivers it when sampled.
    ///
    /// # Errors
    /// Returns [`crate::MetricsError::InvalidArgument`] when `value` is
    /// neither an integer nor absent. Network failures are never returned.
    fn send_stats<S: Display, V: IntoStatValue>(
        &self,
        stat: S,
        value: V,
        metric_type: MetricType,
        sample_rate: f64,
    ) -> MetricResult<Option<Delivery>> {
        let value = value.into_stat_value()?;
        Ok(record(self, stat, value, metric_type, sample_rate))
    }
}

fn record<M, S>(
    metrics: &M,
    stat: S,
    value: Option<i128>,
    metric_type: MetricType,
    sample_rate: f64,
) -> Option<Delivery>
where
    M: Metrics + ?Sized,
    S: Display,
{
    let client = metrics.client();
    if !client.is_sampled(sample_rate) {
        return None;
    }
    let line = client.compose(&normalize_name(stat), value, metric_type, sample_rate);
    metrics.emit(line)
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from((elapsed.as_micros() + 500) / 1000).unwrap_or(u64::MAX)
}

/// Configuration options for a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Collector host name or IP literal. Stored as given, resolved per send.
    pub host: String,
    /// Collector UDP port.
    pub port: u16,
    /// Prefix joined to every stat name with a `.`.
    pub namespace: Option<String>,
    /// Suffix joined to every stat name with a `.`.
    pub postfix: Option<String>,
    /// Default number of lines a [`Batch`] buffers before flushing.
    pub batch_size: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            namespace: None,
            postfix: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug)]
struct Settings {
    host: String,
    port: u16,
    namespace: Option<String>,
    postfix: Option<String>,
    batch_size: usize,
}

impl From<ClientOptions> for Settings {
    fn from(options: ClientOptions) -> Self {
        Self {
            host: host_or_default(Some(&options.host)),
            port: port_or_default(Some(options.port)),
            namespace: non_empty(options.namespace.as_deref()),
            postfix: non_empty(options.postfix.as_deref()),
            batch_size: options.batch_size.max(1),
        }
    }
}

fn host_or_default(host: Option<&str>) -> String {
    non_empty(host).unwrap_or_else(|| DEFAULT_HOST.to_string())
}

fn port_or_default(port: Option<u16>) -> u16 {
    port.filter(|port| *port != 0).unwrap_or(DEFAULT_PORT)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(str::to_string)
}

/// A transport together with the thread it was created for.
///
/// `ThreadLocal` hands the slot of an exited thread to the next new thread
/// without dropping its value, so ownership is checked on every send.
struct OwnedTransport {
    owner: ThreadId,
    transport: Box<dyn Transport + Send>,
}

/// A StatsD client sending each stat line as a UDP datagram.
///
/// Every thread that sends through a client gets its own transport, created
/// on first use. A transport is never handed to another thread: one left by
/// an exited thread is dropped when its slot is reused. Network errors are
/// logged and swallowed: metrics never fail the caller.
///
/// This type is `Send + Sync` and can be shared across threads via `Arc<Client>`.
///
/// # Example
///
/// ```no_run
/// use metricsd::{Client, ClientOptions, Metrics};
///
/// let client = Client::new(ClientOptions {
///     namespace: Some("myapp".to_string()),
///     ..ClientOptions::default()
/// });
///
/// client.increment("requests");
/// client.gauge("connections.active", 12);
/// let rows = client.timed("db.query", || 42);
/// assert_eq!(rows, 42);
///
/// client.batch(|batch| {
///     batch.increment("jobs.started");
///     batch.timer("jobs.duration", 320);
/// });
/// ```
pub struct Client {
    settings: RwLock<Settings>,
    transports: ThreadLocal<RefCell<Option<OwnedTransport>>>,
    transport_factory: Box<dyn TransportFactory>,
    random: Box<dyn RandomSource>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("settings", &*self.settings.read())
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl Client {
    /// Creates a client sending over UDP.
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        Self::with_transport_factory(options, UdpTransportFactory)
    }

    /// Creates a client whose per-thread transports come from `factory`.
    #[must_use]
    pub fn with_transport_factory(
        options: ClientOptions,
        factory: impl TransportFactory + 'static,
    ) -> Self {
        Self {
            settings: RwLock::new(options.into()),
            transports: ThreadLocal::new(),
            transport_factory: Box::new(factory),
            random: Box::new(ThreadRandom),
        }
    }

    /// Replaces the random source used for sampling decisions.
    #[must_use]
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    /// Collector host, exactly as configured.
    #[must_use]
    pub fn host(&self) -> String {
        self.settings.read().host.clone()
    }

    /// Sets the collector host. `None` or `""` restores [`DEFAULT_HOST`].
    pub fn set_host<'a>(&self, host: impl Into<Option<&'a str>>) {
        self.settings.write().host = host_or_default(host.into());
    }

    /// Collector port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.settings.read().port
    }

    /// Sets the collector port. `None` or `0` restores [`DEFAULT_PORT`].
    pub fn set_port(&self, port: impl Into<Option<u16>>) {
        self.settings.write().port = port_or_default(port.into());
    }

    /// Current namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        self.settings.read().namespace.clone()
    }

    /// Sets the namespace. `None` or `""` clears it.
    pub fn set_namespace<'a>(&self, namespace: impl Into<Option<&'a str>>) {
        self.settings.write().namespace = non_empty(namespace.into());
    }

    /// Current postfix, if any.
    #[must_use]
    pub fn postfix(&self) -> Option<String> {
        self.settings.read().postfix.clone()
    }

    /// Sets the postfix. `None` or `""` clears it.
    pub fn set_postfix<'a>(&self, postfix: impl Into<Option<&'a str>>) {
        self.settings.write().postfix = non_empty(postfix.into());
    }

    /// Default size of batches opened on this client.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.settings.read().batch_size
    }

    /// Sets the default batch size. Values below 1 are raised to 1.
    pub fn set_batch_size(&self, batch_size: usize) {
        self.settings.write().batch_size = batch_size.max(1);
    }

    /// Runs `scope` with a batch over this client and flushes it afterwards.
    ///
    /// The final flush also happens when `scope` unwinds.
    pub fn batch<T>(&self, scope: impl FnOnce(&Batch<'_>) -> T) -> T {
        let batch = Batch::new(self);
        scope(&batch)
    }

    pub(crate) fn is_sampled(&self, sample_rate: f64) -> bool {
        sampled(sample_rate, self.random.as_ref())
    }

    pub(crate) fn compose(
        &self,
        stat: &str,
        value: Option<i128>,
        metric_type: MetricType,
        sample_rate: f64,
    ) -> String {
        let settings = self.settings.read();
        let decorations = Decorations {
            namespace: settings.namespace.as_deref(),
            postfix: settings.postfix.as_deref(),
        };
        compose_line(decorations, stat, value, metric_type, sample_rate)
    }

    /// Writes `payload` as one datagram through the calling thread's transport.
    ///
    /// Returns the number of bytes written, or `None` when sending failed.
    pub(crate) fn send_datagram(&self, payload: &str) -> Option<usize> {
        debug!("Metrics: {payload}");
        let (host, port) = {
            let settings = self.settings.read();
            (settings.host.clone(), settings.port)
        };
        match self.transmit(payload.as_bytes(), &host, port) {
            Ok(sent) => Some(sent),
            Err(err) => {
                warn!("Metrics: {err}");
                None
            }
        }
    }

    fn transmit(&self, payload: &[u8], host: &str, port: u16) -> MetricResult<usize> {
        let mut slot = self.transports.get_or_default().borrow_mut();
        let owner = thread::current().id();
        // a transport left behind by a finished thread is dropped, never reused
        let cached = match slot.take() {
            Some(cached) if cached.owner == owner => cached,
            _ => OwnedTransport {
                owner,
                transport: self.transport_factory.create()?,
            },
        };
        let cached = slot.insert(cached);
        Ok(cached.transport.send_to(payload, host, port)?)
    }
}

impl Metrics for Client {
    fn client(&self) -> &Client {
        self
    }

    fn emit(&self, line: String) -> Option<Delivery> {
        self.send_datagram(&line).map(Delivery::Sent)
    }
}
