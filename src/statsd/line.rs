use std::fmt::Display;

use super::sampling::FULL_SAMPLE_RATE;

/// The StatsD metric type carried after the `|` of a stat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// Counter delta, `c`.
    Counter,
    /// Absolute gauge value, `g`.
    Gauge,
    /// Duration in milliseconds, `ms`.
    Timer,
}

impl MetricType {
    /// Wire suffix for this metric type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "c",
            Self::Gauge => "g",
            Self::Timer => "ms",
        }
    }
}

impl Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders `stat` and rewrites it into a name the collector accepts.
///
/// Path delimiters (`::`) become graphite package separators (`.`) and the
/// StatsD reserved characters become `_`.
pub(crate) fn normalize_name(stat: impl Display) -> String {
    stat.to_string()
        .replace("::", ".")
        .chars()
        .map(|c| match c {
            '/' | '@' | ':' | '|' => '_',
            other => other,
        })
        .collect()
}

/// Namespace and postfix applied around every stat name.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Decorations<'a> {
    pub namespace: Option<&'a str>,
    pub postfix: Option<&'a str>,
}

pub(crate) fn compose_line(
    decorations: Decorations<'_>,
    stat: &str,
    value: Option<i128>,
    metric_type: MetricType,
    sample_rate: f64,
) -> String {
    // namespace + '.' + stat + '.' + postfix + ':' + value + '|' + type + '|@' + rate
    let mut line = String::with_capacity(
        decorations.namespace.map_or(0, |ns| ns.len() + 1)
            + stat.len()
            + decorations.postfix.map_or(0, |pf| pf.len() + 1)
            + 32,
    );

    if let Some(namespace) = decorations.namespace {
        line.push_str(namespace);
        line.push('.');
    }
    line.push_str(stat);
    if let Some(postfix) = decorations.postfix {
        line.push('.');
        line.push_str(postfix);
    }

    line.push(':');
    if let Some(value) = value {
        let mut buffer = itoa::Buffer::new();
        line.push_str(buffer.format(value));
    }
    line.push('|');
    line.push_str(metric_type.as_str());

    if sample_rate < FULL_SAMPLE_RATE {
        line.push_str("|@");
        line.push_str(&sample_rate.to_string());
    }
    line
}
