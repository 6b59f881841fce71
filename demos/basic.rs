//! Basic usage of every metric type plus a batch.
//!
//! Run with: `cargo run --example basic`, with a StatsD collector (or
//! `nc -ul 8125`) listening on 127.0.0.1:8125.

use metricsd::{Client, ClientOptions, Metrics};
use std::thread;
use std::time::Duration;

fn main() {
    let client = Client::new(ClientOptions {
        namespace: Some("myapp".to_string()),
        ..ClientOptions::default()
    });

    // Counter — +1 / -1
    client.increment("request.count");
    client.decrement("workers.idle");

    // Sampled counter — sent about one time in ten, tagged `|@0.1`
    client.increment_sampled("cache.lookup", 0.1);

    // Gauge — absolute value, may be negative
    client.gauge("connections.active", 100);
    client.gauge("balance.delta", -7);

    // Timer — explicit milliseconds, or measured around a closure
    client.timer("request.latency", 42);
    let rows = client.timed("db.query", || {
        thread::sleep(Duration::from_millis(15));
        3
    });
    println!("query returned {rows} rows");

    // Batch — three datagrams of up to four lines each
    client.batch(|batch| {
        batch.set_batch_size(4);
        for i in 0..10 {
            batch.gauge("queue.depth", i);
        }
    });

    println!("All metric types sent.");
}
