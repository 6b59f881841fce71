use metricsd::{Client, ClientOptions, Metrics};
use std::net::UdpSocket;
use std::time::Duration;

/// Binds a receiver on `addr` with an ephemeral port.
fn bind_receiver(addr: &str) -> Option<(UdpSocket, u16)> {
    let socket = UdpSocket::bind(addr).ok()?;
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("set_read_timeout failed");
    let port = socket.local_addr().ok()?.port();
    Some((socket, port))
}

fn recv_text(socket: &UdpSocket) -> String {
    let mut buf = [0; 1500];
    let (number_of_bytes, _) = socket.recv_from(&mut buf).expect("Expected udp message");
    String::from_utf8(buf[..number_of_bytes].to_vec()).unwrap()
}

fn create_udp_client(host: &str, port: u16) -> Client {
    Client::new(ClientOptions {
        host: host.to_string(),
        port,
        ..ClientOptions::default()
    })
}

#[test]
fn test_send_over_ipv4_socket() {
    let (receiver, port) = bind_receiver("127.0.0.1:0").expect("couldn't bind to address");
    let client = create_udp_client("127.0.0.1", port);

    client.increment("foobar");
    assert_eq!(recv_text(&receiver), "foobar:1|c");
}

#[test]
fn test_send_over_ipv6_socket() {
    // Hosts without an IPv6 loopback cannot run this.
    let Some((receiver, port)) = bind_receiver("[::1]:0") else {
        return;
    };
    let client = create_udp_client("::1", port);

    client.increment("foobar");
    assert_eq!(recv_text(&receiver), "foobar:1|c");
}

#[test]
fn test_batch_over_udp_socket() {
    let (receiver, port) = bind_receiver("127.0.0.1:0").expect("couldn't bind to address");
    let client = create_udp_client("127.0.0.1", port);
    client.set_namespace("svc");

    client.batch(|batch| {
        batch.increment("a");
        batch.gauge("b", 5);
        batch.timer("c", 9);
    });
    assert_eq!(recv_text(&receiver), "svc.a:1|c\nsvc.b:5|g\nsvc.c:9|ms");
}

#[test]
fn test_port_change_takes_effect_on_same_thread() {
    let (first, first_port) = bind_receiver("127.0.0.1:0").expect("couldn't bind to address");
    let (second, second_port) = bind_receiver("127.0.0.1:0").expect("couldn't bind to address");
    let client = create_udp_client("127.0.0.1", first_port);

    client.increment("first");
    assert_eq!(recv_text(&first), "first:1|c");

    client.set_port(second_port);
    client.increment("second");
    assert_eq!(recv_text(&second), "second:1|c");
}

#[test]
fn test_unreachable_collector_does_not_fail_caller() {
    let client = create_udp_client("host.invalid.", 8125);
    assert_eq!(client.increment("foobar"), None);
}
