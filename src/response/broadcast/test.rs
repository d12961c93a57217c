use super::*;

fn client() -> (Client, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Client::new(tx), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Message> {
    let mut received = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        received.push(msg);
    }
    received
}

#[test]
fn every_open_client_gets_every_payload_in_order() {
    let broadcaster = Broadcaster::new();
    let (a, mut a_rx) = client();
    let (b, mut b_rx) = client();
    broadcaster.register(a);
    broadcaster.register(b);

    let payloads = vec![
        Message::text("one"),
        Message::binary(vec![2_u8, 2, 2]),
        Message::text("three"),
    ];
    for msg in &payloads {
        assert_eq!(broadcaster.broadcast(msg), 2);
    }

    assert_eq!(drain(&mut a_rx), payloads);
    assert_eq!(drain(&mut b_rx), payloads);
}

#[test]
fn unregistered_clients_receive_nothing_further() {
    let broadcaster = Broadcaster::new();
    let (a, mut a_rx) = client();
    let (b, mut b_rx) = client();
    let a_id = a.id();
    broadcaster.register(a);
    broadcaster.register(b);

    broadcaster.broadcast(&Message::text("before"));
    assert_eq!(broadcaster.unregister(a_id), 1);
    assert_eq!(broadcaster.broadcast(&Message::text("after")), 1);

    assert_eq!(drain(&mut a_rx), vec![Message::text("before")]);
    assert_eq!(
        drain(&mut b_rx),
        vec![Message::text("before"), Message::text("after")]
    );
}

#[test]
fn closed_clients_are_skipped_but_kept() {
    let broadcaster = Broadcaster::new();
    let (a, a_rx) = client();
    let (b, mut b_rx) = client();
    broadcaster.register(a);
    broadcaster.register(b);
    drop(a_rx);

    assert_eq!(broadcaster.broadcast(&Message::text("hi")), 1);
    assert_eq!(broadcaster.client_count(), 2);
    assert_eq!(drain(&mut b_rx), vec![Message::text("hi")]);
}

#[test]
fn count_tracks_register_and_unregister() {
    let broadcaster = Broadcaster::new();
    assert_eq!(broadcaster.client_count(), 0);

    let (a, _a_rx) = client();
    let (b, _b_rx) = client();
    let (a_id, b_id) = (a.id(), b.id());
    assert_eq!(broadcaster.register(a), 1);
    assert_eq!(broadcaster.register(b), 2);
    assert_eq!(broadcaster.client_count(), 2);

    assert_eq!(broadcaster.unregister(a_id), 1);
    assert_eq!(broadcaster.unregister(a_id), 1);
    assert_eq!(broadcaster.unregister(b_id), 0);
    assert_eq!(broadcaster.client_count(), 0);
}

#[test]
fn broadcast_with_no_clients_is_a_no_op() {
    let broadcaster = Broadcaster::new();
    assert_eq!(broadcaster.broadcast(&Message::text("into the void")), 0);
}
