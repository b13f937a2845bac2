//! Lifecycle tests combining the channel state machine with the
//! subscription registry, the way a driver wires them together.

use std::sync::{Arc, Mutex, PoisonError};

use palaver_client::{ChannelAction, ChannelClient, Credential, Subscriptions};
use palaver_proto::{EventKind, InboundEvent, OutboundEvent};

/// Collects delivered events behind a shared handle.
#[derive(Clone, Default)]
struct Sink(Arc<Mutex<Vec<InboundEvent>>>);

impl Sink {
    fn push(&self, event: InboundEvent) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }

    fn take(&self) -> Vec<InboundEvent> {
        std::mem::take(&mut self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn deliver(subs: &mut Subscriptions, actions: Vec<ChannelAction>) {
    for action in actions {
        if let ChannelAction::Deliver(event) = action {
            subs.dispatch(event);
        }
    }
}

#[test]
fn registry_survives_reconnect_without_duplicate_delivery() {
    let mut channel = ChannelClient::new();
    channel.configure_auth(Credential::new("tok"));

    // Registered once at startup, never again.
    let sink = Sink::default();
    let mut subs = Subscriptions::new();
    let seen = sink.clone();
    subs.on(EventKind::Typing, move |event| seen.push(event));

    let _ = channel.connect().unwrap();
    let _ = channel.transport_opened();

    let frame = r#"{"event":"typing","data":{"user":"bob"}}"#;
    deliver(&mut subs, channel.handle_frame(frame).unwrap());
    assert_eq!(sink.take().len(), 1);

    // Drop and reopen the transport; the registry is untouched.
    let _ = channel.transport_closed();
    let _ = channel.transport_opened();

    deliver(&mut subs, channel.handle_frame(frame).unwrap());
    assert_eq!(sink.take().len(), 1, "one frame, one delivery after reconnect");
}

#[test]
fn reconnect_presents_current_credential_each_time() {
    let mut channel = ChannelClient::new();
    channel.configure_auth(Credential::new("first"));
    let _ = channel.connect().unwrap();
    let _ = channel.transport_opened();

    // A fresh login swapped the credential while the transport was up.
    channel.configure_auth(Credential::new("second"));

    let actions = channel.transport_closed();
    assert_eq!(actions, vec![ChannelAction::Open { token: "second".into() }]);
    assert_eq!(channel.auth_token(), Some("second"));
}

#[test]
fn sends_between_drop_and_reopen_are_lost_not_queued() {
    let mut channel = ChannelClient::new();
    channel.configure_auth(Credential::new("tok"));
    let _ = channel.connect().unwrap();
    let _ = channel.transport_opened();
    let _ = channel.transport_closed();

    // Best-effort delivery: nothing is buffered while reconnecting.
    assert!(channel.emit(OutboundEvent::Message { message: "hi".into(), room: "general".into() })
        .is_empty());

    let _ = channel.transport_opened();
    assert_eq!(
        channel.emit(OutboundEvent::Typing { room: "general".into() }).len(),
        1,
        "sends resume once the transport is open again"
    );
}
