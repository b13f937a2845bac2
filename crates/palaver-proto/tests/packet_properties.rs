//! Property-based tests for packet encoding.
//!
//! Room names and message bodies are user-controlled strings; these tests
//! verify that arbitrary content (quotes, unicode, control characters)
//! survives the JSON envelope intact.

use palaver_proto::{InboundEvent, OutboundEvent, Packet};
use proptest::prelude::*;

proptest! {
    #[test]
    fn outbound_message_survives_encode_decode(
        message in ".*",
        room in "[a-zA-Z0-9 _-]{1,32}",
    ) {
        let packet = OutboundEvent::Message {
            message: message.clone(),
            room: room.clone(),
        }
        .into_packet();

        let decoded = Packet::decode(&packet.encode().unwrap()).unwrap();
        prop_assert_eq!(&decoded.event, "message");
        prop_assert_eq!(decoded.data["message"].as_str(), Some(message.as_str()));
        prop_assert_eq!(decoded.data["room"].as_str(), Some(room.as_str()));
    }

    #[test]
    fn join_and_leave_carry_room_verbatim(room in ".+") {
        for event in [
            OutboundEvent::Join { room: room.clone() },
            OutboundEvent::Leave { room: room.clone() },
            OutboundEvent::Typing { room: room.clone() },
        ] {
            let decoded = Packet::decode(&event.into_packet().encode().unwrap()).unwrap();
            prop_assert_eq!(decoded.data["room"].as_str(), Some(room.as_str()));
        }
    }

    #[test]
    fn inbound_decode_never_panics(raw in ".*") {
        if let Ok(packet) = Packet::decode(&raw) {
            let _ = InboundEvent::from_packet(&packet);
        }
    }
}
