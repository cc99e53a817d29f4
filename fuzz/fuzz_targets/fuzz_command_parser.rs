//! Fuzz target: `parse_command` and the inbound event path.
//!
//! Feeds arbitrary text through `Event::text` and the command parser and
//! asserts neither panics and only known actions become commands.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use aquanode::app::commands::{InboundCommand, parse_command};
use aquanode::error::LinkError;
use aquanode::events::{Event, MAX_FRAME_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };

    match Event::text(raw) {
        Event::Text(frame) => assert!(frame.len() <= MAX_FRAME_LEN),
        Event::Error(e) => assert_eq!(e, LinkError::FrameTooLarge),
        other => panic!("unexpected event {:?}", other),
    }

    match parse_command(raw) {
        Ok(Some(InboundCommand::Activate | InboundCommand::Deactivate)) => {}
        Ok(Some(InboundCommand::Feed(req))) => {
            // Informational fields are carried through untouched.
            let _ = (req.food_type, req.quantity);
        }
        Ok(None) => {}
        Err(e) => assert!(matches!(e, LinkError::Malformed(_))),
    }
});
