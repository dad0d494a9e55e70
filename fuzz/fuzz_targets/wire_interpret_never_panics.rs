#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_wire::protocol::rdata::Registry;
use dns_wire::protocol::types::Message;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = Message::from_octets(data) {
        let registry = Registry::with_defaults();
        for rr in message
            .answers
            .iter()
            .chain(&message.authority)
            .chain(&message.additional)
        {
            let _ = registry.interpret(data, rr);
        }
    }
});
