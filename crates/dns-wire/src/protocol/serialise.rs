//! Serialisation of DNS messages to the wire format.  See the `types`
//! module for details of the format.

use bytes::{BufMut, BytesMut};
use std::collections::HashMap;

use crate::protocol::types::*;

/// Names can only be pointed to if they start below this offset.
const POINTER_MAX_OFFSET: usize = 0b0011_1111_1111_1111;

impl Message {
    /// # Errors
    ///
    /// If the message is invalid (the `Message` type permits more
    /// states than strictly allowed).
    pub fn to_octets(&self) -> Result<BytesMut, Error> {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer)?;
        Ok(buffer.octets)
    }

    /// The section counts in the header are always the lengths of the
    /// sections.
    ///
    /// # Errors
    ///
    /// If the message is invalid (the `Message` type permits more
    /// states than strictly allowed).
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), Error> {
        WireHeader {
            header: self.header,
            qdcount: usize_to_u16(self.questions.len())?,
            ancount: usize_to_u16(self.answers.len())?,
            nscount: usize_to_u16(self.authority.len())?,
            arcount: usize_to_u16(self.additional.len())?,
        }
        .serialise(buffer);

        for question in &self.questions {
            question.serialise(buffer);
        }
        for rr in &self.answers {
            rr.serialise(buffer)?;
        }
        for rr in &self.authority {
            rr.serialise(buffer)?;
        }
        for rr in &self.additional {
            rr.serialise(buffer)?;
        }

        Ok(())
    }
}

impl WireHeader {
    pub fn to_octets(&self) -> BytesMut {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer);
        buffer.octets
    }

    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        self.header.serialise(buffer);
        buffer.write_u16(self.qdcount);
        buffer.write_u16(self.ancount);
        buffer.write_u16(self.nscount);
        buffer.write_u16(self.arcount);
    }
}

impl Header {
    /// Writes the ID and the two flag octets, but not the counts.
    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        let flag = |set: bool, mask: u8| if set { mask } else { 0 };

        let flags1 = flag(self.is_response, HEADER_MASK_QR)
            | (HEADER_MASK_OPCODE & (u8::from(self.opcode) << HEADER_OFFSET_OPCODE))
            | flag(self.is_authoritative, HEADER_MASK_AA)
            | flag(self.is_truncated, HEADER_MASK_TC)
            | flag(self.recursion_desired, HEADER_MASK_RD);

        let flags2 = flag(self.recursion_available, HEADER_MASK_RA)
            | (HEADER_MASK_Z & (self.z << HEADER_OFFSET_Z))
            | (HEADER_MASK_RCODE & (u8::from(self.rcode) << HEADER_OFFSET_RCODE));

        buffer.write_u16(self.id);
        buffer.write_u8(flags1);
        buffer.write_u8(flags2);
    }
}

impl Question {
    pub fn to_octets(&self) -> BytesMut {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer);
        buffer.octets
    }

    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        self.name.serialise(buffer, true);
        self.qtype.serialise(buffer);
        self.qclass.serialise(buffer);
    }
}

impl ResourceRecord {
    /// # Errors
    ///
    /// If the RDATA is too long.
    pub fn to_octets(&self) -> Result<BytesMut, Error> {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer)?;
        Ok(buffer.octets)
    }

    /// The RDATA is written as-is: names inside it are neither
    /// compressed nor expanded.
    ///
    /// # Errors
    ///
    /// If the RDATA is too long.
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), Error> {
        let rdlength = usize_to_u16(self.rdata.len())?;

        self.name.serialise(buffer, true);
        self.rtype.serialise(buffer);
        self.rclass.serialise(buffer);
        buffer.write_u32(self.ttl);
        buffer.write_u16(rdlength);
        buffer.write_octets(&self.rdata);

        Ok(())
    }
}

impl DomainName {
    pub fn to_octets(&self) -> BytesMut {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer, false);
        buffer.octets
    }

    /// If `compress` is set, the longest suffix of this name already
    /// in the buffer is replaced with a pointer to it.
    pub fn serialise(&self, buffer: &mut WritableBuffer, compress: bool) {
        for (i, label) in self.labels.iter().enumerate() {
            if label.is_empty() {
                buffer.write_u8(0);
                break;
            }

            let suffix = &self.labels[i..];
            if compress {
                if let Some(ptr) = buffer.name_pointer(suffix) {
                    buffer.write_u16(ptr);
                    break;
                }
            }

            buffer.memoise_name(suffix);
            buffer.write_u8(label.len());
            buffer.write_octets(label.octets());
        }
    }
}

impl QueryType {
    pub fn serialise(self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.into());
    }
}

impl QueryClass {
    pub fn serialise(self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.into());
    }
}

impl RecordType {
    pub fn serialise(self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.into());
    }
}

impl RecordClass {
    pub fn serialise(self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.into());
    }
}

/// Errors encountered when serialising a message.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Error {
    /// A counter does not fit in the desired width.
    CounterTooLarge { counter: usize, bits: u32 },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::CounterTooLarge { counter, bits } => {
                write!(f, "'{counter}' cannot be converted to a u{bits}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// A buffer which can be written to, for serialisation purposes.
/// Remembers where each name suffix was written, so later names can
/// point back to it.
pub struct WritableBuffer {
    pub octets: BytesMut,
    name_pointers: HashMap<Vec<Label>, u16>,
}

impl Default for WritableBuffer {
    fn default() -> Self {
        Self {
            octets: BytesMut::with_capacity(512),
            name_pointers: HashMap::new(),
        }
    }
}

impl WritableBuffer {
    pub fn index(&self) -> usize {
        self.octets.len()
    }

    /// Record that the name made of these labels starts at the current
    /// index.  The root is never memoised: a pointer would be longer.
    pub fn memoise_name(&mut self, labels: &[Label]) {
        if labels.iter().all(Label::is_empty) || self.name_pointers.contains_key(labels) {
            return;
        }

        if let Ok(index) = u16::try_from(self.index()) {
            if usize::from(index) <= POINTER_MAX_OFFSET {
                let [hi, lo] = index.to_be_bytes();
                self.name_pointers
                    .insert(labels.to_vec(), u16::from_be_bytes([hi | LABEL_MASK_POINTER, lo]));
            }
        }
    }

    pub fn name_pointer(&self, labels: &[Label]) -> Option<u16> {
        self.name_pointers.get(labels).copied()
    }

    pub fn write_u8(&mut self, octet: u8) {
        self.octets.put_u8(octet);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.octets.put_u16(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.octets.put_u32(value);
    }

    pub fn write_octets(&mut self, octets: &[u8]) {
        self.octets.put_slice(octets);
    }
}

/// Helper function to convert a `usize` into a `u16` (or return an error).
///
/// # Errors
///
/// If the value cannot be converted.
fn usize_to_u16(counter: usize) -> Result<u16, Error> {
    u16::try_from(counter).map_err(|_| Error::CounterTooLarge {
        counter,
        bits: u16::BITS,
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::protocol::types::test_util::*;

    #[test]
    #[rustfmt::skip]
    fn header_encodes_every_field() {
        let header = Header {
            id: 0xabcd,
            is_response: true,
            opcode: Opcode::Status,
            is_authoritative: true,
            is_truncated: true,
            recursion_desired: true,
            recursion_available: true,
            z: 5,
            rcode: Rcode::NameError,
        };

        assert_eq!(
            vec![
                0xab, 0xcd,
                0b1001_0111,
                0b1101_0011,
                0, 1, 0, 2, 0, 3, 0, 4,
            ],
            WireHeader { header, qdcount: 1, ancount: 2, nscount: 3, arcount: 4 }.to_octets(),
        );
    }

    #[test]
    fn header_masks_out_of_range_z() {
        let mut header = Message::from_question(
            0,
            Question {
                name: DomainName::root_domain(),
                qtype: QueryType::default(),
                qclass: QueryClass::default(),
            },
        )
        .header;
        header.z = 0xff;
        header.recursion_desired = false;

        let octets = WireHeader {
            header,
            qdcount: 0,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        }
        .to_octets();

        assert_eq!(0, octets[2]);
        assert_eq!(HEADER_MASK_Z, octets[3]);
    }

    #[test]
    #[rustfmt::skip]
    fn name_uncompressed() {
        assert_eq!(
            vec![
                3, b'd', b'n', b's',
                6, b'g', b'o', b'o', b'g', b'l', b'e',
                3, b'c', b'o', b'm',
                0,
            ],
            domain("dns.google.com").to_octets(),
        );
        assert_eq!(vec![0], DomainName::root_domain().to_octets());
    }

    #[test]
    #[rustfmt::skip]
    fn name_compression_opt_in() {
        let mut buf = WritableBuffer::default();
        buf.write_octets(&[1, 2, 3, 4]);
        domain("www.example.com.").serialise(&mut buf, true);
        domain("www.example.com.").serialise(&mut buf, true);

        assert_eq!(
            vec![
                1, 2, 3, 4,
                // domain 1
                3, 119, 119, 119, // "www"
                7, 101, 120, 97, 109, 112, 108, 101, // "example"
                3, 99, 111, 109, 0, // "com"
                // domain 2
                0b1100_0000, 0b0000_0100 // pointer
            ],
            buf.octets,
        );
    }

    #[test]
    #[rustfmt::skip]
    fn name_compression_opt_out() {
        let mut buf = WritableBuffer::default();
        buf.write_octets(&[1, 2, 3, 4]);
        domain("www.example.com.").serialise(&mut buf, true);
        domain("www.example.com.").serialise(&mut buf, false);

        assert_eq!(
            vec![
                1, 2, 3, 4,
                // domain 1
                3, 119, 119, 119, // "www"
                7, 101, 120, 97, 109, 112, 108, 101, // "example"
                3, 99, 111, 109, 0, // "com"
                // domain 2
                3, 119, 119, 119, // "www"
                7, 101, 120, 97, 109, 112, 108, 101, // "example"
                3, 99, 111, 109, 0, // "com"
            ],
            buf.octets,
        );
    }

    #[test]
    #[rustfmt::skip]
    fn name_compression_suffix() {
        let mut buf = WritableBuffer::default();
        domain("www.example.com.").serialise(&mut buf, true);
        domain("mail.example.com.").serialise(&mut buf, true);
        domain("com.").serialise(&mut buf, true);

        assert_eq!(
            vec![
                // domain 1
                3, 119, 119, 119, // "www"
                7, 101, 120, 97, 109, 112, 108, 101, // "example"
                3, 99, 111, 109, 0, // "com"
                // domain 2
                4, 109, 97, 105, 108, // "mail"
                0b1100_0000, 0b0000_0100, // pointer to "example.com"
                // domain 3
                0b1100_0000, 0b0000_1100, // pointer to "com"
            ],
            buf.octets,
        );
    }

    #[test]
    fn name_compression_is_case_sensitive() {
        let mut buf = WritableBuffer::default();
        domain("example.com.").serialise(&mut buf, true);
        domain("EXAMPLE.com.").serialise(&mut buf, true);

        // "EXAMPLE" literally, then a pointer to "com"
        assert_eq!(13 + 8 + 2, buf.index());
    }

    #[test]
    fn name_not_memoised_past_pointer_range() {
        let mut buf = WritableBuffer::default();
        buf.write_octets(&vec![0; POINTER_MAX_OFFSET + 1]);
        domain("example.com.").serialise(&mut buf, true);
        let first_end = buf.index();
        domain("example.com.").serialise(&mut buf, true);

        assert_eq!(13, first_end - (POINTER_MAX_OFFSET + 1));
        assert_eq!(13, buf.index() - first_end);
    }

    #[test]
    #[rustfmt::skip]
    fn name_compression_records() {
        let mut buf = WritableBuffer::default();
        buf.write_octets(&[1, 2, 3, 4]);

        Question {
            name: domain("www.example.com."),
            qtype: QueryType::Wildcard,
            qclass: QueryClass::Wildcard,
        }.serialise(&mut buf);

        cname_record("www.example.com.", "mx.example.com.").serialise(&mut buf).unwrap();

        assert_eq!(
            vec![
                1, 2, 3, 4,
                // QNAME
                3, 119, 119, 119, // "www"
                7, 101, 120, 97, 109, 112, 108, 101, // "example"
                3, 99, 111, 109, 0, // "com"
                // QTYPE
                0, 255,
                // QCLASS
                0, 255,
                // NAME
                0b1100_0000, 0b0000_0100, // pointer to "www.example.com"
                // TYPE
                0b0000_0000, 0b0000_0101, // CNAME
                // CLASS
                0b0000_0000, 0b0000_0001, // IN
                // TTL
                0b0000_0000, 0b0000_0000, 0b0000_0001, 0b0010_1100, // 300
                // RDLENGTH
                0b0000_0000, 0b0001_0000, // 16 octets
                // RDATA, verbatim
                2, 109, 120, // "mx"
                7, 101, 120, 97, 109, 112, 108, 101, // "example"
                3, 99, 111, 109, 0, // "com"
            ],
            buf.octets,
        );
    }

    #[test]
    fn message_counts_follow_sections() {
        let mut message = Message::from_question(
            1234,
            Question {
                name: domain("example.com."),
                qtype: QueryType::Record(RecordType::A),
                qclass: QueryClass::Record(RecordClass::IN),
            },
        )
        .make_response();
        message.answers = vec![
            a_record("example.com.", std::net::Ipv4Addr::new(1, 1, 1, 1)),
            a_record("example.com.", std::net::Ipv4Addr::new(2, 2, 2, 2)),
        ];
        message.additional = vec![unknown_record("example.com.", &[1, 2, 3])];

        let octets = message.to_octets().unwrap();

        assert_eq!(&[0, 1, 0, 2, 0, 0, 0, 1], &octets[4..12]);
    }

    #[test]
    fn rdata_too_long() {
        let mut rr = unknown_record("example.com.", &[]);
        rr.rdata = Bytes::from(vec![0; usize::from(u16::MAX) + 1]);

        assert_eq!(
            Err(Error::CounterTooLarge {
                counter: usize::from(u16::MAX) + 1,
                bits: 16
            }),
            rr.serialise(&mut WritableBuffer::default())
        );
    }
}
