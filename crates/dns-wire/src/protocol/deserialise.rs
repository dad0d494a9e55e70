//! Deserialisation of DNS messages from the network.  See the `types`
//! module for details of the format.

use bytes::Bytes;
use std::fmt;

use crate::protocol::types::*;

impl Message {
    /// # Errors
    ///
    /// If the message cannot be parsed.
    pub fn from_octets(octets: &[u8]) -> Result<Self, Error> {
        Self::deserialise(&mut ConsumableBuffer::new(octets))
    }

    /// # Errors
    ///
    /// If the message cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let wire_header = WireHeader::deserialise(buffer)?;
        let id = wire_header.header.id;

        // don't trust the counts for preallocation: a 12 octet datagram
        // can claim 65535 records.
        let mut questions = Vec::with_capacity(wire_header.qdcount.min(16).into());
        let mut answers = Vec::with_capacity(wire_header.ancount.min(16).into());
        let mut authority = Vec::with_capacity(wire_header.nscount.min(16).into());
        let mut additional = Vec::with_capacity(wire_header.arcount.min(16).into());

        for _ in 0..wire_header.qdcount {
            questions.push(Question::deserialise(id, buffer)?);
        }
        for _ in 0..wire_header.ancount {
            answers.push(ResourceRecord::deserialise(id, buffer)?);
        }
        for _ in 0..wire_header.nscount {
            authority.push(ResourceRecord::deserialise(id, buffer)?);
        }
        for _ in 0..wire_header.arcount {
            additional.push(ResourceRecord::deserialise(id, buffer)?);
        }

        Ok(Self {
            header: wire_header.header,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

impl WireHeader {
    /// # Errors
    ///
    /// If the header is too short.
    pub fn from_octets(octets: &[u8]) -> Result<Self, Error> {
        Self::deserialise(&mut ConsumableBuffer::new(octets))
    }

    /// # Errors
    ///
    /// If the header is too short.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let id = buffer.next_u16().ok_or(Error::CompletelyBusted)?;
        let flags1 = buffer.next_u8().ok_or(Error::HeaderTooShort(id))?;
        let flags2 = buffer.next_u8().ok_or(Error::HeaderTooShort(id))?;
        let qdcount = buffer.next_u16().ok_or(Error::HeaderTooShort(id))?;
        let ancount = buffer.next_u16().ok_or(Error::HeaderTooShort(id))?;
        let nscount = buffer.next_u16().ok_or(Error::HeaderTooShort(id))?;
        let arcount = buffer.next_u16().ok_or(Error::HeaderTooShort(id))?;

        Ok(Self {
            header: Header {
                id,
                is_response: flags1 & HEADER_MASK_QR != 0,
                opcode: Opcode::from((flags1 & HEADER_MASK_OPCODE) >> HEADER_OFFSET_OPCODE),
                is_authoritative: flags1 & HEADER_MASK_AA != 0,
                is_truncated: flags1 & HEADER_MASK_TC != 0,
                recursion_desired: flags1 & HEADER_MASK_RD != 0,
                recursion_available: flags2 & HEADER_MASK_RA != 0,
                z: (flags2 & HEADER_MASK_Z) >> HEADER_OFFSET_Z,
                rcode: Rcode::from((flags2 & HEADER_MASK_RCODE) >> HEADER_OFFSET_RCODE),
            },
            qdcount,
            ancount,
            nscount,
            arcount,
        })
    }
}

impl Question {
    /// Decode a question starting at `offset` of a complete message,
    /// returning it and the number of octets it occupies there.
    ///
    /// # Errors
    ///
    /// If the question cannot be parsed.
    pub fn deserialise_at(octets: &[u8], offset: usize) -> Result<(Self, usize), Error> {
        let mut buffer = ConsumableBuffer::new(octets).at_offset(offset);
        let question = Self::deserialise(message_id(octets), &mut buffer)?;
        Ok((question, buffer.position() - offset))
    }

    /// # Errors
    ///
    /// If the question cannot be parsed.
    pub fn deserialise(id: u16, buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let name = DomainName::deserialise(id, buffer)?;
        let qtype = QueryType::deserialise(id, buffer)?;
        let qclass = QueryClass::deserialise(id, buffer)?;

        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }
}

impl ResourceRecord {
    /// Decode a resource record starting at `offset` of a complete
    /// message, returning it and the number of octets it occupies
    /// there: the owner name, 10 octets of fixed fields, and the RDATA.
    ///
    /// # Errors
    ///
    /// If the record cannot be parsed.
    pub fn deserialise_at(octets: &[u8], offset: usize) -> Result<(Self, usize), Error> {
        let mut buffer = ConsumableBuffer::new(octets).at_offset(offset);
        let rr = Self::deserialise(message_id(octets), &mut buffer)?;
        Ok((rr, buffer.position() - offset))
    }

    /// The RDATA is not interpreted, only captured.
    ///
    /// # Errors
    ///
    /// If the record cannot be parsed.
    pub fn deserialise(id: u16, buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let name = DomainName::deserialise(id, buffer)?;
        let rtype = RecordType::deserialise(id, buffer)?;
        let rclass = RecordClass::deserialise(id, buffer)?;
        let ttl = buffer.next_u32().ok_or(Error::ResourceRecordTooShort(id))?;
        let rdlength = buffer.next_u16().ok_or(Error::ResourceRecordTooShort(id))?;

        let rdata_offset = buffer.position();
        let rdata = buffer
            .take(rdlength.into())
            .ok_or(Error::ResourceRecordTooShort(id))?;

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata: Bytes::copy_from_slice(rdata),
            rdata_offset,
        })
    }
}

impl DomainName {
    /// Decode a name starting at `offset` of a complete message,
    /// returning it and the number of octets it occupies at `offset`.
    /// If the name is compressed, that is everything up to and
    /// including the first pointer.
    ///
    /// # Errors
    ///
    /// If the name cannot be parsed.
    pub fn deserialise_at(octets: &[u8], offset: usize) -> Result<(Self, usize), Error> {
        let mut buffer = ConsumableBuffer::new(octets).at_offset(offset);
        let name = Self::deserialise(message_id(octets), &mut buffer)?;
        Ok((name, buffer.position() - offset))
    }

    /// Pointers are followed iteratively.  Every pointer must target an
    /// offset strictly below every offset visited so far while reading
    /// this name, so decoding takes at most one pass over the message.
    ///
    /// # Errors
    ///
    /// If the name cannot be parsed.
    pub fn deserialise(id: u16, buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let mut labels = Vec::<Label>::with_capacity(5);
        let mut len = 0;

        let mut cursor = buffer.at_offset(buffer.position());
        let mut lowest_visited = cursor.position();
        let mut resume_at = None;

        loop {
            let size = cursor.next_u8().ok_or(Error::DomainTooShort(id))?;

            if usize::from(size) <= LABEL_MAX_LEN {
                let octets = cursor
                    .take(size.into())
                    .ok_or(Error::DomainTooShort(id))?;

                len += 1 + octets.len();
                if len > DOMAINNAME_MAX_LEN {
                    return Err(Error::DomainTooLong(id));
                }

                labels.push(Label::try_from(octets).map_err(|_| Error::DomainLabelInvalid(id))?);

                if size == 0 {
                    break;
                }
            } else if size & LABEL_MASK_POINTER == LABEL_MASK_POINTER {
                let hi = size & !LABEL_MASK_POINTER;
                let lo = cursor.next_u8().ok_or(Error::DomainTooShort(id))?;
                let ptr = usize::from(u16::from_be_bytes([hi, lo]));

                if ptr >= cursor.len() {
                    return Err(Error::DomainPointerOutOfRange(id));
                }
                if ptr >= lowest_visited {
                    return Err(Error::DomainPointerCycle(id));
                }

                if resume_at.is_none() {
                    resume_at = Some(cursor.position());
                }
                lowest_visited = ptr;
                cursor = cursor.at_offset(ptr);
            } else {
                // 0b01 and 0b10 prefixes are reserved
                return Err(Error::DomainLabelInvalid(id));
            }
        }

        buffer.position = resume_at.unwrap_or(cursor.position());

        Ok(DomainName { labels, len })
    }
}

impl QueryType {
    /// # Errors
    ///
    /// If the query type is too short.
    pub fn deserialise(id: u16, buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let value = buffer.next_u16().ok_or(Error::QuestionTooShort(id))?;
        Ok(Self::from(value))
    }
}

impl QueryClass {
    /// # Errors
    ///
    /// If the query class is too short.
    pub fn deserialise(id: u16, buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let value = buffer.next_u16().ok_or(Error::QuestionTooShort(id))?;
        Ok(Self::from(value))
    }
}

impl RecordType {
    /// # Errors
    ///
    /// If the record type is too short.
    pub fn deserialise(id: u16, buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let value = buffer.next_u16().ok_or(Error::ResourceRecordTooShort(id))?;
        Ok(Self::from(value))
    }
}

impl RecordClass {
    /// # Errors
    ///
    /// If the record class is too short.
    pub fn deserialise(id: u16, buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let value = buffer.next_u16().ok_or(Error::ResourceRecordTooShort(id))?;
        Ok(Self::from(value))
    }
}

/// The ID of a message, or 0 if there are not even two octets.
pub(crate) fn message_id(octets: &[u8]) -> u16 {
    match octets {
        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
        _ => 0,
    }
}

/// Errors encountered when parsing a datagram.  In all the errors
/// which have a `u16` parameter, that is the ID from the header - so
/// that the failure can be tied back to the query which caused it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Error {
    /// The datagram is not even 2 octets long, so it doesn't even
    /// contain a valid ID.
    CompletelyBusted,

    /// The header is missing one or more required fields.
    HeaderTooShort(u16),

    /// A question ends with an incomplete field.
    QuestionTooShort(u16),

    /// A resource record ends with an incomplete field, or has fewer
    /// octets of RDATA than its RDLENGTH claims.
    ResourceRecordTooShort(u16),

    /// A resource record's RDATA is the wrong format for its type.
    ResourceRecordInvalid(u16),

    /// A domain is incomplete.
    DomainTooShort(u16),

    /// A domain is over 255 octets in size.
    DomainTooLong(u16),

    /// A domain label length octet starts with a reserved bit pattern.
    DomainLabelInvalid(u16),

    /// A domain pointer points past the end of the message.
    DomainPointerOutOfRange(u16),

    /// A domain pointer does not point strictly before everything
    /// already visited while reading the name.
    DomainPointerCycle(u16),
}

impl Error {
    pub fn id(self) -> Option<u16> {
        match self {
            Error::CompletelyBusted => None,
            Error::HeaderTooShort(id)
            | Error::QuestionTooShort(id)
            | Error::ResourceRecordTooShort(id)
            | Error::ResourceRecordInvalid(id)
            | Error::DomainTooShort(id)
            | Error::DomainTooLong(id)
            | Error::DomainLabelInvalid(id)
            | Error::DomainPointerOutOfRange(id)
            | Error::DomainPointerCycle(id) => Some(id),
        }
    }

    pub fn kind(self) -> ErrorKind {
        match self {
            Error::CompletelyBusted
            | Error::HeaderTooShort(_)
            | Error::QuestionTooShort(_)
            | Error::ResourceRecordTooShort(_)
            | Error::DomainTooShort(_) => ErrorKind::BufferTooShort,
            Error::ResourceRecordInvalid(_) => ErrorKind::RecordInvalid,
            Error::DomainTooLong(_) => ErrorKind::NameTooLong,
            Error::DomainLabelInvalid(_) => ErrorKind::LabelInvalid,
            Error::DomainPointerOutOfRange(_) => ErrorKind::PointerOutOfRange,
            Error::DomainPointerCycle(_) => ErrorKind::PointerCycle,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CompletelyBusted => write!(f, "message is too short to contain an ID"),
            Error::HeaderTooShort(id) => write!(f, "message {id}: header is too short"),
            Error::QuestionTooShort(id) => write!(f, "message {id}: question is too short"),
            Error::ResourceRecordTooShort(id) => {
                write!(f, "message {id}: resource record is too short")
            }
            Error::ResourceRecordInvalid(id) => {
                write!(f, "message {id}: resource record data is malformed")
            }
            Error::DomainTooShort(id) => write!(f, "message {id}: domain name is truncated"),
            Error::DomainTooLong(id) => {
                write!(f, "message {id}: domain name is over {DOMAINNAME_MAX_LEN} octets")
            }
            Error::DomainLabelInvalid(id) => {
                write!(f, "message {id}: domain label has a reserved length prefix")
            }
            Error::DomainPointerOutOfRange(id) => {
                write!(f, "message {id}: compression pointer is past the end of the message")
            }
            Error::DomainPointerCycle(id) => {
                write!(f, "message {id}: compression pointer does not point backwards")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Coarse classification of decode failures.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    BufferTooShort,
    NameTooLong,
    LabelInvalid,
    PointerOutOfRange,
    PointerCycle,
    RecordInvalid,
}

/// A buffer which will be consumed by the parsing process.
#[derive(Debug, Clone)]
pub struct ConsumableBuffer<'a> {
    octets: &'a [u8],
    position: usize,
}

impl<'a> ConsumableBuffer<'a> {
    pub fn new(octets: &'a [u8]) -> Self {
        Self {
            octets,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the whole underlying message, not what remains.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    pub fn next_u8(&mut self) -> Option<u8> {
        let octet = *self.octets.get(self.position)?;
        self.position += 1;
        Some(octet)
    }

    pub fn next_u16(&mut self) -> Option<u16> {
        let octets = self.take(2)?;
        Some(u16::from_be_bytes([octets[0], octets[1]]))
    }

    pub fn next_u32(&mut self) -> Option<u32> {
        let octets = self.take(4)?;
        Some(u32::from_be_bytes([
            octets[0], octets[1], octets[2], octets[3],
        ]))
    }

    pub fn take(&mut self, size: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(size)?;
        let slice = self.octets.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    pub fn at_offset(&self, position: usize) -> ConsumableBuffer<'a> {
        Self {
            octets: self.octets,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::test_util::*;

    #[test]
    fn header_decodes_every_field() {
        let octets = [
            0xab, 0xcd, // ID
            0b1001_0111, // QR, opcode 2, AA, TC, RD
            0b1101_0011, // RA, Z = 5, rcode 3
            0, 1, 0, 2, 0, 3, 0, 4,
        ];

        let wire_header = WireHeader::from_octets(&octets).unwrap();

        assert_eq!(0xabcd, wire_header.header.id);
        assert!(wire_header.header.is_response);
        assert_eq!(Opcode::Status, wire_header.header.opcode);
        assert!(wire_header.header.is_authoritative);
        assert!(wire_header.header.is_truncated);
        assert!(wire_header.header.recursion_desired);
        assert!(wire_header.header.recursion_available);
        assert_eq!(5, wire_header.header.z);
        assert_eq!(Rcode::NameError, wire_header.header.rcode);
        assert_eq!(
            (1, 2, 3, 4),
            (
                wire_header.qdcount,
                wire_header.ancount,
                wire_header.nscount,
                wire_header.arcount
            )
        );
    }

    #[test]
    fn header_unassigned_opcode_and_reserved_rcode_are_not_errors() {
        let octets = [0, 1, 0b0111_1000, 0b0000_1111, 0, 0, 0, 0, 0, 0, 0, 0];

        let header = WireHeader::from_octets(&octets).unwrap().header;

        assert!(header.opcode.is_unassigned());
        assert_eq!(15, u8::from(header.opcode));
        assert!(header.rcode.is_reserved());
        assert_eq!(15, u8::from(header.rcode));
    }

    #[test]
    fn header_too_short() {
        assert_eq!(Err(Error::CompletelyBusted), WireHeader::from_octets(&[1]));
        assert_eq!(
            Err(Error::HeaderTooShort(0x0102)),
            WireHeader::from_octets(&[1, 2, 0, 0, 0, 1, 0, 0, 0, 0, 0])
        );
        assert_eq!(
            ErrorKind::BufferTooShort,
            WireHeader::from_octets(&[]).unwrap_err().kind()
        );
    }

    #[test]
    fn name_literal() {
        let octets = [3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0, 0xff];

        assert_eq!(
            Ok((domain("www.example."), 13)),
            DomainName::deserialise_at(&octets, 0)
        );
    }

    #[test]
    fn name_root() {
        assert_eq!(
            Ok((DomainName::root_domain(), 1)),
            DomainName::deserialise_at(&[0], 0)
        );
    }

    #[test]
    fn name_preserves_case() {
        let octets = [3, b'W', b'w', b'W', 0];

        assert_eq!(
            "WwW.",
            DomainName::deserialise_at(&octets, 0)
                .unwrap()
                .0
                .to_dotted_string()
        );
    }

    #[test]
    fn name_with_dot_in_label_survives_dotted_string() {
        let octets = [3, b'a', b'.', b'b', 0];
        let (name, _) = DomainName::deserialise_at(&octets, 0).unwrap();

        assert_eq!(2, name.labels.len());
        assert_eq!("a\\.b.", name.to_dotted_string());
        assert_eq!(Ok(name.clone()), DomainName::from_dotted_string(&name.to_dotted_string()));
    }

    #[test]
    fn name_pointer_consumes_two_octets() {
        let octets = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, // 0
            3, b'w', b'w', b'w', 0b1100_0000, 0, // 13
        ];

        assert_eq!(
            Ok((domain("www.example.com."), 6)),
            DomainName::deserialise_at(&octets, 13)
        );
        assert_eq!(
            Ok((domain("example.com."), 2)),
            DomainName::deserialise_at(&octets, 17)
        );
    }

    #[test]
    fn name_pointer_chain_descending() {
        let octets = [
            3, b'c', b'o', b'm', 0, // 0
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0b1100_0000, 0, // 5
            3, b'w', b'w', b'w', 0b1100_0000, 5, // 15
        ];

        assert_eq!(
            Ok((domain("www.example.com."), 6)),
            DomainName::deserialise_at(&octets, 15)
        );
    }

    #[test]
    fn name_pointer_to_itself_is_a_cycle() {
        let octets = [0, 0, 0b1100_0000, 2];

        assert_eq!(
            Err(Error::DomainPointerCycle(0)),
            DomainName::deserialise_at(&octets, 2)
        );
    }

    #[test]
    fn name_pointer_forwards_is_a_cycle() {
        let octets = [0b1100_0000, 2, 0];

        assert_eq!(
            ErrorKind::PointerCycle,
            DomainName::deserialise_at(&octets, 0).unwrap_err().kind()
        );
    }

    #[test]
    fn name_pointer_loop_is_a_cycle() {
        // 0 -> label, then pointer to 4, which points back to 0
        let octets = [
            1, b'a', 0b1100_0000, 4, // 0
            0b1100_0000, 0, // 4
        ];

        assert_eq!(
            Err(Error::DomainPointerCycle(0x0161)),
            DomainName::deserialise_at(&octets, 4)
        );
    }

    #[test]
    fn name_pointer_out_of_range() {
        let octets = [0, 0, 0b1100_0000, 0xff];

        assert_eq!(
            Err(Error::DomainPointerOutOfRange(0)),
            DomainName::deserialise_at(&octets, 2)
        );
    }

    #[test]
    fn name_pointer_out_of_range_wins_over_cycle() {
        let octets = [0b1111_1111, 0xff];

        assert_eq!(
            ErrorKind::PointerOutOfRange,
            DomainName::deserialise_at(&octets, 0).unwrap_err().kind()
        );
    }

    #[test]
    fn name_reserved_label_prefix() {
        for prefix in [0b0100_0000, 0b1000_0000] {
            let octets = [prefix, 0];

            assert_eq!(
                ErrorKind::LabelInvalid,
                DomainName::deserialise_at(&octets, 0).unwrap_err().kind()
            );
        }
    }

    #[test]
    fn name_truncated() {
        assert_eq!(
            Err(Error::DomainTooShort(0x0361)),
            DomainName::deserialise_at(&[3, b'a', b'b'], 0)
        );
        assert_eq!(
            ErrorKind::BufferTooShort,
            DomainName::deserialise_at(&[1, b'a'], 0)
                .unwrap_err()
                .kind()
        );
        assert_eq!(
            ErrorKind::BufferTooShort,
            DomainName::deserialise_at(&[0b1100_0000], 0)
                .unwrap_err()
                .kind()
        );
    }

    #[test]
    fn name_too_long() {
        let mut octets = Vec::new();
        for _ in 0..4 {
            octets.push(63);
            octets.extend_from_slice(&[b'a'; 63]);
        }
        octets.push(0);

        assert_eq!(
            ErrorKind::NameTooLong,
            DomainName::deserialise_at(&octets, 0).unwrap_err().kind()
        );
    }

    #[test]
    fn name_too_long_through_pointers() {
        // four 63 octet labels reached through a chain of pointers
        let mut octets = vec![63];
        octets.extend_from_slice(&[b'a'; 63]);
        octets.push(0);
        let mut previous = 0;
        for _ in 0..3 {
            let here = u8::try_from(octets.len()).unwrap();
            octets.push(63);
            octets.extend_from_slice(&[b'a'; 63]);
            octets.extend_from_slice(&[0b1100_0000, previous]);
            previous = here;
        }

        assert_eq!(
            ErrorKind::NameTooLong,
            DomainName::deserialise_at(&octets, previous.into())
                .unwrap_err()
                .kind()
        );
    }

    #[test]
    fn question() {
        let octets = [1, b'a', 0, 0, 28, 0, 1, 0xff];

        assert_eq!(
            Ok((
                Question {
                    name: domain("a."),
                    qtype: QueryType::Record(RecordType::AAAA),
                    qclass: QueryClass::Record(RecordClass::IN),
                },
                7
            )),
            Question::deserialise_at(&octets, 0)
        );
    }

    #[test]
    fn question_too_short() {
        assert_eq!(
            ErrorKind::BufferTooShort,
            Question::deserialise_at(&[1, b'a', 0, 0, 28, 0], 0)
                .unwrap_err()
                .kind()
        );
    }

    #[test]
    fn resourcerecord_consumes_name_fixed_fields_and_rdata() {
        let octets = [
            1, b'a', 0, // name
            0, 1, // type
            0, 1, // class
            0, 0, 1, 0, // ttl
            0, 4, // rdlength
            10, 0, 0, 1, // rdata
            0xff, 0xff, // trailing
        ];

        let (rr, consumed) = ResourceRecord::deserialise_at(&octets, 0).unwrap();

        assert_eq!(3 + 10 + 4, consumed);
        assert_eq!(a_record("a.", std::net::Ipv4Addr::new(10, 0, 0, 1)).rdata, rr.rdata);
        assert_eq!(RecordType::A, rr.rtype);
        assert_eq!(256, rr.ttl);
        assert_eq!(13, rr.rdata_offset());
    }

    #[test]
    fn resourcerecord_rdata_too_short() {
        let octets = [1, b'a', 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 4, 10, 0, 0];

        assert_eq!(
            Err(Error::ResourceRecordTooShort(0x0161)),
            ResourceRecord::deserialise_at(&octets, 0)
        );
    }

    #[test]
    fn resourcerecord_unknown_type_keeps_rdata() {
        let octets = [0, 0, 100, 0, 1, 0, 0, 1, 0x2c, 0, 3, 1, 2, 3];

        let (rr, consumed) = ResourceRecord::deserialise_at(&octets, 0).unwrap();

        assert_eq!(unknown_record(".", &[1, 2, 3]), rr);
        assert_eq!(14, consumed);
    }

    #[test]
    fn roundtrip_arbitrary_message() {
        for _ in 0..100 {
            let original = arbitrary_message();
            let deserialised = Message::from_octets(&original.to_octets().unwrap());

            assert_eq!(Ok(original), deserialised);
        }
    }

    #[test]
    fn roundtrip_arbitrary_resourcerecord() {
        for _ in 0..100 {
            let original = arbitrary_resourcerecord();
            let octets = original.to_octets().unwrap();

            assert_eq!(
                Ok((original.clone(), octets.len())),
                ResourceRecord::deserialise_at(&octets, 0)
            );
            assert_eq!(original.name.len + 10 + original.rdata.len(), octets.len());
        }
    }

    #[test]
    fn consumable_buffer_take_past_end() {
        let mut buffer = ConsumableBuffer::new(&[1, 2, 3]);

        assert_eq!(None, buffer.take(4));
        assert_eq!(Some(&[1, 2][..]), buffer.take(2));
        assert_eq!(None, buffer.next_u16());
        assert_eq!(Some(3), buffer.next_u8());
        assert_eq!(3, buffer.position());
        assert_eq!(None, buffer.next_u8());
        assert_eq!(None, buffer.at_offset(usize::MAX).take(1));
    }
}
