use bytes::Bytes;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Size of the fixed header which starts every message.
pub const HEADER_LEN: usize = 12;

/// Maximum encoded length of a domain name.  The number of labels
/// plus sum of the lengths of the labels.
pub const DOMAINNAME_MAX_LEN: usize = 255;

/// Maximum length of a single label in a domain name.
pub const LABEL_MAX_LEN: usize = 63;

/// Octet mask for a label length octet which is really the first half
/// of a compression pointer.
pub const LABEL_MASK_POINTER: u8 = 0b1100_0000;

/// Octet mask for the QR flag being set (response).
pub const HEADER_MASK_QR: u8 = 0b1000_0000;

/// Octet mask for the opcode field.
pub const HEADER_MASK_OPCODE: u8 = 0b0111_1000;

/// Offset for the opcode field.
pub const HEADER_OFFSET_OPCODE: usize = 3;

/// Octet mask for the AA flag being set (authoritative)
pub const HEADER_MASK_AA: u8 = 0b0000_0100;

/// Octet mask for the TC flag being set (truncated)
pub const HEADER_MASK_TC: u8 = 0b0000_0010;

/// Octet mask for the RD flag being set (desired)
pub const HEADER_MASK_RD: u8 = 0b0000_0001;

/// Octet mask for the RA flag being set (available)
pub const HEADER_MASK_RA: u8 = 0b1000_0000;

/// Octet mask for the reserved Z field.
pub const HEADER_MASK_Z: u8 = 0b0111_0000;

/// Offset for the Z field.
pub const HEADER_OFFSET_Z: usize = 4;

/// Octet mask for the rcode field.
pub const HEADER_MASK_RCODE: u8 = 0b0000_1111;

/// Offset for the rcode field.
pub const HEADER_OFFSET_RCODE: usize = 0;

/// Basic DNS message format, used for both queries and responses.
///
/// ```text
///     +---------------------+
///     |        Header       |
///     +---------------------+
///     |       Question      | the question for the name server
///     +---------------------+
///     |        Answer       | RRs answering the question
///     +---------------------+
///     |      Authority      | RRs pointing toward an authority
///     +---------------------+
///     |      Additional     | RRs holding additional information
///     +---------------------+
/// ```
///
/// See section 4.1 of RFC 1035.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    /// A standard query for a single question, with recursion desired.
    pub fn from_question(id: u16, question: Question) -> Self {
        Self {
            header: Header {
                id,
                is_response: false,
                opcode: Opcode::Standard,
                is_authoritative: false,
                is_truncated: false,
                recursion_desired: true,
                recursion_available: false,
                z: 0,
                rcode: Rcode::NoError,
            },
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    pub fn make_response(&self) -> Self {
        Self {
            header: Header {
                id: self.header.id,
                is_response: true,
                opcode: self.header.opcode,
                is_authoritative: false,
                is_truncated: false,
                recursion_desired: self.header.recursion_desired,
                recursion_available: true,
                z: 0,
                rcode: Rcode::NoError,
            },
            questions: self.questions.clone(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }
}

/// Common header type for all messages.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      ID                       |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |QR|   Opcode  |AA|TC|RD|RA|   Z    |   RCODE   |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    QDCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ANCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    NSCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ARCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// See section 4.1.1 of RFC 1035.
///
/// The four count fields live in `WireHeader`: for a `Message` they
/// are always the lengths of its sections.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Header {
    /// A 16 bit identifier assigned by the program that generates any
    /// kind of query.  This identifier is copied the corresponding
    /// reply and can be used by the requester to match up replies to
    /// outstanding queries.
    pub id: u16,

    /// A one bit field that specifies whether this message is a query
    /// (0), or a response (1).
    pub is_response: bool,

    /// A four bit field that specifies kind of query in this message.
    /// This value is set by the originator of a query and copied into
    /// the response.  The values are:
    ///
    /// - `0` a standard query (`QUERY`)
    ///
    /// - `1` an inverse query (`IQUERY`)
    ///
    /// - `2` a server status request (`STATUS`)
    ///
    /// - `3-15` unassigned
    pub opcode: Opcode,

    /// Authoritative Answer - this bit is valid in responses, and
    /// specifies that the responding name server is an authority for
    /// the domain name in question section.
    pub is_authoritative: bool,

    /// Truncation - specifies that this message was truncated due to
    /// length greater than that permitted on the transmission
    /// channel.
    pub is_truncated: bool,

    /// Recursion Desired - this bit may be set in a query and is
    /// copied into the response.
    pub recursion_desired: bool,

    /// Recursion Available - this be is set or cleared in a response,
    /// and denotes whether recursive query support is available in
    /// the name server.
    pub recursion_available: bool,

    /// Reserved for future use.  Only the low three bits are
    /// meaningful; anything above is masked off when serialising.
    pub z: u8,

    /// Response code - this 4 bit field is set as part of responses.
    ///
    /// - `0` No error condition
    ///
    /// - `1` Format error
    ///
    /// - `2` Server failure
    ///
    /// - `3` Name Error
    ///
    /// - `4` Not Implemented
    ///
    /// - `5` Refused
    ///
    /// - `6-15` Reserved for future use.
    pub rcode: Rcode,
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Header {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self {
            id: u.arbitrary()?,
            is_response: u.arbitrary()?,
            opcode: u.arbitrary()?,
            is_authoritative: u.arbitrary()?,
            is_truncated: u.arbitrary()?,
            recursion_desired: u.arbitrary()?,
            recursion_available: u.arbitrary()?,
            z: u.int_in_range(0..=7)?,
            rcode: u.arbitrary()?,
        })
    }
}

/// A `Header` as it appears on the network, with the section counts.
/// This type is used for serialisation and deserialisation only.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct WireHeader {
    pub header: Header,

    /// an unsigned 16 bit integer specifying the number of entries in
    /// the question section.
    pub qdcount: u16,

    /// an unsigned 16 bit integer specifying the number of resource
    /// records in the answer section.
    pub ancount: u16,

    /// an unsigned 16 bit integer specifying the number of name
    /// server resource records in the authority records section.
    pub nscount: u16,

    /// an unsigned 16 bit integer specifying the number of
    /// resource records in the additional records section.
    pub arcount: u16,
}

/// The question section has a list of questions (usually 1 but
/// possibly more) being asked.  This is the structure for a single
/// question.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                     QNAME                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QTYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QCLASS                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// See section 4.1.2 of RFC 1035.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Question {
    pub name: DomainName,
    pub qtype: QueryType,
    pub qclass: QueryClass,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.name, self.qclass, self.qtype)
    }
}

/// The answer, authority, and additional sections are all the same
/// format: a variable number of resource records.  This is the
/// structure for a single resource record.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                                               /
///     /                      NAME                     /
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     CLASS                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TTL                      |
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                   RDLENGTH                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--|
///     /                     RDATA                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// See section 4.1.3 of RFC 1035.
///
/// The RDATA is kept as raw octets.  Use a `rdata::Registry` to turn
/// it into something more useful.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub name: DomainName,
    pub rtype: RecordType,
    pub rclass: RecordClass,

    /// a 32 bit unsigned integer that specifies the time interval (in
    /// seconds) that the resource record may be cached before it
    /// should be discarded.
    pub ttl: u32,

    /// The RDATA, exactly RDLENGTH octets.  Any domain names inside it
    /// may be compressed, so only make sense alongside the message this
    /// record was read from.
    pub rdata: Bytes,

    /// Where the RDATA started in the message this record was read
    /// from.  Zero for records which were built rather than read.
    pub(crate) rdata_offset: usize,
}

impl ResourceRecord {
    pub fn new(
        name: DomainName,
        rtype: RecordType,
        rclass: RecordClass,
        ttl: u32,
        rdata: Bytes,
    ) -> Self {
        Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
            rdata_offset: 0,
        }
    }

    pub fn rdata_offset(&self) -> usize {
        self.rdata_offset
    }

    pub fn is_unknown(&self) -> bool {
        self.rtype.is_unknown()
    }
}

// the RDATA offset is an artefact of where the record was read from, so
// two records with the same content are equal wherever they came from.
impl PartialEq for ResourceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.rtype == other.rtype
            && self.rclass == other.rclass
            && self.ttl == other.ttl
            && self.rdata == other.rdata
    }
}

impl Eq for ResourceRecord {}

impl Hash for ResourceRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.rtype.hash(state);
        self.rclass.hash(state);
        self.ttl.hash(state);
        self.rdata.hash(state);
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for ResourceRecord {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let len = u.int_in_range(0..=128)?;
        let rdata = Bytes::copy_from_slice(u.bytes(len)?);

        Ok(Self::new(
            u.arbitrary()?,
            u.arbitrary()?,
            u.arbitrary()?,
            u.arbitrary()?,
            rdata,
        ))
    }
}

/// What sort of query this is.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Opcode {
    Standard,
    Inverse,
    Status,
    Unassigned(OpcodeUnassigned),
}

/// A struct with a private constructor, to ensure invalid `Opcode`s
/// cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OpcodeUnassigned(u8);

impl Opcode {
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Opcode::Unassigned(_))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::Standard => write!(f, "QUERY"),
            Opcode::Inverse => write!(f, "IQUERY"),
            Opcode::Status => write!(f, "STATUS"),
            Opcode::Unassigned(OpcodeUnassigned(n)) => write!(f, "OPCODE{n}"),
        }
    }
}

impl From<u8> for Opcode {
    fn from(octet: u8) -> Self {
        match octet & 0b0000_1111 {
            0 => Opcode::Standard,
            1 => Opcode::Inverse,
            2 => Opcode::Status,
            other => Opcode::Unassigned(OpcodeUnassigned(other)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        match value {
            Opcode::Standard => 0,
            Opcode::Inverse => 1,
            Opcode::Status => 2,
            Opcode::Unassigned(OpcodeUnassigned(octet)) => octet,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Opcode {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u8>()?))
    }
}

/// What sort of response this is.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rcode {
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    Reserved(RcodeReserved),
}

/// A struct with a private constructor, to ensure invalid `Rcode`s
/// cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RcodeReserved(u8);

impl Rcode {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Rcode::Reserved(_))
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rcode::NoError => write!(f, "NOERROR"),
            Rcode::FormatError => write!(f, "FORMERR"),
            Rcode::ServerFailure => write!(f, "SERVFAIL"),
            Rcode::NameError => write!(f, "NXDOMAIN"),
            Rcode::NotImplemented => write!(f, "NOTIMP"),
            Rcode::Refused => write!(f, "REFUSED"),
            Rcode::Reserved(RcodeReserved(n)) => write!(f, "RCODE{n}"),
        }
    }
}

impl From<u8> for Rcode {
    fn from(octet: u8) -> Self {
        match octet & 0b0000_1111 {
            0 => Rcode::NoError,
            1 => Rcode::FormatError,
            2 => Rcode::ServerFailure,
            3 => Rcode::NameError,
            4 => Rcode::NotImplemented,
            5 => Rcode::Refused,
            other => Rcode::Reserved(RcodeReserved(other)),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::NoError => 0,
            Rcode::FormatError => 1,
            Rcode::ServerFailure => 2,
            Rcode::NameError => 3,
            Rcode::NotImplemented => 4,
            Rcode::Refused => 5,
            Rcode::Reserved(RcodeReserved(octet)) => octet,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Rcode {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u8>()?))
    }
}

/// A domain name is a sequence of labels, where each label is a
/// length octet followed by that number of octets.
///
/// A label must be 63 octets or shorter.  A name must be 255 octets
/// or shorter in total, including both length and label octets.  The
/// last label is always the empty root label, and no other label is
/// empty.
///
/// Label octets are kept exactly as given: names are not
/// case-folded.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DomainName {
    pub labels: Vec<Label>,
    // INVARIANT: len == len(labels) + sum(map(len, labels))
    pub len: usize,
}

impl DomainName {
    pub fn root_domain() -> Self {
        DomainName {
            labels: vec![Label::new()],
            len: 1,
        }
    }

    pub fn is_root(&self) -> bool {
        self.len == 1 && self.labels[0].is_empty()
    }

    /// Render in presentation form, ending with a `.`.
    ///
    /// Labels which are valid UTF-8 are written as text.  A `.` or `\`
    /// inside a label is written as `\.` or `\\`, and whitespace,
    /// control characters, and the octets of a label which is not
    /// UTF-8 (other than printable ASCII) are written as `\DDD`.
    pub fn to_dotted_string(&self) -> String {
        if self.is_root() {
            return ".".to_string();
        }

        let mut out = String::with_capacity(self.len);
        let mut first = true;
        for label in &self.labels {
            if first {
                first = false;
            } else {
                out.push('.');
            }
            push_label(&mut out, label.octets());
        }

        out
    }

    /// Parse a dotted name.  A trailing `.` is optional: every name is
    /// taken to be fully-qualified.  Both `""` and `"."` are the root.
    ///
    /// Labels are encoded as UTF-8.  `\DDD` is the octet with that
    /// decimal value, and `\` followed by any other character is that
    /// character, so `\.` puts a dot inside a label.
    ///
    /// # Errors
    ///
    /// If a label is empty or too long, the whole name is too long, or
    /// an escape is malformed.
    pub fn from_dotted_string(s: &str) -> Result<Self, DomainNameFromStr> {
        if s.is_empty() || s == "." {
            return Ok(Self::root_domain());
        }

        let mut labels = Vec::with_capacity(s.len() / 4 + 2);
        let mut octets = Vec::with_capacity(LABEL_MAX_LEN);
        let mut chars = s.chars();
        while let Some(chr) = chars.next() {
            match chr {
                '.' => {
                    if octets.is_empty() {
                        return Err(DomainNameFromStr::EmptyLabel);
                    }
                    labels.push(Label::try_from(&octets[..])?);
                    octets.clear();
                }
                '\\' => match chars.next() {
                    Some(digit) if digit.is_ascii_digit() => {
                        let octet = decimal_escape(digit, &mut chars)
                            .ok_or(DomainNameFromStr::InvalidEscape)?;
                        octets.push(octet);
                    }
                    Some(escaped) => push_utf8(&mut octets, escaped),
                    None => return Err(DomainNameFromStr::InvalidEscape),
                },
                _ => push_utf8(&mut octets, chr),
            }
        }
        if !octets.is_empty() {
            labels.push(Label::try_from(&octets[..])?);
        }
        labels.push(Label::new());

        Self::from_labels(labels)
    }

    /// # Errors
    ///
    /// If the labels do not end with exactly one (root) empty label, or
    /// the name is too long.
    pub fn from_labels(labels: Vec<Label>) -> Result<Self, DomainNameFromStr> {
        let mut len = labels.len();
        let mut blank_label = false;

        for label in &labels {
            if blank_label {
                return Err(DomainNameFromStr::EmptyLabel);
            }

            blank_label |= label.is_empty();
            len += label.len() as usize;
        }

        if !blank_label {
            Err(DomainNameFromStr::MissingRoot)
        } else if len > DOMAINNAME_MAX_LEN {
            Err(DomainNameFromStr::NameTooLong)
        } else {
            Ok(Self { labels, len })
        }
    }
}

fn push_label(out: &mut String, octets: &[u8]) {
    if let Ok(text) = std::str::from_utf8(octets) {
        for chr in text.chars() {
            push_escaped_char(out, chr);
        }
    } else {
        for octet in octets {
            if octet.is_ascii() {
                push_escaped_char(out, char::from(*octet));
            } else {
                out.push_str(&format!("\\{octet:03}"));
            }
        }
    }
}

fn push_escaped_char(out: &mut String, chr: char) {
    match chr {
        '.' | '\\' => {
            out.push('\\');
            out.push(chr);
        }
        _ if chr.is_control() || chr.is_whitespace() => {
            let mut buf = [0; 4];
            for octet in chr.encode_utf8(&mut buf).as_bytes() {
                out.push_str(&format!("\\{octet:03}"));
            }
        }
        _ => out.push(chr),
    }
}

fn push_utf8(octets: &mut Vec<u8>, chr: char) {
    let mut buf = [0; 4];
    octets.extend_from_slice(chr.encode_utf8(&mut buf).as_bytes());
}

/// The rest of a `\DDD` escape, after its first digit.
fn decimal_escape(first: char, chars: &mut std::str::Chars) -> Option<u8> {
    let mut value = first.to_digit(10)?;
    for _ in 0..2 {
        value = value * 10 + chars.next()?.to_digit(10)?;
    }
    u8::try_from(value).ok()
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainName")
            .field("to_dotted_string()", &self.to_dotted_string())
            .finish()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", &self.to_dotted_string())
    }
}

impl FromStr for DomainName {
    type Err = DomainNameFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainName::from_dotted_string(s)
    }
}

/// Errors that can arise when building a `DomainName`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DomainNameFromStr {
    /// An empty label somewhere other than the end.
    EmptyLabel,

    /// The labels do not end with the root label.
    MissingRoot,

    /// A label is over 63 octets.
    LabelTooLong,

    /// The encoded name is over 255 octets.
    NameTooLong,

    /// A `\` at the end of the name, or a `\DDD` which is not three
    /// digits or is over 255.
    InvalidEscape,
}

impl fmt::Display for DomainNameFromStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainNameFromStr::EmptyLabel => write!(f, "domain name has an empty label"),
            DomainNameFromStr::MissingRoot => write!(f, "domain name does not end at the root"),
            DomainNameFromStr::LabelTooLong => {
                write!(f, "label is longer than {LABEL_MAX_LEN} octets")
            }
            DomainNameFromStr::NameTooLong => {
                write!(f, "domain name is longer than {DOMAINNAME_MAX_LEN} octets")
            }
            DomainNameFromStr::InvalidEscape => write!(f, "domain name has a malformed escape"),
        }
    }
}

impl std::error::Error for DomainNameFromStr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl From<LabelTryFromOctetsError> for DomainNameFromStr {
    fn from(_: LabelTryFromOctetsError) -> Self {
        DomainNameFromStr::LabelTooLong
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for DomainName {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_labels = u.int_in_range::<usize>(0..=10)?;
        let mut labels = Vec::new();
        for _ in 0..num_labels {
            labels.push(u.arbitrary()?);
        }
        labels.push(Label::new());
        // at most 10 * 21 + 1 octets, under the limit
        DomainName::from_labels(labels).map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}

/// A label is just a sequence of octets.  A label can be no longer
/// than 63 octets.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label {
    /// Private to this module so constructing an invalid `Label` is
    /// impossible.
    octets: Bytes,
}

impl Label {
    /// Create a new, empty, label.
    pub fn new() -> Self {
        Self {
            octets: Bytes::new(),
        }
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn len(&self) -> u8 {
        // safe as the `TryFrom` ensures a label is <= 63 bytes
        self.octets.len().try_into().unwrap()
    }

    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    pub fn octets(&self) -> &Bytes {
        &self.octets
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&[u8]> for Label {
    type Error = LabelTryFromOctetsError;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        if octets.len() > LABEL_MAX_LEN {
            return Err(LabelTryFromOctetsError::TooLong);
        }

        Ok(Self {
            octets: Bytes::copy_from_slice(octets),
        })
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Label {
    // only generates non-empty labels of printable ASCII, with no dots,
    // so they survive a trip through `to_dotted_string`.
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Label> {
        let label_len = u.int_in_range::<usize>(1..=20)?;
        let mut octets = Vec::with_capacity(label_len);
        for b in u.bytes(label_len)? {
            let printable = b'!' + (*b % 94);
            octets.push(if printable == b'.' { b'x' } else { printable });
        }
        Ok(Self {
            octets: Bytes::from(octets),
        })
    }
}

/// Errors that can arise when converting a `[u8]` into a `Label`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LabelTryFromOctetsError {
    TooLong,
}

/// Query types are a superset of record types.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum QueryType {
    Record(RecordType),
    AXFR,
    MAILB,
    MAILA,
    Wildcard,
}

impl Default for QueryType {
    fn default() -> Self {
        QueryType::Record(RecordType::A)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryType::Record(rtype) => rtype.fmt(f),
            QueryType::AXFR => write!(f, "AXFR"),
            QueryType::MAILA => write!(f, "MAILA"),
            QueryType::MAILB => write!(f, "MAILB"),
            QueryType::Wildcard => write!(f, "ANY"),
        }
    }
}

impl FromStr for QueryType {
    type Err = RecordTypeFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AXFR" => Ok(QueryType::AXFR),
            "MAILA" => Ok(QueryType::MAILA),
            "MAILB" => Ok(QueryType::MAILB),
            "ANY" => Ok(QueryType::Wildcard),
            upper => RecordType::from_str(upper).map(QueryType::Record),
        }
    }
}

impl From<u16> for QueryType {
    fn from(value: u16) -> Self {
        match value {
            252 => QueryType::AXFR,
            253 => QueryType::MAILB,
            254 => QueryType::MAILA,
            255 => QueryType::Wildcard,
            _ => QueryType::Record(RecordType::from(value)),
        }
    }
}

impl From<QueryType> for u16 {
    fn from(value: QueryType) -> Self {
        match value {
            QueryType::AXFR => 252,
            QueryType::MAILB => 253,
            QueryType::MAILA => 254,
            QueryType::Wildcard => 255,
            QueryType::Record(rtype) => rtype.into(),
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for QueryType {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

/// Query classes are a superset of record classes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum QueryClass {
    Record(RecordClass),
    Wildcard,
}

impl Default for QueryClass {
    fn default() -> Self {
        QueryClass::Record(RecordClass::IN)
    }
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryClass::Record(rclass) => rclass.fmt(f),
            QueryClass::Wildcard => write!(f, "ANY"),
        }
    }
}

impl FromStr for QueryClass {
    type Err = RecordClassFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANY" => Ok(QueryClass::Wildcard),
            _ => RecordClass::from_str(s).map(QueryClass::Record),
        }
    }
}

impl From<u16> for QueryClass {
    fn from(value: u16) -> Self {
        match value {
            255 => QueryClass::Wildcard,
            _ => QueryClass::Record(RecordClass::from(value)),
        }
    }
}

impl From<QueryClass> for u16 {
    fn from(value: QueryClass) -> Self {
        match value {
            QueryClass::Wildcard => 255,
            QueryClass::Record(rclass) => rclass.into(),
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for QueryClass {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

/// Record types are used by resource records and by queries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordType {
    A,
    NS,
    MD,
    MF,
    CNAME,
    SOA,
    MB,
    MG,
    MR,
    NULL,
    WKS,
    PTR,
    HINFO,
    MINFO,
    MX,
    TXT,
    AAAA,
    SRV,
    Unknown(RecordTypeUnknown),
}

/// A struct with a private constructor, to ensure invalid `RecordType`s
/// cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordTypeUnknown(u16);

/// Every named record type, paired with its numeric code.
const RECORD_TYPE_TABLE: [(RecordType, u16, &str); 18] = [
    (RecordType::A, 1, "A"),
    (RecordType::NS, 2, "NS"),
    (RecordType::MD, 3, "MD"),
    (RecordType::MF, 4, "MF"),
    (RecordType::CNAME, 5, "CNAME"),
    (RecordType::SOA, 6, "SOA"),
    (RecordType::MB, 7, "MB"),
    (RecordType::MG, 8, "MG"),
    (RecordType::MR, 9, "MR"),
    (RecordType::NULL, 10, "NULL"),
    (RecordType::WKS, 11, "WKS"),
    (RecordType::PTR, 12, "PTR"),
    (RecordType::HINFO, 13, "HINFO"),
    (RecordType::MINFO, 14, "MINFO"),
    (RecordType::MX, 15, "MX"),
    (RecordType::TXT, 16, "TXT"),
    (RecordType::AAAA, 28, "AAAA"),
    (RecordType::SRV, 33, "SRV"),
];

impl RecordType {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RecordType::Unknown(_))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordType::Unknown(RecordTypeUnknown(n)) => write!(f, "TYPE{n}"),
            known => {
                let name = RECORD_TYPE_TABLE
                    .iter()
                    .find(|(rtype, _, _)| rtype == known)
                    .map_or("?", |(_, _, name)| name);
                write!(f, "{name}")
            }
        }
    }
}

impl FromStr for RecordType {
    type Err = RecordTypeFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((rtype, _, _)) = RECORD_TYPE_TABLE.iter().find(|(_, _, name)| *name == s) {
            Ok(*rtype)
        } else if let Some(type_str) = s.strip_prefix("TYPE") {
            u16::from_str(type_str)
                .map(RecordType::from)
                .map_err(|_| RecordTypeFromStr::BadType)
        } else {
            Err(RecordTypeFromStr::NoParse)
        }
    }
}

/// Errors that can arise when converting a `&str` into a `RecordType`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordTypeFromStr {
    BadType,
    NoParse,
}

impl fmt::Display for RecordTypeFromStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordTypeFromStr::BadType => write!(f, "TYPE<num> number must be a u16"),
            RecordTypeFromStr::NoParse => write!(f, "could not parse string to type"),
        }
    }
}

impl std::error::Error for RecordTypeFromStr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        RECORD_TYPE_TABLE
            .iter()
            .find(|(_, code, _)| *code == value)
            .map_or(RecordType::Unknown(RecordTypeUnknown(value)), |(rtype, _, _)| *rtype)
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::Unknown(RecordTypeUnknown(value)) => value,
            known => RECORD_TYPE_TABLE
                .iter()
                .find(|(rtype, _, _)| *rtype == known)
                .map_or(0, |(_, code, _)| *code),
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordType {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

/// Record classes are used by resource records and by queries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordClass {
    IN,
    Unknown(RecordClassUnknown),
}

/// A struct with a private constructor, to ensure invalid
/// `RecordClass`es cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordClassUnknown(u16);

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordClass::IN => write!(f, "IN"),
            RecordClass::Unknown(RecordClassUnknown(n)) => write!(f, "CLASS{n}"),
        }
    }
}

impl FromStr for RecordClass {
    type Err = RecordClassFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "IN" {
            Ok(RecordClass::IN)
        } else if let Some(class_str) = s.strip_prefix("CLASS") {
            u16::from_str(class_str)
                .map(RecordClass::from)
                .map_err(|_| RecordClassFromStr::BadClass)
        } else {
            Err(RecordClassFromStr::NoParse)
        }
    }
}

/// Errors that can arise when converting a `&str` into a `RecordClass`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordClassFromStr {
    BadClass,
    NoParse,
}

impl fmt::Display for RecordClassFromStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordClassFromStr::BadClass => write!(f, "CLASS<num> number must be a u16"),
            RecordClassFromStr::NoParse => write!(f, "could not parse string to class"),
        }
    }
}

impl std::error::Error for RecordClassFromStr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl From<u16> for RecordClass {
    fn from(value: u16) -> Self {
        match value {
            1 => RecordClass::IN,
            _ => RecordClass::Unknown(RecordClassUnknown(value)),
        }
    }
}

impl From<RecordClass> for u16 {
    fn from(value: RecordClass) -> Self {
        match value {
            RecordClass::IN => 1,
            RecordClass::Unknown(RecordClassUnknown(value)) => value,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordClass {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}


#[cfg(any(feature = "test-util", test))]
#[allow(clippy::missing_panics_doc)]
pub mod test_util {
    use super::*;

    use arbitrary::{Arbitrary, Unstructured};
    use rand::Rng;
    use std::net::Ipv4Addr;

    /// Generate an arbitrary value from random input, retrying with a
    /// bigger buffer if the first attempt runs out of entropy.
    pub fn arbitrary<T: for<'a> Arbitrary<'a>>() -> T {
        let mut rng = rand::rng();
        for size in [128, 256, 512, 1024, 2048, 4096, 8192] {
            let mut buf = vec![0u8; size];
            rng.fill(&mut buf[..]);

            if let Ok(value) = T::arbitrary(&mut Unstructured::new(&buf)) {
                return value;
            }
        }

        panic!("could not generate arbitrary value!");
    }

    pub fn arbitrary_message() -> Message {
        arbitrary()
    }

    pub fn arbitrary_resourcerecord() -> ResourceRecord {
        arbitrary()
    }

    pub fn domain(name: &str) -> DomainName {
        DomainName::from_dotted_string(name).unwrap()
    }

    pub fn a_record(name: &str, address: Ipv4Addr) -> ResourceRecord {
        ResourceRecord::new(
            domain(name),
            RecordType::A,
            RecordClass::IN,
            300,
            Bytes::copy_from_slice(&address.octets()),
        )
    }

    /// A CNAME record with an uncompressed target in its RDATA.
    pub fn cname_record(name: &str, target_name: &str) -> ResourceRecord {
        let target = domain(target_name);
        let mut rdata = Vec::with_capacity(target.len);
        for label in &target.labels {
            rdata.push(label.len());
            rdata.extend_from_slice(label.octets());
        }

        ResourceRecord::new(
            domain(name),
            RecordType::CNAME,
            RecordClass::IN,
            300,
            Bytes::from(rdata),
        )
    }

    pub fn unknown_record(name: &str, octets: &[u8]) -> ResourceRecord {
        ResourceRecord::new(
            domain(name),
            RecordType::Unknown(RecordTypeUnknown(100)),
            RecordClass::IN,
            300,
            Bytes::copy_from_slice(octets),
        )
    }
}
