//! Type-specific interpretation of RDATA.
//!
//! Decoding a message only captures each record's RDATA as octets.
//! A `Registry` maps record types to interpreters, which turn those
//! octets into a `RecordData`.  Names inside RDATA may be compressed,
//! so interpreters read from the whole message.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::protocol::deserialise::{message_id, ConsumableBuffer, Error};
use crate::protocol::types::*;

/// Interpreted RDATA.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RecordData {
    A {
        address: Ipv4Addr,
    },
    AAAA {
        address: Ipv6Addr,
    },
    NS {
        nsdname: DomainName,
    },
    CNAME {
        cname: DomainName,
    },
    PTR {
        ptrdname: DomainName,
    },
    MX {
        preference: u16,
        exchange: DomainName,
    },
    SOA {
        mname: DomainName,
        rname: DomainName,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    TXT {
        strings: Vec<Bytes>,
    },
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordData::A { address } => write!(f, "{address}"),
            RecordData::AAAA { address } => write!(f, "{address}"),
            RecordData::NS { nsdname } => write!(f, "{nsdname}"),
            RecordData::CNAME { cname } => write!(f, "{cname}"),
            RecordData::PTR { ptrdname } => write!(f, "{ptrdname}"),
            RecordData::MX {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}"),
            RecordData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}"
            ),
            RecordData::TXT { strings } => {
                let mut first = true;
                for string in strings {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "\"")?;
                    for octet in string {
                        match octet {
                            b'"' | b'\\' => write!(f, "\\{}", *octet as char)?,
                            0x20..=0x7e => write!(f, "{}", *octet as char)?,
                            _ => write!(f, "\\{octet:03}")?,
                        }
                    }
                    write!(f, "\"")?;
                }
                Ok(())
            }
        }
    }
}

/// Reads one record's RDATA.  The buffer is positioned at the start of
/// the RDATA, which is `rdlength` octets long, but covers the whole
/// message so pointers can be followed.
pub type Interpreter = fn(u16, &mut ConsumableBuffer, usize) -> Result<RecordData, Error>;

/// Interpreters, keyed by record type.
#[derive(Clone, Default)]
pub struct Registry {
    interpreters: HashMap<RecordType, Interpreter>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rtypes: Vec<&RecordType> = self.interpreters.keys().collect();
        rtypes.sort();
        f.debug_struct("Registry").field("rtypes", &rtypes).finish()
    }
}

impl Registry {
    /// A registry which interprets nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry which interprets A, AAAA, NS, CNAME, PTR, MX, SOA,
    /// and TXT records.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RecordType::A, interpret_a);
        registry.register(RecordType::AAAA, interpret_aaaa);
        registry.register(RecordType::NS, interpret_ns);
        registry.register(RecordType::CNAME, interpret_cname);
        registry.register(RecordType::PTR, interpret_ptr);
        registry.register(RecordType::MX, interpret_mx);
        registry.register(RecordType::SOA, interpret_soa);
        registry.register(RecordType::TXT, interpret_txt);
        registry
    }

    /// Returns the interpreter previously registered for this type, if
    /// there was one.
    pub fn register(&mut self, rtype: RecordType, interpreter: Interpreter) -> Option<Interpreter> {
        self.interpreters.insert(rtype, interpreter)
    }

    pub fn knows(&self, rtype: RecordType) -> bool {
        self.interpreters.contains_key(&rtype)
    }

    /// Interpret a record read from `message`.  Returns `None` if
    /// there is no interpreter for the record's type.
    ///
    /// If the record was not read from `message` its RDATA is
    /// interpreted on its own, so any pointers in it can only refer to
    /// earlier parts of the RDATA.
    pub fn interpret(&self, message: &[u8], rr: &ResourceRecord) -> Option<Result<RecordData, Error>> {
        let interpreter = self.interpreters.get(&rr.rtype)?;

        let start = rr.rdata_offset();
        let rdlength = rr.rdata.len();
        let from_message = start
            .checked_add(rdlength)
            .and_then(|end| message.get(start..end))
            == Some(&rr.rdata[..]);

        let (octets, start) = if from_message {
            (message, start)
        } else {
            (&rr.rdata[..], 0)
        };

        let id = message_id(message);
        let mut buffer = ConsumableBuffer::new(octets).at_offset(start);
        Some(interpreter(id, &mut buffer, rdlength).and_then(|data| {
            if buffer.position() == start + rdlength {
                Ok(data)
            } else {
                Err(Error::ResourceRecordInvalid(id))
            }
        }))
    }
}

fn interpret_a(id: u16, buffer: &mut ConsumableBuffer, rdlength: usize) -> Result<RecordData, Error> {
    if rdlength != 4 {
        return Err(Error::ResourceRecordInvalid(id));
    }

    let address = buffer.next_u32().ok_or(Error::ResourceRecordTooShort(id))?;
    Ok(RecordData::A {
        address: Ipv4Addr::from(address),
    })
}

fn interpret_aaaa(id: u16, buffer: &mut ConsumableBuffer, rdlength: usize) -> Result<RecordData, Error> {
    if rdlength != 16 {
        return Err(Error::ResourceRecordInvalid(id));
    }

    let octets: [u8; 16] = buffer
        .take(16)
        .and_then(|os| os.try_into().ok())
        .ok_or(Error::ResourceRecordTooShort(id))?;
    Ok(RecordData::AAAA {
        address: Ipv6Addr::from(octets),
    })
}

fn interpret_ns(id: u16, buffer: &mut ConsumableBuffer, _: usize) -> Result<RecordData, Error> {
    Ok(RecordData::NS {
        nsdname: DomainName::deserialise(id, buffer)?,
    })
}

fn interpret_cname(id: u16, buffer: &mut ConsumableBuffer, _: usize) -> Result<RecordData, Error> {
    Ok(RecordData::CNAME {
        cname: DomainName::deserialise(id, buffer)?,
    })
}

fn interpret_ptr(id: u16, buffer: &mut ConsumableBuffer, _: usize) -> Result<RecordData, Error> {
    Ok(RecordData::PTR {
        ptrdname: DomainName::deserialise(id, buffer)?,
    })
}

fn interpret_mx(id: u16, buffer: &mut ConsumableBuffer, _: usize) -> Result<RecordData, Error> {
    Ok(RecordData::MX {
        preference: buffer.next_u16().ok_or(Error::ResourceRecordTooShort(id))?,
        exchange: DomainName::deserialise(id, buffer)?,
    })
}

fn interpret_soa(id: u16, buffer: &mut ConsumableBuffer, _: usize) -> Result<RecordData, Error> {
    Ok(RecordData::SOA {
        mname: DomainName::deserialise(id, buffer)?,
        rname: DomainName::deserialise(id, buffer)?,
        serial: buffer.next_u32().ok_or(Error::ResourceRecordTooShort(id))?,
        refresh: buffer.next_u32().ok_or(Error::ResourceRecordTooShort(id))?,
        retry: buffer.next_u32().ok_or(Error::ResourceRecordTooShort(id))?,
        expire: buffer.next_u32().ok_or(Error::ResourceRecordTooShort(id))?,
        minimum: buffer.next_u32().ok_or(Error::ResourceRecordTooShort(id))?,
    })
}

/// One or more length-prefixed character strings, filling the RDATA.
fn interpret_txt(id: u16, buffer: &mut ConsumableBuffer, rdlength: usize) -> Result<RecordData, Error> {
    let end = buffer.position() + rdlength;
    let mut strings = Vec::new();

    while buffer.position() < end {
        let len = buffer.next_u8().ok_or(Error::ResourceRecordTooShort(id))?;
        let octets = buffer
            .take(len.into())
            .ok_or(Error::ResourceRecordTooShort(id))?;
        strings.push(Bytes::copy_from_slice(octets));
    }

    if strings.is_empty() {
        return Err(Error::ResourceRecordInvalid(id));
    }

    Ok(RecordData::TXT { strings })
}
