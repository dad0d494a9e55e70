//! Building queries and checking the responses to them.

use bytes::BytesMut;
use rand::Rng;
use std::fmt;

use crate::protocol::serialise;
use crate::protocol::types::*;

/// Somewhere to get message IDs from.
pub trait IdSource {
    fn next_id(&mut self) -> u16;
}

/// IDs drawn from the thread-local CSPRNG, which is seeded from the
/// operating system.
#[derive(Debug, Default, Copy, Clone)]
pub struct SecureIdSource;

impl IdSource for SecureIdSource {
    fn next_id(&mut self) -> u16 {
        rand::rng().random()
    }
}

/// Always the same ID.  Only for tests.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FixedIdSource(pub u16);

impl IdSource for FixedIdSource {
    fn next_id(&mut self) -> u16 {
        self.0
    }
}

/// A standard query for a single name, with recursion desired and a
/// fresh ID.
///
/// # Errors
///
/// If the name is not valid.
pub fn query_message(
    name: &str,
    qtype: QueryType,
    qclass: QueryClass,
    ids: &mut impl IdSource,
) -> Result<Message, BuildError> {
    let question = Question {
        name: DomainName::from_dotted_string(name)?,
        qtype,
        qclass,
    };

    Ok(Message::from_question(ids.next_id(), question))
}

/// Like `query_message`, but serialised ready to send.
///
/// # Errors
///
/// If the name is not valid.
pub fn build_query(
    name: &str,
    qtype: QueryType,
    qclass: QueryClass,
    ids: &mut impl IdSource,
) -> Result<BytesMut, BuildError> {
    let message = query_message(name, qtype, qclass, ids)?;
    Ok(message.to_octets()?)
}

/// Check a response is to this request:
///
/// - The IDs and opcodes match.
///
/// - It is a response.
///
/// - The question sections are identical.
///
/// Truncation and the rcode are not checked: a truncated or failed
/// response still answers the request.
pub fn response_matches_request(request: &Message, response: &Message) -> bool {
    if request.header.id != response.header.id {
        return false;
    }
    if !response.header.is_response {
        return false;
    }
    if request.header.opcode != response.header.opcode {
        return false;
    }
    if request.questions != response.questions {
        return false;
    }

    true
}

/// Errors encountered when building a query.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BuildError {
    Name(DomainNameFromStr),
    Serialise(serialise::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::Name(err) => write!(f, "invalid name: {err}"),
            BuildError::Serialise(err) => write!(f, "could not serialise query: {err}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Name(err) => Some(err),
            BuildError::Serialise(err) => Some(err),
        }
    }
}

impl From<DomainNameFromStr> for BuildError {
    fn from(err: DomainNameFromStr) -> Self {
        BuildError::Name(err)
    }
}

impl From<serialise::Error> for BuildError {
    fn from(err: serialise::Error) -> Self {
        BuildError::Serialise(err)
    }
}
