use std::fmt;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use dns_wire::protocol::deserialise;
use dns_wire::protocol::query::response_matches_request;
use dns_wire::protocol::serialise;
use dns_wire::protocol::types::Message;

/// Largest message which can be sent or received over UDP without
/// EDNS.
pub const UDP_MESSAGE_MAX_LEN: usize = 512;

/// Send a query to a nameserver over UDP, returning the response and
/// the octets it was decoded from.  The response is checked against
/// the request, but truncation is not: that is up to the caller.
///
/// # Errors
///
/// If sending or receiving fails, no response arrives in time, or the
/// response cannot be decoded or is not for this request.
pub async fn query_udp(
    address: SocketAddr,
    request: &Message,
    timeout_duration: Duration,
) -> Result<(Message, Vec<u8>), QueryError> {
    let serialised_request = request.to_octets().map_err(QueryError::Serialise)?;

    tracing::debug!(
        %address,
        id = request.header.id,
        octets = %hex(&serialised_request),
        "sending query"
    );

    let octets = match timeout(
        timeout_duration,
        query_udp_notimeout(address, &serialised_request),
    )
    .await
    {
        Ok(res) => res.map_err(QueryError::Io)?,
        Err(_) => return Err(QueryError::Timeout(timeout_duration)),
    };

    tracing::debug!(%address, octets = %hex(&octets), "got response");

    let response = Message::from_octets(&octets).map_err(QueryError::Deserialise)?;
    if !response_matches_request(request, &response) {
        return Err(QueryError::Mismatch {
            expected_id: request.header.id,
            actual_id: response.header.id,
        });
    }

    Ok((response, octets))
}

/// Timeout-less version of `query_udp`.
async fn query_udp_notimeout(
    address: SocketAddr,
    serialised_request: &[u8],
) -> Result<Vec<u8>, io::Error> {
    let bind_address = if address.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };

    let sock = UdpSocket::bind(bind_address).await?;
    sock.connect(address).await?;
    sock.send(serialised_request).await?;

    let mut buf = vec![0u8; UDP_MESSAGE_MAX_LEN];
    let size = sock.recv(&mut buf).await?;
    buf.truncate(size);

    Ok(buf)
}

/// Lowercase hex, two digits per octet.
pub fn hex(octets: &[u8]) -> String {
    octets.iter().map(|octet| format!("{octet:02x}")).collect()
}

/// Errors encountered when querying a nameserver.
#[derive(Debug)]
pub enum QueryError {
    Io(io::Error),
    Timeout(Duration),
    Serialise(serialise::Error),
    Deserialise(deserialise::Error),
    Mismatch { expected_id: u16, actual_id: u16 },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryError::Io(err) => write!(f, "network error: {err}"),
            QueryError::Timeout(duration) => {
                write!(f, "no response after {}s", duration.as_secs_f32())
            }
            QueryError::Serialise(err) => write!(f, "could not serialise query: {err}"),
            QueryError::Deserialise(err) => write!(f, "could not parse response: {err}"),
            QueryError::Mismatch {
                expected_id,
                actual_id,
            } => write!(
                f,
                "response (id {actual_id}) does not match query (id {expected_id})"
            ),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Io(err) => Some(err),
            QueryError::Serialise(err) => Some(err),
            QueryError::Deserialise(err) => Some(err),
            QueryError::Timeout(_) | QueryError::Mismatch { .. } => None,
        }
    }
}
