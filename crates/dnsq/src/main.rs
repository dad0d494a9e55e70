use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use dns_wire::protocol::query::{query_message, SecureIdSource};
use dns_wire::protocol::rdata::Registry;
use dns_wire::protocol::types::{
    Header, Message, QueryClass, QueryType, RecordClass, RecordType, ResourceRecord,
};

mod net;

use net::{hex, query_udp};

/// Render RDATA for display: interpreted if the registry knows the
/// type, otherwise in the generic `\# <len> <hex>` form.
fn format_rdata(registry: &Registry, message: &[u8], rr: &ResourceRecord) -> String {
    match registry.interpret(message, rr) {
        Some(Ok(rdata)) => rdata.to_string(),
        Some(Err(error)) => {
            tracing::warn!(name = %rr.name, rtype = %rr.rtype, %error, "could not interpret rdata");
            format_unknown_rdata(rr)
        }
        None => format_unknown_rdata(rr),
    }
}

fn format_unknown_rdata(rr: &ResourceRecord) -> String {
    if rr.rdata.is_empty() {
        "\\# 0".to_string()
    } else {
        format!("\\# {} {}", rr.rdata.len(), hex(&rr.rdata))
    }
}

fn format_flags(header: &Header) -> String {
    let mut flags = Vec::with_capacity(5);
    if header.is_response {
        flags.push("qr");
    }
    if header.is_authoritative {
        flags.push("aa");
    }
    if header.is_truncated {
        flags.push("tc");
    }
    if header.recursion_desired {
        flags.push("rd");
    }
    if header.recursion_available {
        flags.push("ra");
    }
    flags.join(" ")
}

fn print_header(response: &Message) {
    println!(
        ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
        response.header.opcode, response.header.rcode, response.header.id
    );
    println!(
        ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
        format_flags(&response.header),
        response.questions.len(),
        response.answers.len(),
        response.authority.len(),
        response.additional.len(),
    );
}

fn print_section(registry: &Registry, message: &[u8], heading: &str, rrs: &[ResourceRecord]) {
    if rrs.is_empty() {
        return;
    }

    println!("\n;; {heading}");
    for rr in rrs {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            rr.name,
            rr.ttl,
            rr.rclass,
            rr.rtype,
            format_rdata(registry, message, rr)
        );
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// the doc comments for this struct turn into the CLI help text
#[derive(Parser)]
/// DNS lookup utility
///
/// Sends a single query over UDP and prints the response.  Does not
/// retry over TCP if the response is truncated.
struct Args {
    /// Address of the nameserver to query
    #[clap(short, long, env = "DNSQ_ADDRESS", value_parser)]
    address: IpAddr,

    /// Domain name to look up
    #[clap(short = 'u', long, value_parser)]
    name: String,

    /// Query type to look up
    #[clap(short = 't', long, default_value_t = QueryType::Record(RecordType::A), value_parser)]
    qtype: QueryType,

    /// Port the nameserver listens on
    #[clap(short, long, default_value_t = 53, value_parser)]
    port: u16,

    /// Seconds to wait for a response
    #[clap(long, default_value_t = 5, value_parser)]
    timeout: u64,

    /// Log in JSON rather than plain text
    #[clap(long, action(clap::ArgAction::SetTrue))]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    init_tracing(args.json);

    let request = match query_message(
        &args.name,
        args.qtype,
        QueryClass::Record(RecordClass::IN),
        &mut SecureIdSource,
    ) {
        Ok(request) => request,
        Err(error) => {
            eprintln!("invalid query: {error}");
            process::exit(1);
        }
    };

    let address = SocketAddr::new(args.address, args.port);
    tracing::info!(%address, id = request.header.id, question = %request.questions[0], "querying");

    let (response, octets) =
        match query_udp(address, &request, Duration::from_secs(args.timeout)).await {
            Ok(res) => res,
            Err(error) => {
                tracing::error!(%address, %error, "query failed");
                eprintln!("{error}");
                process::exit(1);
            }
        };

    if response.header.is_truncated {
        tracing::warn!(id = response.header.id, "response is truncated");
    }

    let registry = Registry::with_defaults();

    print_header(&response);

    println!("\n;; QUESTION");
    for question in &response.questions {
        println!("{question}");
    }

    print_section(&registry, &octets, "ANSWER", &response.answers);
    print_section(&registry, &octets, "AUTHORITY", &response.authority);
    print_section(&registry, &octets, "ADDITIONAL", &response.additional);
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use dns_wire::protocol::types::test_util::*;

    use super::*;

    #[test]
    fn args_require_name() {
        assert!(Args::try_parse_from(["dnsq", "-a", "127.0.0.1"]).is_err());
    }

    #[test]
    fn args_reject_bad_address() {
        assert!(Args::try_parse_from(["dnsq", "-a", "localhost", "-u", "example.com"]).is_err());
    }

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["dnsq", "-a", "127.0.0.1", "-u", "example.com"]).unwrap();
        assert_eq!(IpAddr::V4(Ipv4Addr::LOCALHOST), args.address);
        assert_eq!("example.com", args.name);
        assert_eq!(QueryType::Record(RecordType::A), args.qtype);
        assert_eq!(53, args.port);
        assert_eq!(5, args.timeout);
        assert!(!args.json);
    }

    #[test]
    fn args_parse_qtype() {
        let args = Args::try_parse_from([
            "dnsq", "-a", "::1", "-u", "example.com", "-t", "mx", "-p", "5353",
        ])
        .unwrap();
        assert_eq!(QueryType::Record(RecordType::MX), args.qtype);
        assert_eq!(5353, args.port);
    }

    #[test]
    fn format_flags_lists_set_bits_in_order() {
        let mut header = Message::from_question(1, question()).make_response().header;
        header.is_truncated = true;
        assert_eq!("qr tc rd ra", format_flags(&header));

        let query = Message::from_question(1, question()).header;
        assert_eq!("rd", format_flags(&query));
    }

    #[test]
    fn format_rdata_interprets_known_types() {
        let rr = a_record("www.example.com.", Ipv4Addr::new(192, 0, 2, 1));
        let rdata = format_rdata(&Registry::with_defaults(), &rr.rdata, &rr);
        assert_eq!("192.0.2.1", rdata);
    }

    #[test]
    fn format_rdata_falls_back_to_hex() {
        let rr = unknown_record("www.example.com.", &[1, 2, 0xab]);
        assert_eq!(
            "\\# 3 0102ab",
            format_rdata(&Registry::with_defaults(), &rr.rdata, &rr)
        );
    }

    #[test]
    fn format_rdata_falls_back_to_hex_on_bad_rdata() {
        let rr = ResourceRecord::new(
            domain("www.example.com."),
            RecordType::A,
            RecordClass::IN,
            300,
            vec![1, 2, 3].into(),
        );
        assert_eq!(
            "\\# 3 010203",
            format_rdata(&Registry::with_defaults(), &rr.rdata, &rr)
        );
    }

    #[test]
    fn format_unknown_rdata_empty() {
        let rr = unknown_record("www.example.com.", &[]);
        assert_eq!("\\# 0", format_unknown_rdata(&rr));
    }

    fn question() -> dns_wire::protocol::types::Question {
        dns_wire::protocol::types::Question {
            name: domain("www.example.com."),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        }
    }
}
