//! hickory SRV backend tests against a local UDP nameserver
//!
//! The nameserver records every question it receives, so tests can assert on
//! the exact names put on the wire as well as on the decoded answers.

use hickory_resolver::config::{NameServerConfig, ResolverConfig};
use hickory_resolver::proto::op::{Message, MessageType, ResponseCode};
use hickory_resolver::proto::rr::rdata::SRV;
use hickory_resolver::proto::rr::{Name, RData, Record};
use hickory_resolver::proto::xfer::Protocol;
use opencap_client::{
    DnsConfig, DnsProvider, Error, HickorySrvLookup, ServiceResolver, SrvLookup, SrvRecord,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;

/// Zone served by the local nameserver
#[derive(Clone)]
enum Zone {
    /// Every question gets NXDOMAIN
    Empty,
    /// Every question gets these (priority, weight, port, target) SRV answers
    Srv(Vec<(u16, u16, u16, &'static str)>),
}

/// Spawn a UDP nameserver on localhost; returns its address and question log
async fn serve_zone(zone: Zone) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let questions = Arc::new(Mutex::new(Vec::new()));
    let log = questions.clone();

    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            let (n, peer) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(_) => return,
            };
            let request = match Message::from_vec(&buf[..n]) {
                Ok(request) => request,
                Err(_) => continue,
            };

            let mut response = Message::new();
            response
                .set_id(request.id())
                .set_message_type(MessageType::Response)
                .set_op_code(request.op_code())
                .set_recursion_desired(request.recursion_desired())
                .set_recursion_available(true)
                .set_authoritative(true);

            for query in request.queries() {
                log.lock().unwrap().push(query.name().to_ascii());
                response.add_query(query.clone());

                match &zone {
                    Zone::Empty => {
                        response.set_response_code(ResponseCode::NXDomain);
                    }
                    Zone::Srv(records) => {
                        response.set_response_code(ResponseCode::NoError);
                        for (priority, weight, port, target) in records {
                            let target = Name::from_ascii(target).unwrap();
                            let srv = SRV::new(*priority, *weight, *port, target);
                            response.add_answer(Record::from_rdata(
                                query.name().clone(),
                                300,
                                RData::SRV(srv),
                            ));
                        }
                    }
                }
            }

            let bytes = response.to_vec().unwrap();
            if socket.send_to(&bytes, peer).await.is_err() {
                return;
            }
        }
    });

    (addr, questions)
}

fn custom_lookup(addr: SocketAddr) -> HickorySrvLookup {
    HickorySrvLookup::new(&DnsConfig::new(DnsProvider::Custom(vec![addr]))).unwrap()
}

#[tokio::test]
async fn test_query_name_ignores_search_domains() {
    let (addr, questions) = serve_zone(Zone::Empty).await;

    let config = ResolverConfig::from_parts(
        None,
        vec![Name::from_ascii("corp.internal.").unwrap()],
        vec![NameServerConfig::new(addr, Protocol::Udp)],
    );
    let resolver = ServiceResolver::new(HickorySrvLookup::with_resolver_config(config));

    let err = resolver.resolve_target("example.com").await.unwrap_err();

    assert!(err.is_resolution());
    assert!(matches!(
        err,
        Error::Resolution { ref name, .. } if name == "_opencap._tcp.example.com"
    ));
    assert_eq!(
        *questions.lock().unwrap(),
        vec!["_opencap._tcp.example.com.".to_string()]
    );
}

#[tokio::test]
async fn test_records_keep_wire_order() {
    let (addr, questions) = serve_zone(Zone::Srv(vec![
        (20, 0, 4443, "backup.example.com."),
        (0, 100, 443, "primary.example.com."),
    ]))
    .await;

    let records = custom_lookup(addr)
        .lookup_srv("_opencap._tcp.example.com")
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            SrvRecord::new("backup.example.com.", 4443, 20, 0),
            SrvRecord::new("primary.example.com.", 443, 0, 100),
        ]
    );
    assert_eq!(questions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolved_target_drops_root_dot() {
    let (addr, questions) = serve_zone(Zone::Srv(vec![(0, 0, 4443, "srv.example.com.")])).await;
    let resolver = ServiceResolver::new(custom_lookup(addr));

    let target = resolver.resolve_alias("user@example.com").await.unwrap();

    assert_eq!(target.host, "srv.example.com");
    assert_eq!(target.base_url(), "https://srv.example.com:4443");
    assert_eq!(
        *questions.lock().unwrap(),
        vec!["_opencap._tcp.example.com.".to_string()]
    );
}

#[tokio::test]
async fn test_idn_target_stays_ascii() {
    let (addr, _) = serve_zone(Zone::Srv(vec![(0, 0, 443, "xn--bcher-kva.example.")])).await;
    let resolver = ServiceResolver::new(custom_lookup(addr));

    let target = resolver.resolve_target("example.com").await.unwrap();

    assert_eq!(target.host, "xn--bcher-kva.example");
    assert_eq!(target.base_url(), "https://xn--bcher-kva.example:443");
}

#[tokio::test]
async fn test_root_target_means_no_service() {
    let (addr, _) = serve_zone(Zone::Srv(vec![(0, 0, 0, ".")])).await;
    let resolver = ServiceResolver::new(custom_lookup(addr));

    let err = resolver.resolve_target("example.com").await.unwrap_err();

    assert!(err.is_resolution());
    assert!(matches!(
        err,
        Error::ServiceUnavailable { ref name } if name == "_opencap._tcp.example.com"
    ));
}
