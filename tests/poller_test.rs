use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use linktester::envelope::PollEnvelope;
use linktester::error::PollError;
use linktester::poller::Poller;
use linktester::report::{Section, SectionState};
use linktester::transport::{FetchError, Transport};
use serde_json::json;

/// Replays a canned sequence of fetch results, counting fetches.
struct ScriptedTransport {
    responses: VecDeque<Result<PollEnvelope, FetchError>>,
    fetches: Arc<AtomicU32>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<PollEnvelope, FetchError>>) -> (Self, Arc<AtomicU32>) {
        let fetches = Arc::new(AtomicU32::new(0));
        (
            ScriptedTransport {
                responses: responses.into(),
                fetches: fetches.clone(),
            },
            fetches,
        )
    }
}

impl Transport for ScriptedTransport {
    async fn fetch(&mut self) -> Result<PollEnvelope, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.responses
            .pop_front()
            .expect("transport script exhausted")
    }
}

fn fixture_payload() -> serde_json::Value {
    json!({
        "Ver": "2.4.1",
        "Name": "LINKTESTER-0042",
        "Dev": {
            "sn": "2014004242",
            "mac": "00c017-c2f3a1",
            "mode": "LT-2000",
            "swVer": "2.4.1",
            "build": "18",
            "ipaddr": "172.20.120.20"
        },
        "Res": {
            "PoE": {"res": "ok", "status": "green", "voltage": "52"},
            "Link": {
                "res": "ok", "status": "green", "rxPair": "12",
                "advSpeed": "10,100,1000", "advDuplex": "half,full",
                "actSpeed": "1000", "actDuplex": "full", "polarity": "normal"
            },
            "Switch": {
                "res": "ok", "status": "gray", "type": "CDP",
                "name": "sx1-0482-102tower-5th", "port": "Gi0/3,GigabitEthernet0/3",
                "vlan": "986", "vvlan": "", "model": "WS-C2960G-24TC-L",
                "addr": "172.31.16.52"
            },
            "IpConfig": {
                "res": "ok", "status": "green", "type": "DHCP",
                "addr": "172.22.181.24", "server": "155.97.186.76",
                "sub": "255.255.255.0", "dns": ["172.20.120.100", "172.20.120.101"]
            },
            "Router": {"res": "ok", "status": "green", "addr": "172.22.181.1", "connect": ["1", "1", "2"]},
            "WWW": {
                "res": "ok", "status": "green", "url": "www.google.com",
                "addr": "142.250.72.4", "port": "80", "type": "ping",
                "connect": ["12", "11", "14"]
            }
        }
    })
}

fn envelope(fin: u32, total: u32) -> PollEnvelope {
    serde_json::from_value(json!({
        "finItemCount": fin.to_string(),
        "totalItemCount": total.to_string(),
        "id": 1,
        "payload": fixture_payload()
    }))
    .unwrap()
}

fn fast_poller(transport: ScriptedTransport) -> Poller<ScriptedTransport> {
    Poller::new(transport).interval(Duration::from_millis(0))
}

#[tokio::test]
async fn test_progressing_run_retries_then_returns_report() {
    // The device finishes sub-tests between polls: 2, 3, 4, then all 5.
    let (transport, fetches) = ScriptedTransport::new(vec![
        Ok(envelope(2, 5)),
        Ok(envelope(3, 5)),
        Ok(envelope(4, 5)),
        Ok(envelope(5, 5)),
    ]);

    let report = fast_poller(transport).poll().await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 4);
    assert_eq!(report.section(Section::Gateway).state, SectionState::Green);
    assert_eq!(report.section(Section::Internet).state, SectionState::Green);
}

#[tokio::test]
async fn test_first_complete_envelope_short_circuits() {
    let (transport, fetches) = ScriptedTransport::new(vec![
        Ok(envelope(5, 5)),
        Ok(envelope(5, 5)), // never reached
    ]);

    fast_poller(transport).poll().await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stuck_run_times_out_with_no_partial_report() {
    let (transport, fetches) = ScriptedTransport::new(vec![
        Ok(envelope(2, 5)),
        Ok(envelope(2, 5)),
        Ok(envelope(2, 5)),
    ]);

    let result = fast_poller(transport).max_attempts(3).poll().await;
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
    match result {
        Err(PollError::Timeout { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transient_errors_consume_attempts_but_never_surface() {
    let (transport, fetches) = ScriptedTransport::new(vec![
        Err(FetchError::Network("connection refused".into())),
        Err(FetchError::Malformed("EOF while parsing a value".into())),
        Ok(envelope(5, 5)),
    ]);

    let report = fast_poller(transport).poll().await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
    assert_eq!(report.device.serial, "2014004242");
}

#[tokio::test]
async fn test_network_errors_alone_exhaust_the_budget() {
    let (transport, _) = ScriptedTransport::new(vec![
        Err(FetchError::Network("connection refused".into())),
        Err(FetchError::Network("connection refused".into())),
    ]);

    let result = fast_poller(transport).max_attempts(2).poll().await;
    assert!(matches!(result, Err(PollError::Timeout { attempts: 2 })));
}

#[tokio::test]
async fn test_missing_dev_block_on_completion_is_terminal() {
    let mut payload = fixture_payload();
    payload.as_object_mut().unwrap().remove("Dev");
    let envelope: PollEnvelope = serde_json::from_value(json!({
        "finItemCount": "5",
        "totalItemCount": "5",
        "id": 1,
        "payload": payload
    }))
    .unwrap();

    let (transport, fetches) = ScriptedTransport::new(vec![Ok(envelope)]);
    let result = fast_poller(transport).poll().await;
    // Terminal: no retry even though the attempt budget is not exhausted.
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(matches!(result, Err(PollError::Schema(_))));
}

#[tokio::test]
async fn test_zero_deadline_times_out_before_any_attempt() {
    let (transport, fetches) = ScriptedTransport::new(vec![Ok(envelope(5, 5))]);

    let result = fast_poller(transport)
        .deadline(Duration::from_secs(0))
        .poll()
        .await;
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
    assert!(matches!(result, Err(PollError::Timeout { attempts: 0 })));
}
