use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dnpshark_core::{PacketSource, PcapFileSource, SourceError};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

#[test]
fn pcap_source_reads_packets_from_fixture() {
    let path = repo_root()
        .join("tests")
        .join("fixtures")
        .join("dnp3")
        .join("session.pcapng");
    let mut source = PcapFileSource::open(&path).unwrap();

    let mut packets = 0;
    let mut first_ts = None;
    while let Some(event) = source.next_packet().unwrap() {
        if first_ts.is_none() {
            first_ts = event.ts;
        }
        packets += 1;
    }

    assert_eq!(packets, 8);
    assert_eq!(first_ts, Some(1_700_000_000.0));
}

#[test]
fn pcap_source_rejects_truncated_file() {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("dnpshark_truncated_{unique}.pcapng"));

    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();
    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    let _ = fs::remove_file(&path);

    assert!(matches!(err, SourceError::Io(_)));
}
