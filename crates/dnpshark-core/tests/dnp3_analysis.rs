use std::path::PathBuf;

use dnpshark_core::{AnalysisConfig, Report, analyze_pcap_file, analyze_pcap_file_with};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
        .join("dnp3")
        .join("session.pcapng")
}

fn analyze() -> Report {
    analyze_pcap_file(&fixture()).unwrap()
}

#[test]
fn capture_summary_counts_frames() {
    let report = analyze();
    let summary = report.capture_summary.as_ref().unwrap();
    assert_eq!(summary.packets_total, 8);
    assert_eq!(summary.dnp3_packets, 8);
    assert_eq!(summary.dnp3_frames, 8);
    assert_eq!(summary.time_start.as_deref(), Some("2023-11-14T22:13:20Z"));
    assert_eq!(summary.time_end.as_deref(), Some("2023-11-14T22:13:27Z"));
    assert_eq!(report.generated_at, "2023-11-14T22:13:27Z");
    assert_eq!(report.tool.name, "dnpshark");
}

#[test]
fn flows_are_split_by_direction() {
    let report = analyze();
    assert_eq!(report.flows.len(), 2);
    let master = &report.flows[0];
    assert_eq!(master.src, "10.0.0.1:49152");
    assert_eq!(master.dst, "10.0.0.2:20000");
    assert_eq!(master.transport, "tcp");
    assert_eq!(master.app_proto, "dnp3");
    assert_eq!(master.packets, 4);
    assert_eq!(master.frames, 4);
    let outstation = &report.flows[1];
    assert_eq!(outstation.src, "10.0.0.2:20000");
    assert_eq!(outstation.packets, 4);
}

#[test]
fn stations_aggregate_functions_iin_and_classes() {
    let report = analyze();
    assert_eq!(report.stations.len(), 2);

    let master = &report.stations[0];
    assert_eq!((master.link_source, master.link_destination), (1, 10));
    assert_eq!(master.frames, 4);
    assert_eq!(master.messages, 1);
    assert_eq!(master.link_functions["Request Link Status"], 2);
    assert_eq!(master.link_functions["Unconfirmed User Data"], 2);
    assert_eq!(master.app_functions["Read"], 1);
    assert_eq!(master.requested_classes, vec![0, 1, 2, 3]);
    assert!(master.iin_flags.is_empty());

    let outstation = &report.stations[1];
    assert_eq!((outstation.link_source, outstation.link_destination), (10, 1));
    assert_eq!(outstation.frames, 4);
    assert_eq!(outstation.messages, 2);
    assert_eq!(outstation.discarded_segments, 0);
    assert_eq!(outstation.link_functions["Status of Link"], 1);
    assert_eq!(outstation.app_functions["Response"], 1);
    assert_eq!(outstation.app_functions["Unsolicited Response"], 1);
    assert_eq!(
        outstation.iin_flags,
        vec![
            "Time Sync Required from Master",
            "Device Restart",
            "Requested Objects Unknown",
        ]
    );
}

#[test]
fn multi_segment_response_is_reassembled() {
    let report = analyze();
    assert_eq!(report.messages.len(), 3);

    let response = &report.messages[1];
    assert_eq!(response.function, "Response");
    assert!(!response.from_master);
    assert_eq!(response.src, "10.0.0.2:20000");
    assert_eq!(response.ts.as_deref(), Some("2023-11-14T22:13:24Z"));
    assert_eq!(response.iin, vec!["Time Sync Required from Master", "Device Restart"]);

    let objects = response.objects.as_array().unwrap();
    assert_eq!(objects.len(), 3);
    assert_eq!(objects[0]["group"], 1);
    assert_eq!(objects[0]["count"], 3);
    assert_eq!(objects[1]["group"], 30);
    assert_eq!(objects[1]["points"].as_array().unwrap().len(), 2);
    assert_eq!(objects[2]["group"], 20);
    assert!(response.violations.is_empty());

    let unsolicited = &report.messages[2];
    assert_eq!(unsolicited.function, "Unsolicited Response");
    assert_eq!(unsolicited.violations, vec!["DNP3-APP-IIN"]);
}

#[test]
fn compliance_lists_corrupt_frames_and_abnormal_iin() {
    let report = analyze();
    assert_eq!(report.compliance.len(), 1);
    let compliance = &report.compliance[0];
    assert_eq!(compliance.protocol, "dnp3");
    assert_eq!(compliance.compliance_percentage, 62.5);

    let ids: Vec<&str> = compliance
        .violations
        .iter()
        .map(|violation| violation.id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["DNP3-LINK-CHUNK-CRC", "DNP3-APP-IIN", "DNP3-LINK-HEADER-CRC"]
    );
    assert_eq!(compliance.violations[0].severity, "error");
    assert_eq!(
        compliance.violations[0].examples,
        vec!["10.0.0.1:49152 -> 10.0.0.2:20000 @ 2023-11-14T22:13:25Z"]
    );
    assert!(compliance.violations.iter().all(|violation| violation.count == 1));
}

#[test]
fn other_port_without_heuristics_finds_nothing() {
    let config = AnalysisConfig {
        dnp3_port: 20001,
        heuristics: false,
        ..AnalysisConfig::default()
    };
    let report = analyze_pcap_file_with(&fixture(), &config).unwrap();
    let summary = report.capture_summary.as_ref().unwrap();
    assert_eq!(summary.packets_total, 8);
    assert_eq!(summary.dnp3_frames, 0);
    assert!(report.messages.is_empty());
    assert!(report.compliance.is_empty());
}

#[test]
fn message_limit_caps_records() {
    let config = AnalysisConfig {
        max_messages: 1,
        ..AnalysisConfig::default()
    };
    let report = analyze_pcap_file_with(&fixture(), &config).unwrap();
    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.messages[0].function, "Read");
    assert_eq!(report.stations[1].messages, 2);
}
