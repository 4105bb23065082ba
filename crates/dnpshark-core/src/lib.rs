//! DNPShark core library for post-mortem DNP3 capture analysis.
//!
//! This crate implements the offline analysis pipeline used by the CLI:
//! packet sources feed the analysis layer, which drives the DNP3 decoder
//! (link, transport, application and object layers) and aggregates results
//! into a deterministic report. Decoding is byte-oriented and side-effect
//! free; all I/O is isolated in `source` modules.
//!
//! Invariants:
//! - Report outputs are deterministic and stable across runs.
//! - Transport segments are reassembled statefully per conversation.
//! - Malformed input is reported as annotations and never panics.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur d'analyse hors ligne : sources -> analyse ->
//! décodeur DNP3 (liaison, transport, application, objets) -> rapport
//! déterministe. Les E/S restent dans `source`. Les anomalies de décodage
//! deviennent des annotations, jamais des paniques.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use dnpshark_core::analyze_pcap_file;
//!
//! let report = analyze_pcap_file(Path::new("capture.pcapng"))?;
//! println!("report version: {}", report.report_version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod analysis;
pub mod protocols;
mod source;

pub use analysis::{
    AnalysisConfig, AnalysisError, DEFAULT_DNP3_PORT, analyze_pcap_file, analyze_pcap_file_with,
    analyze_source,
};
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated analysis report with deterministic ordering.
///
/// # Examples
/// ```
/// use dnpshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, dnpshark_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Optional capture summary (may be empty when unavailable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Flow summaries in stable order.
    pub flows: Vec<FlowSummary>,
    /// Per link address pair summaries in stable order.
    pub stations: Vec<StationSummary>,
    /// Decoded application messages in capture order (bounded).
    pub messages: Vec<MessageRecord>,
    /// Protocol compliance summaries in stable order.
    pub compliance: Vec<ComplianceSummary>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use dnpshark_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "dnpshark".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "dnpshark");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "dnpshark").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
///
/// # Examples
/// ```
/// use dnpshark_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     dnp3_packets: 4,
///     dnp3_frames: 5,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.packets_total, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total packet count observed in the capture.
    pub packets_total: u64,
    /// Packets whose payload was handed to the DNP3 decoder.
    pub dnp3_packets: u64,
    /// Link frames decoded.
    pub dnp3_frames: u64,
    /// RFC3339 timestamp of the first packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Flow-level summary for one directed endpoint pair.
///
/// # Examples
/// ```
/// use dnpshark_core::FlowSummary;
///
/// let flow = FlowSummary {
///     app_proto: "dnp3".to_string(),
///     transport: "tcp".to_string(),
///     src: "192.168.0.1:49152".to_string(),
///     dst: "192.168.0.2:20000".to_string(),
///     packets: 2,
///     bytes: 40,
///     frames: 2,
///     pps: None,
///     bps: None,
/// };
/// assert_eq!(flow.app_proto, "dnp3");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSummary {
    /// Application protocol name ("dnp3").
    pub app_proto: String,
    /// Transport protocol ("tcp" or "udp").
    pub transport: String,
    /// Source endpoint in `ip:port` form.
    pub src: String,
    /// Destination endpoint in `ip:port` form.
    pub dst: String,
    /// Packets carrying DNP3 payload.
    pub packets: u64,
    /// Payload bytes.
    pub bytes: u64,
    /// Link frames decoded from this flow.
    pub frames: u64,
    /// Packets per second over the capture duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pps: Option<f64>,
    /// Bytes per second over the capture duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bps: Option<f64>,
}

/// Activity between one link source and one link destination.
///
/// # Examples
/// ```
/// use dnpshark_core::StationSummary;
///
/// let station = StationSummary {
///     link_source: 1,
///     link_destination: 10,
///     frames: 3,
///     messages: 1,
///     discarded_segments: 0,
///     link_functions: Default::default(),
///     app_functions: Default::default(),
///     iin_flags: Vec::new(),
///     requested_classes: vec![0, 1],
/// };
/// assert_eq!(station.link_destination, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSummary {
    pub link_source: u16,
    pub link_destination: u16,
    /// Link frames sent from source to destination.
    pub frames: u64,
    /// Application messages reassembled.
    pub messages: u64,
    /// Transport segments dropped by reassembly.
    pub discarded_segments: u64,
    /// Link function name -> frame count.
    pub link_functions: BTreeMap<String, u64>,
    /// Application function name -> message count.
    pub app_functions: BTreeMap<String, u64>,
    /// Every internal indication seen in responses, by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iin_flags: Vec<String>,
    /// Event classes requested by READ (0 is static data).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requested_classes: Vec<u8>,
}

/// One decoded application message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// RFC3339 timestamp of the packet completing the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    /// Source endpoint in `ip:port` form.
    pub src: String,
    /// Destination endpoint in `ip:port` form.
    pub dst: String,
    pub link_source: u16,
    pub link_destination: u16,
    /// Link direction bit: true when sent by the master.
    pub from_master: bool,
    pub function: String,
    pub function_code: u8,
    /// Application sequence number.
    pub sequence: u8,
    /// Internal indications, by name (responses only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iin: Vec<String>,
    /// Decoded object records.
    pub objects: serde_json::Value,
    /// Violation ids raised while decoding this message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

/// Compliance summary for a protocol.
///
/// # Examples
/// ```
/// use dnpshark_core::{ComplianceSummary, Violation};
///
/// let summary = ComplianceSummary {
///     protocol: "dnp3".to_string(),
///     compliance_percentage: 50.0,
///     violations: vec![Violation {
///         id: "DNP3-LINK-HEADER-CRC".to_string(),
///         severity: "warning".to_string(),
///         message: "Link header checksum mismatch".to_string(),
///         count: 1,
///         examples: Vec::new(),
///     }],
/// };
/// assert_eq!(summary.violations.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    /// Protocol name ("dnp3").
    pub protocol: String,
    /// Compliance percentage (0.0–100.0).
    pub compliance_percentage: f64,
    /// Violations sorted by severity and ID.
    pub violations: Vec<Violation>,
}

/// Single compliance violation record.
///
/// # Examples
/// ```
/// use dnpshark_core::Violation;
///
/// let violation = Violation {
///     id: "DNP3-LINK-CHUNK-CRC".to_string(),
///     severity: "error".to_string(),
///     message: "Data chunk checksum mismatch, frame payload discarded".to_string(),
///     count: 1,
///     examples: vec!["10.0.0.1:49152 -> 10.0.0.2:20000 @ 1970-01-01T00:00:00Z".to_string()],
/// };
/// assert_eq!(violation.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Stable violation identifier (e.g., `DNP3-APP-ITEM-COUNT`).
    pub id: String,
    /// Severity label (`error` or `warning`).
    pub severity: String,
    /// Human-readable message explaining the violation.
    pub message: String,
    /// Number of occurrences aggregated into this violation.
    pub count: u64,
    /// At most three example contexts, formatted as `src -> dst @ ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use dnpshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, dnpshark_core::REPORT_VERSION);
/// assert!(report.messages.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "dnpshark".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        flows: vec![],
        stations: vec![],
        messages: vec![],
        compliance: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("capture.pcapng", 1);
        report.capture_summary = Some(CaptureSummary {
            packets_total: 1,
            dnp3_packets: 1,
            dnp3_frames: 1,
            time_start: None,
            time_end: None,
        });
        report.flows.push(FlowSummary {
            app_proto: "dnp3".to_string(),
            transport: "udp".to_string(),
            src: "10.0.0.1:20000".to_string(),
            dst: "10.0.0.2:20000".to_string(),
            packets: 1,
            bytes: 10,
            frames: 1,
            pps: None,
            bps: None,
        });
        report.stations.push(StationSummary {
            link_source: 1,
            link_destination: 10,
            frames: 1,
            messages: 0,
            discarded_segments: 0,
            link_functions: BTreeMap::new(),
            app_functions: BTreeMap::new(),
            iin_flags: Vec::new(),
            requested_classes: Vec::new(),
        });

        let value = serde_json::to_value(&report).expect("report json");
        let capture = value.get("capture_summary").expect("capture_summary");
        assert!(capture.get("time_start").is_none());
        assert!(capture.get("time_end").is_none());

        let flow = &value["flows"][0];
        assert!(flow.get("pps").is_none());
        assert!(flow.get("bps").is_none());

        let station = &value["stations"][0];
        assert!(station.get("iin_flags").is_none());
        assert!(station.get("requested_classes").is_none());
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = make_stub_report("capture.pcapng", 7);
        let json = serde_json::to_string(&report).expect("report json");
        let parsed: Report = serde_json::from_str(&json).expect("report parse");
        assert_eq!(parsed.input.bytes, 7);
        assert_eq!(parsed.tool.name, "dnpshark");
    }
}
