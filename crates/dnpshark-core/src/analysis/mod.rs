//! Capture analysis: packet extraction, DNP3 decoding and report aggregation.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};

use crate::protocols::dnp3::annotation::{AnnotationKind, Severity};
use crate::protocols::dnp3::link::looks_like_frame;
use crate::protocols::dnp3::{
    DecodedFrame, DecoderConfig, Dnp3Decoder, FrameSplitter, split_datagram,
};
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Report, make_stub_report};

mod compliance;
mod flows;
mod messages;
pub(crate) mod packet;
mod stations;

use compliance::{ComplianceStats, build_compliance};
use flows::{FlowKey, FlowStats, add_flow_stats, build_flow_summaries, format_endpoint};
use messages::MessageLog;
use packet::{IpPacket, TransportKind, parse_ip_packet};
use stations::{StationKey, StationStats, add_station_frame, build_station_summaries};

/// Registered DNP3 port for TCP and UDP.
pub const DEFAULT_DNP3_PORT: u16 = 20000;
const DEFAULT_MAX_MESSAGES: usize = 1000;

/// Knobs for one analysis run.
///
/// # Examples
/// ```
/// use dnpshark_core::AnalysisConfig;
///
/// let config = AnalysisConfig {
///     dnp3_port: 20001,
///     ..AnalysisConfig::default()
/// };
/// assert!(config.heuristics);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Payloads to or from this port are decoded as DNP3.
    pub dnp3_port: u16,
    /// Also decode payloads on other ports that start with a valid link header.
    pub heuristics: bool,
    /// Upper bound on message records kept in the report.
    pub max_messages: usize,
    pub decoder: DecoderConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dnp3_port: DEFAULT_DNP3_PORT,
            heuristics: true,
            max_messages: DEFAULT_MAX_MESSAGES,
            decoder: DecoderConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn analyze_pcap_file(path: &Path) -> Result<Report, AnalysisError> {
    analyze_pcap_file_with(path, &AnalysisConfig::default())
}

pub fn analyze_pcap_file_with(
    path: &Path,
    config: &AnalysisConfig,
) -> Result<Report, AnalysisError> {
    let source = PcapFileSource::open(path)?;
    analyze_source(path, source, config)
}

/// Running state for one capture.
struct Pipeline {
    config: AnalysisConfig,
    decoder: Dnp3Decoder,
    splitters: HashMap<FlowKey, FrameSplitter>,
    flow_stats: HashMap<FlowKey, FlowStats>,
    station_stats: HashMap<StationKey, StationStats>,
    compliance: ComplianceStats,
    messages: MessageLog,
    dnp3_packets: u64,
    /// Stream bytes skipped by splitters already dropped at session end.
    skipped_stream_bytes: usize,
}

impl Pipeline {
    fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: *config,
            decoder: Dnp3Decoder::new(config.decoder),
            splitters: HashMap::new(),
            flow_stats: HashMap::new(),
            station_stats: HashMap::new(),
            compliance: ComplianceStats::default(),
            messages: MessageLog::new(config.max_messages),
            dnp3_packets: 0,
            skipped_stream_bytes: 0,
        }
    }

    fn is_dnp3(&self, packet: &IpPacket<'_>) -> bool {
        if packet.has_port(self.config.dnp3_port) {
            return true;
        }
        if packet.transport == TransportKind::Tcp
            && self.splitters.contains_key(&FlowKey::from_packet(packet))
        {
            return true;
        }
        self.config.heuristics && looks_like_frame(packet.payload)
    }

    fn handle_packet(&mut self, packet: &IpPacket<'_>, ts: Option<f64>) {
        if !packet.payload.is_empty() && self.is_dnp3(packet) {
            self.decode_payload(packet, ts);
        }
        if packet.closing {
            self.end_session(packet);
        }
    }

    /// TCP FIN or RST: drop both stream buffers and the reassembly state of
    /// the host pair.
    fn end_session(&mut self, packet: &IpPacket<'_>) {
        let key = FlowKey::from_packet(packet);
        let mut tracked = false;
        for key in [key, key.reversed()] {
            if let Some(splitter) = self.splitters.remove(&key) {
                self.skipped_stream_bytes += splitter.skipped();
                tracked = true;
            }
        }
        if !tracked {
            return;
        }
        let evicted = self.decoder.end_session(packet.src_ip, packet.dst_ip);
        debug!(
            src = %format_endpoint(packet.src_ip, packet.src_port),
            dst = %format_endpoint(packet.dst_ip, packet.dst_port),
            evicted,
            "TCP session closed"
        );
    }

    fn decode_payload(&mut self, packet: &IpPacket<'_>, ts: Option<f64>) {
        self.dnp3_packets += 1;

        let frames: Vec<Vec<u8>> = match packet.transport {
            TransportKind::Tcp => self
                .splitters
                .entry(FlowKey::from_packet(packet))
                .or_default()
                .push(packet.payload),
            TransportKind::Udp => split_datagram(packet.payload)
                .into_iter()
                .map(<[u8]>::to_vec)
                .collect(),
        };
        add_flow_stats(&mut self.flow_stats, packet, frames.len() as u64);

        let src = format_endpoint(packet.src_ip, packet.src_port);
        let dst = format_endpoint(packet.dst_ip, packet.dst_port);
        let ts_text = ts_to_rfc3339(ts);
        for frame in &frames {
            match self
                .decoder
                .decode_frame(Some((packet.src_ip, packet.dst_ip)), frame)
            {
                Ok(Some(decoded)) => {
                    self.record_frame(&decoded, &src, &dst, ts_text.clone());
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(%src, %dst, error = %err, "frame not decoded");
                    self.compliance.add_frame(
                        [(err.annotation_kind(), Severity::Fatal)],
                        &src,
                        &dst,
                        ts_text.as_deref(),
                    );
                }
            }
        }
    }

    fn record_frame(&mut self, decoded: &DecodedFrame, src: &str, dst: &str, ts: Option<String>) {
        debug!(
            source = decoded.link.source,
            destination = decoded.link.destination,
            function = decoded.link.function.name(),
            "frame decoded"
        );
        add_station_frame(&mut self.station_stats, decoded);
        let findings: Vec<(AnnotationKind, Severity)> = decoded
            .all_annotations()
            .map(|annotation| (annotation.kind, annotation.severity))
            .collect();
        self.compliance.add_frame(findings, src, dst, ts.as_deref());
        self.messages.push(decoded, src, dst, ts);
    }
}

pub fn analyze_source<S: PacketSource>(
    path: &Path,
    mut source: S,
    config: &AnalysisConfig,
) -> Result<Report, AnalysisError> {
    let mut packets_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut pipeline = Pipeline::new(config);

    info!(path = %path.display(), port = config.dnp3_port, "analysis started");
    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        if let Ok(Some(packet)) = parse_ip_packet(linktype, &data) {
            pipeline.handle_packet(&packet, ts);
        }
    }

    let dnp3_frames = pipeline.compliance.frames();
    let skipped = pipeline.skipped_stream_bytes
        + pipeline
            .splitters
            .values()
            .map(FrameSplitter::skipped)
            .sum::<usize>();
    info!(
        packets_total,
        dnp3_packets = pipeline.dnp3_packets,
        dnp3_frames,
        skipped_stream_bytes = skipped,
        dropped_messages = pipeline.messages.dropped(),
        "analysis finished"
    );

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        dnp3_packets: pipeline.dnp3_packets,
        dnp3_frames,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    let duration_s = match (first_ts, last_ts) {
        (Some(start), Some(end)) if end > start => Some(end - start),
        _ => None,
    };

    report.flows = build_flow_summaries(pipeline.flow_stats, duration_s);
    report.stations = build_station_summaries(pipeline.station_stats);
    report.compliance = build_compliance(pipeline.compliance);
    report.messages = pipeline.messages.into_records();
    Ok(report)
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let ts = match ts {
        Some(ts) => ts,
        None => return,
    };
    match first {
        None => *first = Some(ts),
        Some(existing) => {
            if ts < *existing {
                *first = Some(ts);
            }
        }
    }
    match last {
        None => *last = Some(ts),
        Some(existing) => {
            if ts > *existing {
                *last = Some(ts);
            }
        }
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
