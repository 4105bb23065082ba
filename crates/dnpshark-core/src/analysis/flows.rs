use std::collections::HashMap;
use std::net::IpAddr;

use crate::FlowSummary;

use super::packet::{IpPacket, TransportKind};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub(crate) struct FlowKey {
    pub transport: TransportKind,
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl FlowKey {
    pub(crate) fn from_packet(packet: &IpPacket<'_>) -> Self {
        Self {
            transport: packet.transport,
            src_ip: packet.src_ip,
            src_port: packet.src_port,
            dst_ip: packet.dst_ip,
            dst_port: packet.dst_port,
        }
    }

    /// Key of the opposite direction.
    pub(crate) fn reversed(self) -> Self {
        Self {
            transport: self.transport,
            src_ip: self.dst_ip,
            src_port: self.dst_port,
            dst_ip: self.src_ip,
            dst_port: self.src_port,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct FlowStats {
    pub packets: u64,
    pub bytes: u64,
    pub frames: u64,
}

pub(crate) fn add_flow_stats(
    stats: &mut HashMap<FlowKey, FlowStats>,
    packet: &IpPacket<'_>,
    frames: u64,
) {
    let entry = stats.entry(FlowKey::from_packet(packet)).or_default();
    entry.packets += 1;
    entry.bytes += packet.payload.len() as u64;
    entry.frames += frames;
}

pub(crate) fn build_flow_summaries(
    stats: HashMap<FlowKey, FlowStats>,
    duration_s: Option<f64>,
) -> Vec<FlowSummary> {
    let mut flows: Vec<FlowSummary> = stats
        .into_iter()
        .map(|(key, stats)| {
            let (pps, bps) = duration_s
                .map(|d| (stats.packets as f64 / d, stats.bytes as f64 / d))
                .map(|(pps, bps)| (Some(pps), Some(bps)))
                .unwrap_or((None, None));

            FlowSummary {
                app_proto: "dnp3".to_string(),
                transport: key.transport.as_str().to_string(),
                src: format_endpoint(key.src_ip, key.src_port),
                dst: format_endpoint(key.dst_ip, key.dst_port),
                packets: stats.packets,
                bytes: stats.bytes,
                frames: stats.frames,
                pps,
                bps,
            }
        })
        .collect();

    flows.sort_by(|a, b| {
        a.src
            .cmp(&b.src)
            .then_with(|| a.dst.cmp(&b.dst))
            .then_with(|| a.transport.cmp(&b.transport))
    });
    flows
}

pub(crate) fn format_endpoint(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(addr) => format!("{}:{}", addr, port),
        IpAddr::V6(addr) => format!("[{}]:{}", addr, port),
    }
}
