use std::net::IpAddr;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;
use serde::Serialize;

use super::error::PacketError;
use super::reader::PacketReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Tcp,
    Udp,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Tcp => "tcp",
            TransportKind::Udp => "udp",
        }
    }
}

/// TCP or UDP packet with source/destination endpoints.
pub struct IpPacket<'a> {
    pub transport: TransportKind,
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub payload: &'a [u8],
    /// TCP segment with FIN or RST set.
    pub closing: bool,
}

impl IpPacket<'_> {
    pub fn has_port(&self, port: u16) -> bool {
        self.src_port == port || self.dst_port == port
    }
}

/// Parse a TCP or UDP packet from a link-layer frame.
///
/// Returns `Ok(None)` for other transports and unsupported link types.
pub fn parse_ip_packet(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<IpPacket<'_>>, PacketError> {
    let sliced = match linktype {
        Linktype::ETHERNET => {
            SlicedPacket::from_ethernet(data).map_err(|e| PacketError::Slice(e.to_string()))?
        }
        Linktype::RAW => {
            SlicedPacket::from_ip(data).map_err(|e| PacketError::Slice(e.to_string()))?
        }
        _ => return Ok(None),
    };

    let net = sliced.net.ok_or(PacketError::MissingNetworkLayer)?;
    let (transport, src_port, dst_port, closing) = match sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => (
            TransportKind::Tcp,
            tcp.source_port(),
            tcp.destination_port(),
            tcp.fin() || tcp.rst(),
        ),
        Some(TransportSlice::Udp(udp)) => (
            TransportKind::Udp,
            udp.source_port(),
            udp.destination_port(),
            false,
        ),
        _ => return Ok(None),
    };

    let (src_ip, dst_ip) = match net {
        NetSlice::Ipv4(ref ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ref ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
    };

    let ip_payload = net.ip_payload_ref().ok_or(PacketError::MissingIpPayload)?;
    let reader = PacketReader::new(ip_payload.payload);
    let payload = match transport {
        TransportKind::Tcp => reader.tcp_payload()?,
        TransportKind::Udp => reader.udp_payload()?,
    };

    Ok(Some(IpPacket {
        transport,
        src_ip,
        src_port,
        dst_ip,
        dst_port,
        payload,
        closing,
    }))
}
