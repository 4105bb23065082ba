use std::fs;
use std::path::{Path, PathBuf};

use dnpshark_core::DEFAULT_DNP3_PORT;
use dnpshark_core::protocols::dnp3::crc::crc16;
use dnpshark_core::protocols::dnp3::layout::{CHUNK_DATA_LEN, LENGTH_OVERHEAD, START_BYTES};

const ETHERTYPE_IPV4: u16 = 0x0800;
const TCP_PROTO: u8 = 6;
const TCP_FLAGS_PSH_ACK: u8 = 0x18;
const TCP_WINDOW: u16 = 65535;

const MASTER_PORT: u16 = 49152;
const MASTER_IP: &str = "10.0.0.1";
const OUTSTATION_IP: &str = "10.0.0.2";
const MASTER_ADDR: u16 = 1;
const OUTSTATION_ADDR: u16 = 10;

const LINK_PRIMARY_UNCONFIRMED_FROM_MASTER: u8 = 0xC4;
const LINK_REQUEST_STATUS_FROM_MASTER: u8 = 0xC9;
const LINK_PRIMARY_UNCONFIRMED_FROM_OUTSTATION: u8 = 0x44;
const LINK_STATUS_FROM_OUTSTATION: u8 = 0x0B;

const TRANSPORT_FIR: u8 = 0x40;
const TRANSPORT_FIN: u8 = 0x80;

/// Capture start, 2023-11-14T22:13:20Z.
const BASE_TS_US: u64 = 1_700_000_000_000_000;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/fixtures/dnp3");
    write_pcapng(&root.join("session.pcapng"), &session_packets())?;
    Ok(())
}

#[derive(Clone, Copy)]
enum Direction {
    FromMaster,
    FromOutstation,
}

/// Master polls an outstation: link status, class read, a two-segment
/// response, two corrupted frames and an unsolicited response with abnormal
/// IIN bits.
fn session_packets() -> Vec<(u64, Vec<u8>)> {
    let read = [
        0xC0, 0x01, 60, 2, 0x06, 60, 3, 0x06, 60, 4, 0x06, 60, 1, 0x06,
    ];
    let response = response_message();
    let (first, second) = response.split_at(20);

    let mut bad_chunk = link_frame(
        LINK_PRIMARY_UNCONFIRMED_FROM_MASTER,
        OUTSTATION_ADDR,
        MASTER_ADDR,
        &with_transport(TRANSPORT_FIR | TRANSPORT_FIN | 1, &[0xC1, 0x01, 60, 1, 0x06]),
    );
    let last = bad_chunk.len() - 1;
    bad_chunk[last] ^= 0xFF;

    let mut bad_header = link_frame(
        LINK_REQUEST_STATUS_FROM_MASTER,
        OUTSTATION_ADDR,
        MASTER_ADDR,
        &[],
    );
    bad_header[8] ^= 0xFF;

    let frames = vec![
        (
            Direction::FromMaster,
            link_frame(LINK_REQUEST_STATUS_FROM_MASTER, OUTSTATION_ADDR, MASTER_ADDR, &[]),
        ),
        (
            Direction::FromOutstation,
            link_frame(LINK_STATUS_FROM_OUTSTATION, MASTER_ADDR, OUTSTATION_ADDR, &[]),
        ),
        (
            Direction::FromMaster,
            link_frame(
                LINK_PRIMARY_UNCONFIRMED_FROM_MASTER,
                OUTSTATION_ADDR,
                MASTER_ADDR,
                &with_transport(TRANSPORT_FIR | TRANSPORT_FIN, &read),
            ),
        ),
        (
            Direction::FromOutstation,
            link_frame(
                LINK_PRIMARY_UNCONFIRMED_FROM_OUTSTATION,
                MASTER_ADDR,
                OUTSTATION_ADDR,
                &with_transport(TRANSPORT_FIR | 1, first),
            ),
        ),
        (
            Direction::FromOutstation,
            link_frame(
                LINK_PRIMARY_UNCONFIRMED_FROM_OUTSTATION,
                MASTER_ADDR,
                OUTSTATION_ADDR,
                &with_transport(TRANSPORT_FIN | 2, second),
            ),
        ),
        (Direction::FromMaster, bad_chunk),
        (Direction::FromMaster, bad_header),
        (
            Direction::FromOutstation,
            link_frame(
                LINK_PRIMARY_UNCONFIRMED_FROM_OUTSTATION,
                MASTER_ADDR,
                OUTSTATION_ADDR,
                &with_transport(TRANSPORT_FIR | TRANSPORT_FIN | 3, &[0xF0, 0x82, 0x00, 0x02]),
            ),
        ),
    ];

    let mut master_seq = 1u32;
    let mut outstation_seq = 1u32;
    frames
        .into_iter()
        .enumerate()
        .map(|(idx, (direction, frame))| {
            let packet = match direction {
                Direction::FromMaster => {
                    let packet = build_ipv4_tcp_packet(
                        MASTER_IP,
                        OUTSTATION_IP,
                        MASTER_PORT,
                        DEFAULT_DNP3_PORT,
                        master_seq,
                        &frame,
                    );
                    master_seq += frame.len() as u32;
                    packet
                }
                Direction::FromOutstation => {
                    let packet = build_ipv4_tcp_packet(
                        OUTSTATION_IP,
                        MASTER_IP,
                        DEFAULT_DNP3_PORT,
                        MASTER_PORT,
                        outstation_seq,
                        &frame,
                    );
                    outstation_seq += frame.len() as u32;
                    packet
                }
            };
            (BASE_TS_US + (idx as u64) * 1_000_000, packet)
        })
        .collect()
}

/// Response with restart and time-sync IIN bits, three binary inputs, two
/// analog inputs and one counter.
fn response_message() -> Vec<u8> {
    let mut message = vec![0xC0, 0x81, 0x90, 0x00];
    message.extend_from_slice(&[1, 2, 0x00, 0, 2, 0x01, 0x81, 0x01]);
    message.extend_from_slice(&[30, 1, 0x01, 0, 0, 1, 0]);
    for value in [1234i32, -5] {
        message.push(0x01);
        message.extend_from_slice(&value.to_le_bytes());
    }
    message.extend_from_slice(&[20, 1, 0x00, 0, 0, 0x01]);
    message.extend_from_slice(&42u32.to_le_bytes());
    message
}

fn with_transport(transport: u8, message: &[u8]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(message.len() + 1);
    segment.push(transport);
    segment.extend_from_slice(message);
    segment
}

fn link_frame(control: u8, destination: u16, source: u16, user_data: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&START_BYTES);
    frame.push((user_data.len() + LENGTH_OVERHEAD) as u8);
    frame.push(control);
    frame.extend_from_slice(&destination.to_le_bytes());
    frame.extend_from_slice(&source.to_le_bytes());
    let header_crc = crc16(&frame);
    frame.extend_from_slice(&header_crc.to_le_bytes());
    for chunk in user_data.chunks(CHUNK_DATA_LEN) {
        frame.extend_from_slice(chunk);
        frame.extend_from_slice(&crc16(chunk).to_le_bytes());
    }
    frame
}

fn build_ipv4_tcp_packet(
    src_ip: &str,
    dst_ip: &str,
    src_port: u16,
    dst_port: u16,
    sequence: u32,
    payload: &[u8],
) -> Vec<u8> {
    let mut packet = Vec::new();
    packet.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    packet.extend_from_slice(&[0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f]);
    packet.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());

    let total_len = 20u16 + 20u16 + (payload.len() as u16);
    let mut ip_header = [0u8; 20];
    ip_header[0] = 0x45;
    ip_header[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip_header[8] = 64;
    ip_header[9] = TCP_PROTO;
    ip_header[12..16].copy_from_slice(&parse_ipv4(src_ip));
    ip_header[16..20].copy_from_slice(&parse_ipv4(dst_ip));
    let checksum = ipv4_checksum(&ip_header);
    ip_header[10..12].copy_from_slice(&checksum.to_be_bytes());
    packet.extend_from_slice(&ip_header);

    packet.extend_from_slice(&src_port.to_be_bytes());
    packet.extend_from_slice(&dst_port.to_be_bytes());
    packet.extend_from_slice(&sequence.to_be_bytes());
    packet.extend_from_slice(&1u32.to_be_bytes());
    packet.push(0x50);
    packet.push(TCP_FLAGS_PSH_ACK);
    packet.extend_from_slice(&TCP_WINDOW.to_be_bytes());
    packet.extend_from_slice(&0u16.to_be_bytes());
    packet.extend_from_slice(&0u16.to_be_bytes());

    packet.extend_from_slice(payload);
    packet
}

fn parse_ipv4(ip: &str) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (idx, part) in ip.split('.').enumerate() {
        out[idx] = part.parse::<u8>().unwrap_or(0);
    }
    out
}

fn ipv4_checksum(header: &[u8; 20]) -> u16 {
    let mut sum = 0u32;
    for chunk in header.chunks(2) {
        let part = u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
        sum = sum.wrapping_add(part);
    }
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

fn write_pcapng(path: &Path, packets: &[(u64, Vec<u8>)]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }

    let mut output = Vec::new();
    output.extend_from_slice(&pcapng_block(0x0A0D0D0A, &section_header_body()));
    output.extend_from_slice(&pcapng_block(1, &interface_desc_body()));

    for (ts_us, data) in packets {
        output.extend_from_slice(&pcapng_block(6, &enhanced_packet_body(*ts_us, data)));
    }

    fs::write(path, output)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    Ok(())
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1A2B3C4Du32.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_desc_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&65535u32.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let ts_high = ((ts_us >> 32) & 0xFFFF_FFFF) as u32;
    let ts_low = (ts_us & 0xFFFF_FFFF) as u32;
    let cap_len = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&ts_high.to_be_bytes());
    body.extend_from_slice(&ts_low.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    let pad_len = (4 - (data.len() % 4)) % 4;
    body.extend(std::iter::repeat_n(0u8, pad_len));
    body
}
