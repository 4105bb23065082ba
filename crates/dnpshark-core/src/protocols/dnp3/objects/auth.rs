//! Secure authentication objects (group 120) and security statistics.
//!
//! Only the structure is decoded. Challenge data, MAC values and wrapped keys
//! are carried as opaque bytes.

use serde::Serialize;

use super::super::error::Dnp3Error;
use super::super::reader::Dnp3Reader;
use super::catalog::AuthLayout;
use super::Cursor;
use super::values::{HexBytes, Timestamp};

/// A code with its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamedCode {
    pub code: u8,
    pub name: &'static str,
}

impl NamedCode {
    fn new(code: u8, name: &'static str) -> Self {
        Self { code, name }
    }
}

fn mac_algorithm(code: u8) -> NamedCode {
    let name = match code {
        0 => "No MAC value in this message",
        1 => "HMAC SHA-1 truncated to 4 octets (serial)",
        2 => "HMAC SHA-1 truncated to 10 octets (networked)",
        3 => "HMAC SHA-256 truncated to 8 octets (serial)",
        4 => "HMAC SHA-256 truncated to 16 octets (networked)",
        5 => "HMAC SHA-1 truncated to 8 octets (serial)",
        6 => "AES-GMAC (output is 12 octets)",
        _ => "Unknown",
    };
    NamedCode::new(code, name)
}

/// MAC value length implied by a MAC algorithm code.
pub fn mac_length(algorithm: u8) -> usize {
    match algorithm {
        1 => 4,
        2 => 10,
        3 | 5 => 8,
        4 => 16,
        6 => 12,
        _ => 0,
    }
}

fn challenge_reason(code: u8) -> NamedCode {
    let name = match code {
        0 => "Not Used",
        1 => "CRITICAL",
        _ => "Unknown",
    };
    NamedCode::new(code, name)
}

fn key_wrap(code: u8) -> NamedCode {
    let name = match code {
        0 => "Unused",
        1 => "AES-128",
        2 => "AES-256",
        _ => "Unknown",
    };
    NamedCode::new(code, name)
}

fn key_status(code: u8) -> NamedCode {
    let name = match code {
        0 => "Not Used",
        1 => "OK",
        2 => "NOT_INIT",
        3 => "COMM_FAIL",
        4 => "AUTH_FAIL",
        _ => "Unknown",
    };
    NamedCode::new(code, name)
}

fn error_code(code: u8) -> NamedCode {
    let name = match code {
        0 => "Not used",
        1 => "Authentication failed",
        2 => "Unexpected Response",
        3 => "No response",
        4 => "Aggressive Mode not supported",
        5 => "MAC Algorithm not supported",
        6 => "Key Wrap Algorithm not supported",
        7 => "Authorization failed",
        8 => "Update Key Change Method not permitted",
        9 => "Invalid Signature",
        10 => "Invalid Certification Data",
        11 => "Unknown User",
        12 => "Max Session Key Status Requests Exceeded",
        _ => "Unknown",
    };
    NamedCode::new(code, name)
}

fn key_change_method(code: u8) -> NamedCode {
    let name = match code {
        0 => "Not used",
        1 | 2 | 64..=66 => "Obsolete. Do Not Use",
        3 => "Symmetric AES-128 / SHA-1-HMAC",
        4 => "Symmetric AES-256 / SHA-256-HMAC",
        5 => "Symmetric AES-256 / AES-GMAC",
        67 => "Asymmetric RSA-1024 / DSA SHA-1 / SHA-1-HMAC",
        68 => "Asymmetric RSA-2048 / DSA SHA-256 / SHA-256-HMAC",
        69 => "Asymmetric RSA-3072 / DSA SHA-256 / SHA-256-HMAC",
        70 => "Asymmetric RSA-2048 / DSA SHA-256 / AES-GMAC",
        71 => "Asymmetric RSA-3072 / DSA SHA-256 / AES-GMAC",
        _ => "Unknown",
    };
    NamedCode::new(code, name)
}

/// Name of a security statistic by its point index.
pub fn statistic_name(index: u32) -> &'static str {
    match index {
        0 => "Unexpected Messages",
        1 => "Authorization Failures",
        2 => "Authentication Failures",
        3 => "Reply Timeouts",
        4 => "Rekeys Due to Authentication Failure",
        5 => "Total Messages Sent",
        6 => "Total Messages Received",
        7 => "Critical Messages Sent",
        8 => "Critical Messages Received",
        9 => "Discarded Messages",
        10 => "Error Messages Sent",
        11 => "Error Messages Rxed",
        12 => "Successful Authentications",
        13 => "Session Key Changes",
        14 => "Failed Session Key Changes",
        15 => "Update Key Changes",
        16 => "Failed Update Key Changes",
        17 => "Rekeys Due to Restarts",
        _ => "Unknown statistic",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum AuthRecord {
    Challenge {
        sequence: u32,
        user: u16,
        mac_algorithm: NamedCode,
        reason: NamedCode,
        challenge: HexBytes,
    },
    Reply {
        sequence: u32,
        user: u16,
        mac: HexBytes,
    },
    AggressiveModeRequest {
        sequence: u32,
        user: u16,
    },
    SessionKeyStatusRequest {
        user: u16,
    },
    SessionKeyStatus {
        key_change_sequence: u32,
        user: u16,
        key_wrap: NamedCode,
        key_status: NamedCode,
        mac_algorithm: NamedCode,
        challenge: HexBytes,
        mac: HexBytes,
    },
    SessionKeyChange {
        key_change_sequence: u32,
        user: u16,
        key_data: HexBytes,
    },
    Error {
        sequence: u32,
        user: u16,
        association: u16,
        error: NamedCode,
        time: Timestamp,
        text: String,
    },
    Mac {
        mac: HexBytes,
    },
    UpdateKeyChangeRequest {
        method: NamedCode,
        user_name: String,
        challenge: HexBytes,
    },
    UpdateKeyChangeReply {
        sequence: u32,
        user: u16,
        challenge: HexBytes,
    },
    UpdateKeyChange {
        sequence: u32,
        user: u16,
        encrypted_key: HexBytes,
    },
    UpdateKeyChangeConfirmation {
        mac: HexBytes,
    },
}

/// Decode one authentication object at `offset`.
///
/// `size` is the per-point size prefix, which bounds variable length
/// trailing fields.
pub fn decode_auth(
    reader: &Dnp3Reader<'_>,
    offset: usize,
    layout: AuthLayout,
    size: Option<u32>,
) -> Result<(AuthRecord, usize), Dnp3Error> {
    let mut f = Cursor::new(reader, offset);
    let record = match layout {
        AuthLayout::Challenge => AuthRecord::Challenge {
            sequence: f.u32()?,
            user: f.u16()?,
            mac_algorithm: mac_algorithm(f.u8()?),
            reason: challenge_reason(f.u8()?),
            challenge: f.rest(size)?,
        },
        AuthLayout::Reply => AuthRecord::Reply {
            sequence: f.u32()?,
            user: f.u16()?,
            mac: f.rest(size)?,
        },
        AuthLayout::AggressiveModeRequest => AuthRecord::AggressiveModeRequest {
            sequence: f.u32()?,
            user: f.u16()?,
        },
        AuthLayout::SessionKeyStatusRequest => {
            AuthRecord::SessionKeyStatusRequest { user: f.u16()? }
        }
        AuthLayout::SessionKeyStatus => {
            let key_change_sequence = f.u32()?;
            let user = f.u16()?;
            let key_wrap = key_wrap(f.u8()?);
            let key_status = key_status(f.u8()?);
            let algorithm = f.u8()?;
            let challenge_len = usize::from(f.u16()?);
            let challenge = f.hex(challenge_len)?;
            let mac = f.hex(mac_length(algorithm))?;
            AuthRecord::SessionKeyStatus {
                key_change_sequence,
                user,
                key_wrap,
                key_status,
                mac_algorithm: mac_algorithm(algorithm),
                challenge,
                mac,
            }
        }
        AuthLayout::SessionKeyChange => AuthRecord::SessionKeyChange {
            key_change_sequence: f.u32()?,
            user: f.u16()?,
            key_data: f.rest(size)?,
        },
        AuthLayout::Error => {
            let sequence = f.u32()?;
            let user = f.u16()?;
            let association = f.u16()?;
            let error = error_code(f.u8()?);
            let time = f.time()?;
            let text = f.rest(size)?;
            AuthRecord::Error {
                sequence,
                user,
                association,
                error,
                time,
                text: String::from_utf8_lossy(&text.0).into_owned(),
            }
        }
        AuthLayout::Mac => AuthRecord::Mac { mac: f.rest(size)? },
        AuthLayout::UpdateKeyChangeRequest => {
            let method = key_change_method(f.u8()?);
            let name_len = usize::from(f.u16()?);
            let challenge_len = usize::from(f.u16()?);
            let user_name = String::from_utf8_lossy(f.bytes(name_len)?).into_owned();
            let challenge = f.hex(challenge_len)?;
            AuthRecord::UpdateKeyChangeRequest {
                method,
                user_name,
                challenge,
            }
        }
        AuthLayout::UpdateKeyChangeReply => {
            let sequence = f.u32()?;
            let user = f.u16()?;
            let challenge_len = usize::from(f.u16()?);
            AuthRecord::UpdateKeyChangeReply {
                sequence,
                user,
                challenge: f.hex(challenge_len)?,
            }
        }
        AuthLayout::UpdateKeyChange => {
            let sequence = f.u32()?;
            let user = f.u16()?;
            let key_len = usize::from(f.u16()?);
            AuthRecord::UpdateKeyChange {
                sequence,
                user,
                encrypted_key: f.hex(key_len)?,
            }
        }
        AuthLayout::UpdateKeyChangeConfirmation => {
            AuthRecord::UpdateKeyChangeConfirmation { mac: f.rest(size)? }
        }
    };
    Ok((record, f.consumed()))
}

#[cfg(test)]
mod tests {
    use super::{AuthRecord, decode_auth, mac_length, statistic_name};
    use crate::protocols::dnp3::objects::catalog::AuthLayout;
    use crate::protocols::dnp3::reader::Dnp3Reader;

    #[test]
    fn challenge_takes_the_rest_of_the_object() {
        let mut data = Vec::new();
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&[0x04, 0x01]);
        data.extend_from_slice(&[0xAA; 4]);
        let (record, consumed) =
            decode_auth(&Dnp3Reader::new(&data), 0, AuthLayout::Challenge, Some(12)).unwrap();
        assert_eq!(consumed, 12);
        match record {
            AuthRecord::Challenge {
                sequence,
                reason,
                challenge,
                ..
            } => {
                assert_eq!(sequence, 7);
                assert_eq!(reason.name, "CRITICAL");
                assert_eq!(challenge.len(), 4);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn session_key_status_mac_length_follows_algorithm() {
        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&[0x01, 0x01, 0x02]);
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&[0x11, 0x22]);
        data.extend_from_slice(&[0xCC; 10]);
        let (record, consumed) =
            decode_auth(&Dnp3Reader::new(&data), 0, AuthLayout::SessionKeyStatus, None).unwrap();
        assert_eq!(consumed, data.len());
        match record {
            AuthRecord::SessionKeyStatus {
                key_status, mac, ..
            } => {
                assert_eq!(key_status.name, "OK");
                assert_eq!(mac.len(), 10);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn update_key_change_request_reads_name_and_challenge() {
        let mut data = vec![0x04];
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(b"bob");
        data.extend_from_slice(&[0x01, 0x02]);
        let (record, consumed) = decode_auth(
            &Dnp3Reader::new(&data),
            0,
            AuthLayout::UpdateKeyChangeRequest,
            None,
        )
        .unwrap();
        assert_eq!(consumed, 10);
        assert!(matches!(
            record,
            AuthRecord::UpdateKeyChangeRequest { ref user_name, .. } if user_name == "bob"
        ));
    }

    #[test]
    fn reply_with_undersized_prefix_has_empty_mac() {
        let data = [0u8; 8];
        let (record, _) =
            decode_auth(&Dnp3Reader::new(&data), 0, AuthLayout::Reply, Some(2)).unwrap();
        assert!(matches!(record, AuthRecord::Reply { ref mac, .. } if mac.is_empty()));
    }

    #[test]
    fn lookup_tables() {
        assert_eq!(mac_length(4), 16);
        assert_eq!(mac_length(9), 0);
        assert_eq!(statistic_name(12), "Successful Authentications");
        assert_eq!(statistic_name(99), "Unknown statistic");
    }
}
