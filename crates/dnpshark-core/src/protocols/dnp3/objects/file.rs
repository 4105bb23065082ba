//! File control objects (group 70).

use bitflags::bitflags;
use serde::Serialize;

use super::super::error::Dnp3Error;
use super::super::reader::Dnp3Reader;
use super::catalog::FileLayout;
use super::Cursor;
use super::values::{HexBytes, Timestamp};

const LAST_BLOCK_BIT: u32 = 0x8000_0000;

bitflags! {
    /// Unix-style permission bits of a file command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct FilePermissions: u16 {
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXECUTE = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXECUTE = 0o010;
        const WORLD_READ = 0o004;
        const WORLD_WRITE = 0o002;
        const WORLD_EXECUTE = 0o001;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileMode {
    pub code: u16,
    pub name: &'static str,
}

impl FileMode {
    pub const WRITE: u16 = 2;
    pub const APPEND: u16 = 3;

    pub fn from_code(code: u16) -> Self {
        let name = match code {
            0 => "NULL",
            1 => "READ",
            2 => "WRITE",
            3 => "APPEND",
            _ => "Unknown",
        };
        Self { code, name }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub code: u8,
    pub name: &'static str,
}

impl FileStatus {
    pub fn from_code(code: u8) -> Self {
        let name = match code {
            0 => "SUCCESS",
            1 => "PERMISSION DENIED",
            2 => "INVALID MODE",
            3 => "FILE NOT FOUND",
            4 => "FILE LOCKED",
            5 => "TOO MANY OPEN",
            6 => "INVALID HANDLE",
            7 => "WRITE BLOCK SIZE",
            8 => "COMM LOST",
            9 => "CANNOT ABORT",
            16 => "NOT OPENED",
            17 => "HANDLE EXPIRED",
            18 => "BUFFER OVERRUN",
            19 => "FATAL",
            20 => "BLOCK SEQUENCE",
            255 => "UNDEFINED",
            _ => "Unknown",
        };
        Self { code, name }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum FileRecord {
    Command {
        name_offset: u16,
        name_length: u16,
        /// Present only for WRITE.
        #[serde(skip_serializing_if = "Option::is_none")]
        created: Option<Timestamp>,
        #[serde(skip_serializing_if = "Option::is_none")]
        permissions: Option<FilePermissions>,
        auth_key: u32,
        /// Present for WRITE and APPEND.
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u32>,
        mode: FileMode,
        max_block_size: u16,
        request_id: u16,
        name: String,
    },
    CommandStatus {
        handle: u32,
        size: u32,
        max_block_size: u16,
        request_id: u16,
        status: FileStatus,
        text: HexBytes,
    },
    Transport {
        handle: u32,
        block: u32,
        last_block: bool,
        data: HexBytes,
    },
    TransportStatus {
        handle: u32,
        block: u32,
        last_block: bool,
        status: FileStatus,
        text: HexBytes,
    },
}

/// Decode one file control object at `offset`.
///
/// `size` is the per-point size prefix; it bounds the trailing data of the
/// status and transport records.
pub fn decode_file(
    reader: &Dnp3Reader<'_>,
    offset: usize,
    layout: FileLayout,
    size: Option<u32>,
) -> Result<(FileRecord, usize), Dnp3Error> {
    let mut f = Cursor::new(reader, offset);
    let record = match layout {
        FileLayout::Command => decode_command(&mut f)?,
        FileLayout::CommandStatus => FileRecord::CommandStatus {
            handle: f.u32()?,
            size: f.u32()?,
            max_block_size: f.u16()?,
            request_id: f.u16()?,
            status: FileStatus::from_code(f.u8()?),
            text: f.rest(size)?,
        },
        FileLayout::Transport => {
            let handle = f.u32()?;
            let (block, last_block) = block_number(f.u32()?);
            FileRecord::Transport {
                handle,
                block,
                last_block,
                data: f.rest(size)?,
            }
        }
        FileLayout::TransportStatus => {
            let handle = f.u32()?;
            let (block, last_block) = block_number(f.u32()?);
            FileRecord::TransportStatus {
                handle,
                block,
                last_block,
                status: FileStatus::from_code(f.u8()?),
                text: f.rest(size)?,
            }
        }
    };
    Ok((record, f.consumed()))
}

fn decode_command(f: &mut Cursor<'_, '_>) -> Result<FileRecord, Dnp3Error> {
    let name_offset = f.u16()?;
    let name_length = f.u16()?;
    // Always on the wire; meaningful only for the modes checked below.
    let created = f.time()?;
    let permissions = FilePermissions::from_bits_retain(f.u16()?);
    let auth_key = f.u32()?;
    let size = f.u32()?;
    let mode = FileMode::from_code(f.u16()?);
    let max_block_size = f.u16()?;
    let request_id = f.u16()?;
    let name = f.bytes(usize::from(name_length))?;

    let writing = mode.code == FileMode::WRITE;
    Ok(FileRecord::Command {
        name_offset,
        name_length,
        created: writing.then_some(created),
        permissions: writing.then_some(permissions),
        auth_key,
        size: (writing || mode.code == FileMode::APPEND).then_some(size),
        mode,
        max_block_size,
        request_id,
        name: String::from_utf8_lossy(name).into_owned(),
    })
}

/// Block number and last-block flag.
fn block_number(raw: u32) -> (u32, bool) {
    (raw & !LAST_BLOCK_BIT, raw & LAST_BLOCK_BIT != 0)
}

#[cfg(test)]
mod tests {
    use super::{FilePermissions, FileRecord, decode_file};
    use crate::protocols::dnp3::objects::catalog::FileLayout;
    use crate::protocols::dnp3::reader::Dnp3Reader;

    fn command(mode: u16, name: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&26u16.to_le_bytes());
        data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        data.extend_from_slice(&[0xE8, 0x03, 0, 0, 0, 0]);
        data.extend_from_slice(&0o644u16.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&512u32.to_le_bytes());
        data.extend_from_slice(&mode.to_le_bytes());
        data.extend_from_slice(&1024u16.to_le_bytes());
        data.extend_from_slice(&9u16.to_le_bytes());
        data.extend_from_slice(name);
        data
    }

    #[test]
    fn write_command_exposes_mode_dependent_fields() {
        let data = command(2, b"log.txt");
        let (record, consumed) =
            decode_file(&Dnp3Reader::new(&data), 0, FileLayout::Command, None).unwrap();
        assert_eq!(consumed, data.len());
        match record {
            FileRecord::Command {
                created,
                permissions,
                size,
                mode,
                name,
                request_id,
                ..
            } => {
                assert_eq!(created.and_then(|t| t.millis()), Some(1_000));
                assert!(permissions.unwrap().contains(FilePermissions::OWNER_WRITE));
                assert_eq!(size, Some(512));
                assert_eq!(mode.name, "WRITE");
                assert_eq!(name, "log.txt");
                assert_eq!(request_id, 9);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn read_command_hides_write_fields() {
        let data = command(1, b"a");
        let (record, _) =
            decode_file(&Dnp3Reader::new(&data), 0, FileLayout::Command, None).unwrap();
        match record {
            FileRecord::Command {
                created,
                permissions,
                size,
                ..
            } => {
                assert!(created.is_none());
                assert!(permissions.is_none());
                assert!(size.is_none());
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn transport_data_is_sized_by_prefix() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x11u32.to_le_bytes());
        data.extend_from_slice(&0x8000_0002u32.to_le_bytes());
        data.extend_from_slice(b"abc");
        let (record, consumed) =
            decode_file(&Dnp3Reader::new(&data), 0, FileLayout::Transport, Some(11)).unwrap();
        assert_eq!(consumed, 11);
        match record {
            FileRecord::Transport {
                block,
                last_block,
                data,
                ..
            } => {
                assert_eq!(block, 2);
                assert!(last_block);
                assert_eq!(data.0, b"abc".to_vec());
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn undersized_prefix_clamps_trailing_data() {
        let data = [0u8; 16];
        let (record, consumed) =
            decode_file(&Dnp3Reader::new(&data), 0, FileLayout::TransportStatus, Some(4))
                .unwrap();
        assert_eq!(consumed, 9);
        assert!(matches!(record, FileRecord::TransportStatus { ref text, .. } if text.is_empty()));
    }

    #[test]
    fn command_reads_from_offset_and_rejects_truncated_name() {
        let mut data = vec![0xAA, 0xBB];
        data.extend(command(2, b"cfg"));
        let (_, consumed) =
            decode_file(&Dnp3Reader::new(&data), 2, FileLayout::Command, None).unwrap();
        assert_eq!(consumed, data.len() - 2);

        data.pop();
        assert!(decode_file(&Dnp3Reader::new(&data), 2, FileLayout::Command, None).is_err());
    }
}
