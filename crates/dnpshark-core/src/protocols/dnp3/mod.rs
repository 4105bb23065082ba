//! DNP3 decoding.
//!
//! Frames flow through four stages: the link header (`link`), CRC chunk
//! removal (`chunk`), transport reassembly (`transport`) and the application
//! layer (`application`, `objects`). `decoder::Dnp3Decoder` runs them in order
//! for one frame and keeps the per-conversation reassembly state.
//!
//! Malformed input never panics. Hard failures are `Dnp3Error`s; anomalies
//! that still allow decoding are returned as `annotation::Annotation`s next to
//! the decoded records. Byte offsets live in `layout`, bounds-checked access
//! in `reader`.
//!
//! Version française (résumé):
//! Le module décode DNP3 en couches : en-tête liaison, retrait des CRC par
//! bloc, réassemblage transport puis couche application et objets. Les
//! anomalies non bloquantes sont rendues sous forme d'annotations.

pub mod annotation;
pub mod application;
pub mod chunk;
pub mod crc;
pub mod cto;
pub mod decoder;
pub mod error;
pub mod layout;
pub mod link;
pub mod objects;
pub mod reader;
pub mod transport;

pub use decoder::{DecodedFrame, DecoderConfig, Dnp3Decoder, FrameSplitter, split_datagram};
