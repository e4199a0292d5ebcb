//! Error types for binary signature inspection.
//!
//! A [`FormatError`] means the bytes were read but do not match the claimed
//! format. Every other [`SniffError`] variant means the check could not be
//! carried out at all.

use super::format::ModelFormat;
use thiserror::Error;

/// Artefact bytes that contradict the format its extension claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The first two bytes are neither `PK` nor lead with `0x80`.
    #[error("Invalid PyTorch header (expected PK or 0x80, found {})", hex(.found))]
    PyTorchHeader {
        /// The bytes that were read.
        found: [u8; 2],
    },

    /// The first byte is not the protobuf tag for `ir_version`.
    #[error("File does not appear to start with ONNX ir_version (0x08), found {}", hex_byte(.found))]
    OnnxIrVersion {
        /// The byte that was read.
        found: u8,
    },

    /// The first byte is not the pickle `PROTO` opcode.
    #[error("Pickle file must start with PROTO opcode (0x80), found {}", hex_byte(.found))]
    PickleStart {
        /// The byte that was read.
        found: u8,
    },

    /// The last byte is not the pickle `STOP` opcode.
    #[error("Pickle file must end with STOP opcode (.), found {}", hex_byte(.found))]
    PickleEnd {
        /// The byte that was read.
        found: u8,
    },
}

/// Errors arising from format sniffing.
#[derive(Debug, Error)]
pub enum SniffError {
    /// The extension is not in the signature table.
    #[error("Unsupported model file type: {}", display_extension(.extension))]
    Unsupported {
        /// The lower-cased extension without its leading dot; empty when the
        /// file has none.
        extension: String,
    },

    /// The bytes were read and do not match the claimed format.
    #[error("File Signature Mismatch: {0}")]
    Mismatch(#[from] FormatError),

    /// The artefact ends before the bytes its check needs.
    #[error("artefact is too short for a {format} signature check (needs {required} byte(s))")]
    Truncated {
        /// The format being checked.
        format: ModelFormat,
        /// Number of bytes the check reads.
        required: usize,
    },

    /// Opening, reading, or seeking the artefact failed.
    #[error("failed to read artefact: {0}")]
    Io(#[from] std::io::Error),
}

/// Render an extension as it appears on the file name.
pub(crate) fn display_extension(extension: &str) -> String {
    if extension.is_empty() {
        "(none)".to_owned()
    } else {
        format!(".{extension}")
    }
}

fn hex_byte(byte: &u8) -> String {
    format!("0x{byte:02x}")
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(hex_byte)
        .collect::<Vec<_>>()
        .join(" ")
}
