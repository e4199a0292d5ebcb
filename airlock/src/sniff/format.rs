//! Supported model formats and their byte-level signatures.
//!
//! Each format reads a fixed handful of bytes from the start (and, for
//! pickles, the end) of the artefact. Nothing beyond those bytes is
//! inspected, so a match means the file is plausibly of the claimed
//! family, not that it deserializes.

use super::error::{FormatError, SniffError};
use serde::Serialize;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// Zip local-file-header magic used by `torch.save` archives.
const ZIP_MAGIC: [u8; 2] = *b"PK";

/// Pickle `PROTO` opcode, also the lead byte of legacy `torch.save` output.
const PICKLE_PROTO: u8 = 0x80;

/// Pickle `STOP` opcode.
const PICKLE_STOP: u8 = b'.';

/// Protobuf tag for ONNX `ModelProto.ir_version` (field 1, varint).
const ONNX_IR_VERSION_TAG: u8 = 0x08;

/// Extension-to-format lookup, in display order.
///
/// Extensions are stored lower-cased without the leading dot.
pub const FORMAT_SIGNATURES: &[(&str, ModelFormat)] = &[
    ("pt", ModelFormat::PyTorch),
    ("pth", ModelFormat::PyTorch),
    ("onnx", ModelFormat::Onnx),
    ("pkl", ModelFormat::Pickle),
];

/// A model format family that can be signature-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// `torch.save` output, either a zip archive or a legacy pickle stream.
    PyTorch,
    /// Serialized ONNX `ModelProto`.
    Onnx,
    /// Raw Python pickle stream.
    Pickle,
}

impl ModelFormat {
    /// Look up the format for a file extension.
    ///
    /// Matching is case-insensitive and tolerates a leading dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use model_airlock::sniff::ModelFormat;
    ///
    /// assert_eq!(ModelFormat::from_extension(".PTH"), Some(ModelFormat::PyTorch));
    /// assert_eq!(ModelFormat::from_extension("safetensors"), None);
    /// ```
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        let normalized = normalize_extension(extension);
        FORMAT_SIGNATURES
            .iter()
            .find(|(known, _)| *known == normalized)
            .map(|&(_, format)| format)
    }

    /// Number of leading bytes the signature check reads.
    #[must_use]
    pub fn bytes_required(self) -> usize {
        match self {
            Self::PyTorch => 2,
            Self::Onnx | Self::Pickle => 1,
        }
    }

    /// Check the artefact behind `reader` against this format's signature.
    ///
    /// The reader is consumed from its current position; pickles also seek
    /// to the final byte. The file is never read in full.
    ///
    /// # Errors
    ///
    /// Returns [`SniffError::Mismatch`] when the bytes contradict the format,
    /// [`SniffError::Truncated`] when the artefact is too short to check,
    /// and [`SniffError::Io`] for any other read or seek failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use model_airlock::sniff::ModelFormat;
    ///
    /// let mut reader = Cursor::new(b"PK\x03\x04".to_vec());
    /// let matched = ModelFormat::PyTorch.sniff(&mut reader).expect("zip header");
    /// assert!(matched.detail().contains("Zip format"));
    /// ```
    pub fn sniff<R: Read + Seek>(self, reader: &mut R) -> Result<SignatureMatch, SniffError> {
        let detail = match self {
            Self::PyTorch => sniff_pytorch(self, reader)?,
            Self::Onnx => sniff_onnx(self, reader)?,
            Self::Pickle => sniff_pickle(self, reader)?,
        };
        Ok(SignatureMatch {
            format: self,
            detail,
        })
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PyTorch => "PyTorch",
            Self::Onnx => "ONNX",
            Self::Pickle => "Pickle",
        };
        f.write_str(name)
    }
}

/// Successful signature check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureMatch {
    format: ModelFormat,
    detail: &'static str,
}

impl SignatureMatch {
    /// Return the matched format.
    #[must_use]
    pub fn format(&self) -> ModelFormat {
        self.format
    }

    /// Return the human-readable match description.
    #[must_use]
    pub fn detail(&self) -> &'static str {
        self.detail
    }
}

impl fmt::Display for SignatureMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (signature check only)", self.detail)
    }
}

/// Lower-case an extension and strip one leading dot.
pub(crate) fn normalize_extension(extension: &str) -> String {
    extension
        .strip_prefix('.')
        .unwrap_or(extension)
        .to_ascii_lowercase()
}

fn sniff_pytorch<R: Read>(format: ModelFormat, reader: &mut R) -> Result<&'static str, SniffError> {
    let mut header = [0_u8; 2];
    read_signature(format, reader, &mut header)?;
    if header == ZIP_MAGIC {
        Ok("Valid PyTorch model (Zip format)")
    } else if header.first() == Some(&PICKLE_PROTO) {
        Ok("Valid PyTorch model (Legacy Pickle format)")
    } else {
        Err(FormatError::PyTorchHeader { found: header }.into())
    }
}

fn sniff_onnx<R: Read>(format: ModelFormat, reader: &mut R) -> Result<&'static str, SniffError> {
    let [first] = read_byte(format, reader)?;
    if first == ONNX_IR_VERSION_TAG {
        Ok("Model file appears to be a valid ONNX model")
    } else {
        Err(FormatError::OnnxIrVersion { found: first }.into())
    }
}

fn sniff_pickle<R: Read + Seek>(
    format: ModelFormat,
    reader: &mut R,
) -> Result<&'static str, SniffError> {
    let [first] = read_byte(format, reader)?;
    if first != PICKLE_PROTO {
        return Err(FormatError::PickleStart { found: first }.into());
    }

    // A one-byte file has already been read past; seeking back to its only
    // byte is still valid.
    reader.seek(SeekFrom::End(-1))?;
    let [last] = read_byte(format, reader)?;
    if last != PICKLE_STOP {
        return Err(FormatError::PickleEnd { found: last }.into());
    }
    Ok("Model file is a valid Pickle model")
}

fn read_byte<R: Read>(format: ModelFormat, reader: &mut R) -> Result<[u8; 1], SniffError> {
    let mut byte = [0_u8; 1];
    read_signature(format, reader, &mut byte)?;
    Ok(byte)
}

fn read_signature<R: Read>(
    format: ModelFormat,
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), SniffError> {
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            SniffError::Truncated {
                format,
                required: format.bytes_required(),
            }
        } else {
            SniffError::Io(err)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn sniff_bytes(format: ModelFormat, bytes: &[u8]) -> Result<SignatureMatch, SniffError> {
        format.sniff(&mut Cursor::new(bytes.to_vec()))
    }

    #[rstest]
    #[case::pt("pt", Some(ModelFormat::PyTorch))]
    #[case::pth_dotted(".pth", Some(ModelFormat::PyTorch))]
    #[case::onnx_upper("ONNX", Some(ModelFormat::Onnx))]
    #[case::pkl("pkl", Some(ModelFormat::Pickle))]
    #[case::safetensors("safetensors", None)]
    #[case::empty("", None)]
    fn resolves_extensions(#[case] extension: &str, #[case] expected: Option<ModelFormat>) {
        assert_eq!(ModelFormat::from_extension(extension), expected);
    }

    #[rstest]
    #[case::zip(b"PK\x03\x04\x00\x00", "Zip format")]
    #[case::legacy(b"\x80\x02\x8a\nl", "Legacy Pickle format")]
    #[case::legacy_any_second_byte(b"\x80\xff", "Legacy Pickle format")]
    fn pytorch_accepts_known_headers(#[case] bytes: &[u8], #[case] expected: &str) {
        let matched = sniff_bytes(ModelFormat::PyTorch, bytes).expect("accepted");
        assert!(matched.detail().contains(expected));
        assert_eq!(matched.format(), ModelFormat::PyTorch);
    }

    #[test]
    fn pytorch_rejects_unknown_header() {
        let err = sniff_bytes(ModelFormat::PyTorch, b"\x00\x01\x02\x03").expect_err("rejected");
        assert!(matches!(
            err,
            SniffError::Mismatch(FormatError::PyTorchHeader { found: [0x00, 0x01] })
        ));
        assert!(err.to_string().contains("Invalid PyTorch header"));
    }

    #[test]
    fn pytorch_needs_two_bytes() {
        let err = sniff_bytes(ModelFormat::PyTorch, b"P").expect_err("too short");
        assert!(matches!(
            err,
            SniffError::Truncated {
                format: ModelFormat::PyTorch,
                required: 2
            }
        ));
    }

    #[test]
    fn onnx_accepts_ir_version_tag() {
        let matched = sniff_bytes(ModelFormat::Onnx, b"\x08\x01\x12\x04").expect("accepted");
        assert!(matched.detail().contains("ONNX"));
    }

    #[test]
    fn onnx_rejects_other_lead_byte() {
        let err = sniff_bytes(ModelFormat::Onnx, b"\x0a\x01").expect_err("rejected");
        assert!(err.to_string().contains("ir_version (0x08)"));
    }

    #[test]
    fn pickle_accepts_proto_and_stop() {
        let matched = sniff_bytes(ModelFormat::Pickle, b"\x80some_data.").expect("accepted");
        assert_eq!(matched.detail(), "Model file is a valid Pickle model");
    }

    #[rstest]
    #[case::bad_start(b"Xsome_data.", "must start with PROTO")]
    #[case::bad_start_and_end(b"Xsome_dataX", "must start with PROTO")]
    #[case::bad_end(b"\x80some_dataX", "must end with STOP")]
    #[case::single_proto_byte(b"\x80", "must end with STOP")]
    fn pickle_checks_start_before_end(#[case] bytes: &[u8], #[case] expected: &str) {
        let err = sniff_bytes(ModelFormat::Pickle, bytes).expect_err("rejected");
        assert!(err.to_string().contains(expected), "{err}");
    }

    #[rstest]
    #[case::pytorch(ModelFormat::PyTorch)]
    #[case::onnx(ModelFormat::Onnx)]
    #[case::pickle(ModelFormat::Pickle)]
    fn empty_artefact_is_truncated_not_mismatched(#[case] format: ModelFormat) {
        let err = sniff_bytes(format, b"").expect_err("empty");
        assert!(matches!(err, SniffError::Truncated { .. }));
    }

    #[test]
    fn repeated_sniffs_agree() {
        let bytes = b"\x80payload.";
        let first = sniff_bytes(ModelFormat::Pickle, bytes).expect("accepted");
        let second = sniff_bytes(ModelFormat::Pickle, bytes).expect("accepted");
        assert_eq!(first, second);
    }

    #[test]
    fn display_notes_heuristic_check() {
        let matched = sniff_bytes(ModelFormat::Onnx, b"\x08").expect("accepted");
        assert!(matched.to_string().ends_with("(signature check only)"));
    }
}
