//! Binary signature inspection for model artefacts.
//!
//! Dispatch is table-driven: the artefact's extension selects a
//! [`ModelFormat`] from [`FORMAT_SIGNATURES`], and the format's strategy
//! reads only the bytes it needs. An extension missing from the table is
//! rejected before the file is opened.
//!
//! Sniffing is a heuristic. It confirms that leading (and, for pickles,
//! trailing) bytes look right; it does not deserialize the model.

pub mod error;
pub mod format;

pub use error::{FormatError, SniffError};
pub use format::{FORMAT_SIGNATURES, ModelFormat, SignatureMatch};

use format::normalize_extension;
use log::trace;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Sniff `reader` as the format named by `declared_extension`.
///
/// # Errors
///
/// Returns [`SniffError::Unsupported`] for an unknown extension without
/// touching `reader`; otherwise see [`ModelFormat::sniff`].
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use model_airlock::sniff::{sniff, SniffError};
///
/// let mut onnx = Cursor::new(vec![0x08, 0x01, 0x12, 0x04]);
/// assert!(sniff(&mut onnx, "onnx").is_ok());
///
/// let mut other = Cursor::new(Vec::new());
/// assert!(matches!(
///     sniff(&mut other, ".h5"),
///     Err(SniffError::Unsupported { .. })
/// ));
/// ```
pub fn sniff<R: Read + Seek>(
    reader: &mut R,
    declared_extension: &str,
) -> Result<SignatureMatch, SniffError> {
    let format = lookup(declared_extension)?;
    trace!(target: "sniff", "checking {format} signature");
    format.sniff(reader)
}

/// Sniff the file at `path`, dispatching on its extension.
///
/// # Errors
///
/// Returns [`SniffError::Unsupported`] before opening the file when the
/// extension is unknown, [`SniffError::Io`] when the file cannot be opened,
/// and otherwise the errors of [`ModelFormat::sniff`].
pub fn sniff_file(path: &Path) -> Result<SignatureMatch, SniffError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = lookup(&extension)?;
    let mut reader = BufReader::new(File::open(path)?);
    trace!(target: "sniff", "checking {format} signature of {}", path.display());
    format.sniff(&mut reader)
}

fn lookup(extension: &str) -> Result<ModelFormat, SniffError> {
    ModelFormat::from_extension(extension).ok_or_else(|| SniffError::Unsupported {
        extension: normalize_extension(extension),
    })
}
