// Dual-representation image handling: live capture handles on one side,
// the self-contained text encoding that storage and the vision service
// consume on the other.
use std::io::Write;

use base64::Engine;
use tempfile::NamedTempFile;

use crate::models::{ImageBlob, ImageField};
use crate::{Error, Result};

/// Shown when an item has no product photo
pub const PLACEHOLDER_IMAGE_URI: &str = "https://via.placeholder.com/140";

const DATA_URI_PREFIX: &str = "data:";

/// Encode a live blob into a data URI: storable as a plain string and
/// usable directly for display or analysis without the original handle.
pub fn encode(blob: &ImageBlob) -> Result<String> {
    let bytes = read_blob(blob)?;
    let payload = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{}", blob.media_type(), payload))
}

/// Whether a string already carries the storage encoding. Checked before
/// every read of a dual-representation field.
pub fn is_encoded(value: &str) -> bool {
    value.starts_with(DATA_URI_PREFIX)
}

/// Resolve an image field to the encoded text the vision service and
/// storage consume. `None` when the field is absent.
pub fn encoded_form(field: &ImageField) -> Result<Option<String>> {
    match field {
        ImageField::Live(blob) => encode(blob).map(Some),
        ImageField::Encoded(data) => Ok(Some(data.clone())),
        ImageField::Absent => Ok(None),
    }
}

/// A reference something can actually display
pub enum DisplayRef {
    /// Already-encoded data, usable as-is
    Inline(String),
    /// Preview materialized from a live handle; the backing file is
    /// deleted when this is dropped
    Transient(TempPreview),
    /// No photo - point at the placeholder
    Placeholder,
}

impl DisplayRef {
    pub fn uri(&self) -> &str {
        match self {
            DisplayRef::Inline(data) => data,
            DisplayRef::Transient(preview) => preview.uri(),
            DisplayRef::Placeholder => PLACEHOLDER_IMAGE_URI,
        }
    }
}

/// Derive a display reference for any representation
pub fn display_ref(field: &ImageField) -> Result<DisplayRef> {
    match field {
        ImageField::Encoded(data) => Ok(DisplayRef::Inline(data.clone())),
        ImageField::Absent => Ok(DisplayRef::Placeholder),
        ImageField::Live(blob) => TempPreview::materialize(blob).map(DisplayRef::Transient),
    }
}

/// A preview copy of a live capture, scoped to whoever is displaying it.
/// Dropping the preview removes the file - holding one past the owning
/// item's lifetime would leak a file per preview for the whole session.
pub struct TempPreview {
    uri: String,
    _file: NamedTempFile,
}

impl TempPreview {
    fn materialize(blob: &ImageBlob) -> Result<Self> {
        let bytes = read_blob(blob)?;
        let mut file = NamedTempFile::new()?;
        file.write_all(&bytes)?;
        let uri = format!("file://{}", file.path().display());
        Ok(Self { uri, _file: file })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[cfg(test)]
    fn path(&self) -> std::path::PathBuf {
        self._file.path().to_path_buf()
    }
}

fn read_blob(blob: &ImageBlob) -> Result<Vec<u8>> {
    std::fs::read(blob.path()).map_err(|e| {
        Error::Encoding(format!("could not read {}: {}", blob.path().display(), e))
    })
}
