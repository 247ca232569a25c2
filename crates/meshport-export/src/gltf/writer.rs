//! Container serialization
//!
//! Renders an assembled document either as the chunked binary `.glb`
//! container or as an embedded-buffer `.gltf` text document.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::ser::Error as _;
use serde::Serialize;

use crate::error::{ExportError, ExportResult};
use crate::gltf::Gltf;

/// GLB container magic, ASCII `glTF`
pub const GLB_MAGIC: &[u8; 4] = b"glTF";

/// GLB container version
pub const GLB_VERSION: u32 = 2;

/// JSON chunk tag, ASCII `JSON`
const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Binary chunk tag, ASCII `BIN\0`
const CHUNK_BIN: u32 = 0x004E_4942;

/// Serialize the document and packed buffer as a `.glb` container
///
/// Layout: 12-byte header (magic, version, total length), then a JSON
/// chunk padded to 4 bytes with ASCII spaces, then a BIN chunk padded to
/// 4 bytes with zeros. All integers little-endian.
pub fn write_glb(gltf: &Gltf, binary: &[u8]) -> ExportResult<Vec<u8>> {
    let json = serde_json::to_string(gltf)?;
    let json_padding = (4 - json.len() % 4) % 4;
    let bin_padding = (4 - binary.len() % 4) % 4;

    let total_len = 12 + 8 + json.len() + json_padding + 8 + binary.len() + bin_padding;
    let mut out = Vec::with_capacity(total_len);

    // Header
    out.extend_from_slice(GLB_MAGIC);
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total_len as u32).to_le_bytes());

    // JSON chunk
    out.extend_from_slice(&((json.len() + json_padding) as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(json.as_bytes());
    out.resize(out.len() + json_padding, b' ');

    // BIN chunk
    out.extend_from_slice(&((binary.len() + bin_padding) as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(binary);
    out.resize(out.len() + bin_padding, 0);

    Ok(out)
}

/// Serialize the document as an embedded `.gltf` text document
///
/// The packed buffer moves into the buffer's URI as a base64 data URI and
/// the whole document is rendered as 4-space-indented JSON.
pub fn write_embedded(gltf: &Gltf, binary: &[u8]) -> ExportResult<String> {
    let mut document = gltf.clone();
    if let Some(buffer) = document.buffers.first_mut() {
        buffer.uri = Some(buffer_data_uri(binary));
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document.serialize(&mut serializer)?;

    String::from_utf8(out).map_err(|e| ExportError::Json(serde_json::Error::custom(e)))
}

/// Base64 data URI for a packed glTF buffer
pub fn buffer_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/gltf-buffer;base64,{}",
        BASE64_STANDARD.encode(bytes)
    )
}

/// Base64 data URI for a PNG image
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png))
}
