//! Uploaded asset encoding.
//!
//! Assets are forwarded untouched: bytes become standard base64 and the
//! declared content type is carried alongside. Nothing checks that the bytes
//! are a decodable image; the upstream API rejects malformed data.
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    pub data: String,
    pub media_type: String,
}

impl EncodedAsset {
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Self {
        let media_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        EncodedAsset { data: STANDARD.encode(bytes), media_type }
    }

    /// Read `reader` to the end and encode it. Read errors are returned as-is.
    pub async fn read_from<R>(mut reader: R, content_type: Option<&str>) -> std::io::Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(Self::from_bytes(&buf, content_type))
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}

/// Best-effort media type from a file extension, for callers reading from disk.
pub fn media_type_for_path(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// File extension for a returned media type.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        _ => "png",
    }
}
