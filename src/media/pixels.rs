//! Encoded pixel data for a cropped page region.

/// Encoded image bytes produced by a [`PageRasterizer`](super::PageRasterizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelData {
    /// Encoded image bytes
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/png")
    pub mime_type: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl PixelData {
    /// Create pixel data, detecting the MIME type from magic bytes.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        let mime_type = Self::detect_mime_type(&data)
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            data,
            mime_type,
            width,
            height,
        }
    }

    /// Create PNG pixel data.
    pub fn png(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            mime_type: "image/png".to_string(),
            width,
            height,
        }
    }

    /// Create JPEG pixel data.
    pub fn jpeg(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            mime_type: "image/jpeg".to_string(),
            width,
            height,
        }
    }

    /// Size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if there is no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the file extension based on MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/tiff" => "tiff",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            _ => "raw",
        }
    }

    /// Detect MIME type from data magic bytes.
    pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
        if data.len() < 8 {
            return None;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("image/png");
        }

        // TIFF: little-endian or big-endian
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some("image/tiff");
        }

        // WEBP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some("image/webp");
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime_type() {
        let jpeg_data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(PixelData::detect_mime_type(&jpeg_data), Some("image/jpeg"));

        let png_data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(PixelData::detect_mime_type(&png_data), Some("image/png"));

        assert_eq!(PixelData::detect_mime_type(&[0, 0, 0, 0]), None);
    }

    #[test]
    fn test_extension() {
        let png = PixelData::new(
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
            1,
            1,
        );
        assert_eq!(png.extension(), "png");
        assert_eq!(PixelData::new(vec![1, 2, 3], 1, 1).extension(), "raw");
    }
}
