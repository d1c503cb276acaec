use std::{fmt, path::Path};

use reqwest::multipart::Part;

/// Largest thumbnail the backend accepts.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// A file picked for a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &format_file_size(self.bytes.len() as u64))
            .finish()
    }
}

impl Upload {
    pub fn new<N: Into<String>, M: Into<String>>(file_name: N, mime: M, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = file_name_of(&path.to_string_lossy()).to_string();
        let mime = mime_for(&extension(&file_name)).to_string();
        Ok(Self::new(file_name, mime, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn into_part(self) -> reqwest::Result<Part> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
    }
}

/// Lower-cased extension without the dot, empty when there is none.
pub fn extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Last path segment of a path or URL, query string stripped.
pub fn file_name_of(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn mime_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return String::from("0 B");
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_helpers() {
        assert_eq!(extension("Thumb.PNG"), "png");
        assert_eq!(extension("README"), "");
        assert_eq!(file_name_of("/uploads/a/thumb.png?v=2"), "thumb.png");
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
    }

    #[test]
    fn upload_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

        let upload = Upload::from_path(&path).unwrap();
        assert_eq!(upload.file_name(), "cover.jpg");
        assert_eq!(upload.mime(), "image/jpeg");
        assert!(upload.is_image());
        assert_eq!(upload.size(), 3);
    }
}
