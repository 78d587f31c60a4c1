//! Shared key generation for storage backends.
//!
//! Key format: `{uuid}.{ext}`. The UUID makes keys collision-resistant under
//! concurrent uploads of identically named files; only the (sanitized)
//! extension of the original filename is carried over.

use std::path::Path;

use uuid::Uuid;

/// Suffix of the sidecar metadata file written beside each object.
pub const META_SUFFIX: &str = ".meta";

const MAX_EXTENSION_LEN: usize = 16;
const DEFAULT_EXTENSION: &str = "bin";

/// Generate a fresh object key for the given original filename.
pub fn generate_object_key(original_filename: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), sanitize_extension(original_filename))
}

/// The key of the sidecar metadata file for an object key.
pub fn metadata_key(key: &str) -> String {
    format!("{}{}", key, META_SUFFIX)
}

/// Whether a key addresses a sidecar metadata file. Metadata is internal and
/// never servable.
pub fn is_metadata_key(key: &str) -> bool {
    key.ends_with(META_SUFFIX)
}

fn sanitize_extension(filename: &str) -> String {
    let ext: String = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        ext
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_for_same_filename() {
        let a = generate_object_key("photo.png");
        let b = generate_object_key("photo.png");
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        assert!(b.ends_with(".png"));
    }

    #[test]
    fn test_key_never_contains_original_name() {
        let key = generate_object_key("vacation video.mp4");
        assert!(!key.contains("vacation"));
        assert!(key.ends_with(".mp4"));
    }

    #[test]
    fn test_missing_extension_falls_back() {
        let key = generate_object_key("noextension");
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_hostile_extension_is_sanitized() {
        let key = generate_object_key("evil.p/../ng");
        let ext = key.rsplit('.').next().unwrap();
        assert!(ext.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_metadata_key_round_trip() {
        let key = generate_object_key("a.png");
        let meta = metadata_key(&key);
        assert!(is_metadata_key(&meta));
        assert!(!is_metadata_key(&key));
    }
}
