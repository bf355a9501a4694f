//! In-process extraction: file type sniffing, EXIF for images, ID3/Vorbis-style tags for audio.

use crate::{MetadataProvider, ProviderError, TagSet};
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// EXIF date fields, stored under the names exiftool reports them as.
const EXIF_DATES: &[(exif::Tag, &str)] = &[
    (exif::Tag::DateTimeOriginal, "Date/Time Original"),
    (exif::Tag::DateTimeDigitized, "Create Date"),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProvider;

impl MetadataProvider for NativeProvider {
    fn name(&self) -> &str {
        "native"
    }

    fn extract(&self, path: &Path) -> Result<TagSet, ProviderError> {
        let kind = infer::get_from_path(path)?.ok_or(ProviderError::NoMetadata)?;
        // The audio layout needs nothing beyond the type; missing tags fall back to defaults.
        let is_mp3 = kind.extension() == "mp3";

        let mut tags = TagSet::new();
        match kind.matcher_type() {
            infer::MatcherType::Audio => {
                if let Err(e) = read_audio_tags(path, &mut tags) {
                    if !is_mp3 {
                        return Err(e);
                    }
                    debug!(path = %path.display(), error = %e, "unreadable audio tags");
                }
            }
            infer::MatcherType::Image => read_exif(path, &mut tags)?,
            _ => {}
        }
        // A bare file type is not worth reporting: let a fallback backend try.
        if tags.is_empty() && !is_mp3 {
            return Err(ProviderError::NoMetadata);
        }
        tags.insert("File Type", file_type_name(kind.extension()));
        Ok(tags)
    }
}

/// Maps a sniffed extension onto the `File Type` label exiftool would print.
pub fn file_type_name(extension: &str) -> String {
    match extension {
        "jpg" | "jpeg" => "JPEG".to_string(),
        "tif" | "tiff" => "TIFF".to_string(),
        "heif" | "heic" => "HEIC".to_string(),
        "m4a" => "M4A".to_string(),
        other => other.to_uppercase(),
    }
}

fn read_exif(path: &Path, tags: &mut TagSet) -> Result<(), ProviderError> {
    let mut reader = BufReader::new(File::open(path)?);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        // No EXIF block, or one we cannot parse.
        Err(_) => return Ok(()),
    };

    for (tag, name) in EXIF_DATES {
        if let Some(field) = exif.get_field(*tag, exif::In::PRIMARY) {
            if let Some(text) = ascii_value(&field.value) {
                tags.insert(*name, text);
            }
        }
    }
    Ok(())
}

/// Raw ASCII text of a field; `display_value` would reformat dates.
fn ascii_value(value: &exif::Value) -> Option<String> {
    match value {
        exif::Value::Ascii(parts) => parts
            .first()
            .map(|raw| String::from_utf8_lossy(raw).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

fn read_audio_tags(path: &Path, tags: &mut TagSet) -> Result<(), ProviderError> {
    let tagged = Probe::open(path)
        .map_err(|e| ProviderError::Backend(e.to_string()))?
        .read()
        .map_err(|e| ProviderError::Backend(e.to_string()))?;

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return Ok(());
    };
    if let Some(artist) = tag.artist() {
        tags.insert("Artist", artist);
    }
    if let Some(album) = tag.album() {
        tags.insert("Album", album);
    }
    if let Some(title) = tag.title() {
        tags.insert("Title", title);
    }
    if let Some(track) = tag.track() {
        tags.insert("Track", track.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_type_names_match_exiftool_labels() {
        assert_eq!(file_type_name("mp3"), "MP3");
        assert_eq!(file_type_name("jpg"), "JPEG");
        assert_eq!(file_type_name("tif"), "TIFF");
        assert_eq!(file_type_name("mov"), "MOV");
    }

    #[test]
    fn unknown_content_has_no_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "just some text").unwrap();

        let err = NativeProvider.extract(&path).unwrap_err();
        assert!(matches!(err, ProviderError::NoMetadata));
    }

    #[test]
    fn jpeg_without_exif_has_no_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.jpg");
        // SOI, an empty APP0-less stream and EOI: sniffable, but no EXIF.
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x02, 0xFF, 0xD9]).unwrap();

        assert!(matches!(
            NativeProvider.extract(&path),
            Err(ProviderError::NoMetadata)
        ));
    }

    #[test]
    fn untagged_mp3_still_reports_its_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        // Bare MPEG-1 Layer III frames (128 kbit/s, 44.1 kHz), no ID3 block.
        let mut frames = Vec::new();
        for _ in 0..20 {
            let mut frame = vec![0u8; 417];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
            frames.extend(frame);
        }
        fs::write(&path, frames).unwrap();

        let tags = NativeProvider.extract(&path).unwrap();
        assert_eq!(tags.get("File Type"), "MP3");
        assert_eq!(tags.get("Artist"), "");
        assert_eq!(tags.get("Title"), "");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NativeProvider.extract(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, ProviderError::Io(_)));
    }
}
