//! Naming engine: turns a tag set into a destination path.
//!
//! Audio lands under `artist/album/track.ext`, everything with a capture date
//! under `YYYY/MM-Month/DD-Weekday/HHMMSS-HASH.ext`. Files with neither are
//! unclassifiable. The layout is relied upon by earlier imports, so every
//! component here must stay byte-for-byte stable.

use crate::error::ClassifyError;
use crate::models::{Classification, TagSet};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::io;
use std::path::{Path, PathBuf};

const AUDIO_FILE_TYPE: &str = "MP3";

/// Date tags in priority order; the first non-empty one wins.
pub const DATE_FIELDS: &[&str] = &[
    "Date and Time (Original)",
    "Date/Time Original",
    "Media Create Date",
    "Track Create Date",
    "Create Date",
];

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";
const UNKNOWN_TITLE: &str = "Unknown Title";

/// Length of the digest prefix embedded in file names.
const HASH_PREFIX: usize = 4;

/// Classifies one file. `digest` yields the file's hex content hash and is
/// only invoked when the chosen rule needs it.
pub fn classify<H>(
    tags: &TagSet,
    source: &Path,
    dest_root: &Path,
    digest: H,
) -> Result<Classification, ClassifyError>
where
    H: FnOnce() -> io::Result<String>,
{
    if tags.get("File Type") == AUDIO_FILE_TYPE {
        let path = audio_destination(tags, source, dest_root, digest)?;
        return Ok(Classification::Audio(path));
    }

    let Some(taken) = DATE_FIELDS
        .iter()
        .map(|field| tags.get(field).trim())
        .find(|value| !value.is_empty())
    else {
        return Ok(Classification::Unclassifiable);
    };

    let taken = parse_timestamp(taken)?;
    let hash = hash_prefix(digest, source)?.to_uppercase();
    Ok(Classification::Dated(dated_destination(
        dest_root,
        &taken,
        &hash,
        &extension(source),
    )))
}

fn audio_destination<H>(
    tags: &TagSet,
    source: &Path,
    dest_root: &Path,
    digest: H,
) -> Result<PathBuf, ClassifyError>
where
    H: FnOnce() -> io::Result<String>,
{
    let artist = normalize_or(tags.get("Artist"), UNKNOWN_ARTIST);
    let album = normalize_or(tags.get("Album"), UNKNOWN_ALBUM);

    let track = normalize(tags.get("Track"));
    let stem = if track.is_empty() {
        let title = pick(&[tags.get("Title"), UNKNOWN_TITLE]);
        let hash = hash_prefix(digest, source)?;
        normalize_chunks(&[title, &hash])
    } else {
        track
    };

    let mut ext = extension(source);
    if ext.is_empty() {
        ext = ".mp3".to_string();
    }

    Ok(dest_root
        .join(artist)
        .join(album)
        .join(format!("{stem}{ext}")))
}

fn dated_destination(dest_root: &Path, taken: &NaiveDateTime, hash: &str, ext: &str) -> PathBuf {
    dest_root
        .join(taken.year().to_string())
        .join(taken.format("%m-%B").to_string())
        .join(taken.format("%d-%A").to_string())
        .join(format!("{}-{}{}", taken.format("%H%M%S"), hash, ext))
}

/// Parses `YYYY:MM:DD HH:MM:SS`, read as UTC. Anything after the seconds
/// (sub-seconds, offsets) is ignored.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ClassifyError> {
    let invalid = || ClassifyError::InvalidDate(value.to_string());

    let head = value.get(..19).ok_or_else(invalid)?;
    let well_formed = head.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 | 13 | 16 => b == b':',
        10 => b == b' ',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return Err(invalid());
    }

    let num = |from: usize, to: usize| head[from..to].parse::<u32>().map_err(|_| invalid());
    let date = NaiveDate::from_ymd_opt(num(0, 4)? as i32, num(5, 7)?, num(8, 10)?).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(num(11, 13)?, num(14, 16)?, num(17, 19)?).ok_or_else(invalid)?;
    Ok(date.and_time(time))
}

/// Lower-cases, folds accented vowels and `ñ`, and hyphenates the remaining
/// alphanumeric words: `"É Motñ-ñé  Río"` becomes `"e-motn-ne-rio"`.
pub fn normalize(input: &str) -> String {
    let spaced: String = input
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();
    spaced
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalizes each chunk and joins the non-empty results with `-`.
pub fn normalize_chunks(chunks: &[&str]) -> String {
    chunks
        .iter()
        .map(|chunk| normalize(chunk))
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// First candidate that is non-empty once trimmed, trimmed; else `""`.
pub fn pick<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or("")
}

fn normalize_or(value: &str, fallback: &str) -> String {
    let normalized = normalize(pick(&[value, fallback]));
    if normalized.is_empty() {
        normalize(fallback)
    } else {
        normalized
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'ä' | 'â' | 'ã' | 'à' => 'a',
        'é' | 'ë' | 'ê' | 'ẽ' | 'è' => 'e',
        'í' | 'ï' | 'î' | 'ĩ' | 'ì' => 'i',
        'ó' | 'ö' | 'ô' | 'õ' | 'ò' => 'o',
        'ú' | 'ü' | 'û' | 'ũ' | 'ù' => 'u',
        'ñ' => 'n',
        other => other,
    }
}

fn extension(source: &Path) -> String {
    source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn hash_prefix<H>(digest: H, source: &Path) -> Result<String, ClassifyError>
where
    H: FnOnce() -> io::Result<String>,
{
    let hex = digest().map_err(|source_err| ClassifyError::Hash {
        path: source.to_path_buf(),
        source: source_err,
    })?;
    Ok(hex.chars().take(HASH_PREFIX).collect())
}
