//! Output file naming for scripted replays
//!
//! Result files are named `{input_stem}_{model}_{YYYYMMDD-HHMMSS}.txt` inside
//! the configured output directory.

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Timestamp layout used in result file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Extension of result files
pub const OUTPUT_EXTENSION: &str = "txt";

/// Model family whose checkpoints are named after their parent directory
const BLENDER_FAMILY: &str = "blender";

/// Derive the result file path for one replay run
pub fn output_path<Tz>(
    output_dir: impl AsRef<Path>,
    model_id: &str,
    input_path: impl AsRef<Path>,
    captured_at: &DateTime<Tz>,
) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let file_name = format!(
        "{}_{}_{}.{}",
        input_stem(input_path.as_ref()),
        short_model_name(model_id),
        captured_at.format(TIMESTAMP_FORMAT),
        OUTPUT_EXTENSION
    );
    output_dir.as_ref().join(file_name)
}

/// Base name of the input up to its first `.`
pub fn input_stem(input_path: &Path) -> String {
    let base = input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.split('.').next().unwrap_or_default().to_string()
}

/// Short model name used in result file names
///
/// `zoo:` style ids drop everything up to the last colon, file paths drop
/// their directories. Blender checkpoints all share the file name `model`,
/// so their parent directory names the run instead.
pub fn short_model_name(model_id: &str) -> String {
    let name = match model_id.rfind(':') {
        Some(idx) => &model_id[idx + 1..],
        None => last_segment(model_id),
    };

    if name.contains(BLENDER_FAMILY) {
        let mut segments = name.rsplit('/');
        segments.next();
        if let Some(parent) = segments.next() {
            return parent.to_string();
        }
    }

    last_segment(name).to_string()
}

/// Path with `_{n}` appended after the timestamp, used when `base` is taken
pub fn disambiguated(base: &Path, n: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.with_file_name(format!("{}_{}.{}", stem, n, OUTPUT_EXTENSION))
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_colon_model_id() {
        let path = output_path("/out", "models:convai2/kvmemnn/model", "/x/foo.txt", &instant());
        assert_eq!(path, PathBuf::from("/out/foo_model_20210309-140507.txt"));
    }

    #[test]
    fn test_blender_uses_parent_directory() {
        let path = output_path("/out", "zoo:blender/blender_3B/model", "/x/foo.txt", &instant());
        assert_eq!(path, PathBuf::from("/out/foo_blender_3B_20210309-140507.txt"));
    }

    #[test]
    fn test_plain_path_model_id() {
        assert_eq!(short_model_name("/models/seq2seq/checkpoint"), "checkpoint");
        assert_eq!(short_model_name("checkpoint"), "checkpoint");
        assert_eq!(short_model_name("/data/blender_90M/model"), "model");
        assert_eq!(short_model_name("/data/blender_90M"), "blender_90M");
    }

    #[test]
    fn test_blender_without_parent_keeps_name() {
        assert_eq!(short_model_name("zoo:blender"), "blender");
    }

    #[test]
    fn test_input_stem_stops_at_first_dot() {
        assert_eq!(input_stem(Path::new("/data/chat.eval.txt")), "chat");
        assert_eq!(input_stem(Path::new("scripts/dbdc")), "dbdc");
    }

    #[test]
    fn test_timestamp_follows_given_offset() {
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = seoul.with_ymd_and_hms(2021, 3, 9, 23, 0, 0).unwrap();
        let path = output_path("out", "m", "in.txt", &at);
        assert_eq!(path, PathBuf::from("out/in_m_20210309-230000.txt"));
    }

    #[test]
    fn test_disambiguated_suffix_after_timestamp() {
        let base = PathBuf::from("/out/foo_model_20210309-140507.txt");
        assert_eq!(
            disambiguated(&base, 2),
            PathBuf::from("/out/foo_model_20210309-140507_2.txt")
        );
    }
}
