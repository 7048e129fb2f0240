//! Asset manifest parsing.
//!
//! A manifest is a UTF-8 text file naming one asset per line, relative to the
//! dataset root. Lines are trimmed and blank lines are skipped; order is kept
//! and defines the sweep order.

use crate::error::{CoreError, CoreResult};

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// One input recording named in the manifest.
///
/// The identifier is kept as written, minus surrounding whitespace and any
/// `.` components or trailing separators, so `./clipA` and `clipA/` name
/// the same asset as `clipA`. It is joined under both the dataset root and
/// the output root, so it must be a relative path that stays inside them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    id: String,
}

impl Asset {
    /// Validates, normalises and wraps an asset identifier.
    pub fn new(id: &str) -> Result<Self, String> {
        let id = id.trim();
        if id.is_empty() {
            return Err("asset identifier is empty".to_string());
        }

        let mut parts = Vec::new();
        for component in Path::new(id).components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy()),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(format!("asset '{id}' must not contain '..'"));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(format!("asset '{id}' must be a relative path"));
                }
            }
        }

        if parts.is_empty() {
            return Err(format!("asset '{id}' does not name a file"));
        }

        Ok(Self { id: parts.join("/") })
    }

    /// The normalised identifier.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Location of the recording under the dataset root.
    pub fn source_path(&self, dataset_root: &Path) -> PathBuf {
        dataset_root.join(&self.id)
    }

    /// Directory receiving this asset's run logs.
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.id)
    }

    /// Flat, filesystem-safe form of the identifier (`a/b.aedat4` -> `a_b.aedat4`).
    pub fn slug(&self) -> String {
        self.id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Reads and parses the manifest at `path`.
///
/// # Errors
///
/// * `CoreError::Manifest` if the file cannot be read, is not UTF-8, or
///   names an invalid asset
pub fn read_manifest(path: &Path) -> CoreResult<Vec<Asset>> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::Manifest {
        path: path.to_path_buf(),
        message: format!("cannot read manifest: {e}"),
    })?;

    parse_manifest(&content, path)
}

/// Parses manifest text. `origin` is only used in error messages.
pub fn parse_manifest(content: &str, origin: &Path) -> CoreResult<Vec<Asset>> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let asset = Asset::new(line).map_err(|message| CoreError::Manifest {
            path: origin.to_path_buf(),
            message: format!("line {}: {}", index + 1, message),
        })?;

        if !seen.insert(asset.clone()) {
            log::warn!(
                "Asset '{}' is listed more than once in {}; its logs will be appended to twice",
                asset,
                origin.display()
            );
        }

        assets.push(asset);
    }

    log::debug!("Parsed {} asset(s) from {}", assets.len(), origin.display());
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_rejects_escaping_paths() {
        assert!(Asset::new("clip.aedat4").is_ok());
        assert!(Asset::new("nested/clip.aedat4").is_ok());
        assert!(Asset::new("../clip.aedat4").is_err());
        assert!(Asset::new("a/../../b").is_err());
        assert!(Asset::new("/abs/clip.aedat4").is_err());
        assert!(Asset::new("   ").is_err());
    }

    #[test]
    fn test_asset_paths_and_slug() {
        let asset = Asset::new("  scenes/run 1.aedat4 ").unwrap();
        assert_eq!(asset.as_str(), "scenes/run 1.aedat4");
        assert_eq!(
            asset.output_dir(Path::new("/out")),
            PathBuf::from("/out/scenes/run 1.aedat4")
        );
        assert_eq!(
            asset.source_path(Path::new("/data")),
            PathBuf::from("/data/scenes/run 1.aedat4")
        );
        assert_eq!(asset.slug(), "scenes_run_1.aedat4");
    }

    #[test]
    fn test_parse_skips_blank_lines_and_trims() {
        let content = "clipA\n\n   \n  clipB  \r\n";
        let assets = parse_manifest(content, Path::new("manifest.txt")).unwrap();
        let ids: Vec<&str> = assets.iter().map(Asset::as_str).collect();
        assert_eq!(ids, vec!["clipA", "clipB"]);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let content = "clipA\n/etc/passwd\n";
        match parse_manifest(content, Path::new("manifest.txt")) {
            Err(CoreError::Manifest { message, .. }) => assert!(message.starts_with("line 2")),
            other => panic!("Expected manifest error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_keeps_duplicates_in_order() {
        let assets = parse_manifest("a\nb\na\n", Path::new("m")).unwrap();
        assert_eq!(assets.len(), 3);
        assert_eq!(assets[2].as_str(), "a");
    }

    #[test]
    fn test_current_dir_components_are_normalised() {
        let plain = Asset::new("scenes/clipA").unwrap();
        assert_eq!(Asset::new("./scenes/clipA").unwrap(), plain);
        assert_eq!(Asset::new("scenes/./clipA/").unwrap(), plain);
        assert_eq!(plain.as_str(), "scenes/clipA");
    }

    #[test]
    fn test_current_dir_alone_is_rejected() {
        assert!(Asset::new(".").is_err());
        assert!(Asset::new("./").is_err());
        assert!(Asset::new("./.").is_err());
    }

    #[test]
    fn test_normalised_duplicates_are_detected() {
        let assets = parse_manifest("clipA\n./clipA\nclipA/\n", Path::new("m")).unwrap();
        assert!(assets.iter().all(|a| a.as_str() == "clipA"));
    }
}
