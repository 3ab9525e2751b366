use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{WaylineError, WaylineResult};

/// Conventional font directories probed when no explicit font is configured.
const SEARCH_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/truetype",
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/System/Library/Fonts/Supplemental",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Face names preferred over whatever else a directory happens to hold.
const PREFERRED_STEMS: &[&str] = &["dejavusans", "liberationsans", "arial", "helvetica"];

/// Load the card font, either from an explicit `path` or by scanning the
/// conventional system font directories for a sans-serif face.
///
/// The scan is deterministic for a given filesystem: candidates are ranked
/// by name and ties broken lexicographically. Failure to locate any usable
/// `.ttf`/`.otf` is an environment fault surfaced as [`WaylineError::Font`].
pub fn load_font_bytes(path: Option<&Path>) -> WaylineResult<Vec<u8>> {
    let resolved = match path {
        Some(p) => p.to_path_buf(),
        None => SEARCH_DIRS
            .iter()
            .find_map(|d| find_font_in_dir(Path::new(d)))
            .ok_or_else(|| {
                WaylineError::font(
                    "no usable .ttf/.otf found in system font directories; set FONT_PATH",
                )
            })?,
    };
    std::fs::read(&resolved)
        .with_context(|| format!("read font '{}'", resolved.display()))
        .map_err(WaylineError::from)
}

/// Pick the best face in `dir`, if any. Unreadable or empty directories
/// resolve to `None` rather than an error so the scan can move on.
fn find_font_in_dir(dir: &Path) -> Option<PathBuf> {
    let rd = std::fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = rd
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_font_file(p))
        .collect();
    candidates.sort_by_key(|p| (rank(p), p.clone()));
    candidates.into_iter().next()
}

/// Lower ranks win: exact preferred stem, then a regular cut of a preferred
/// family, then any cut of one, then everything else.
fn rank(path: &Path) -> u8 {
    let stem = match path.file_stem().and_then(|s| s.to_str()) {
        Some(s) => s.to_ascii_lowercase(),
        None => return 4,
    };
    if PREFERRED_STEMS.contains(&stem.as_str()) {
        0
    } else if PREFERRED_STEMS.iter().any(|p| stem.starts_with(p)) && stem.ends_with("regular") {
        1
    } else if PREFERRED_STEMS.iter().any(|p| stem.contains(p)) {
        2
    } else {
        3
    }
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf")
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/font.rs"]
mod tests;
