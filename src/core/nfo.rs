//! NFO sidecar discovery.

use regex::Regex;
use std::path::{Path, PathBuf};

/// Find the NFO file describing a media file.
///
/// Starting at the file's directory and moving up, the first directory holding
/// exactly one `.nfo` file wins. The search stops at the media directory root
/// and at watch directories, which are never examined.
pub fn find_nfo_file(file: &Path, root: &Path, watch_dirs: &[PathBuf]) -> Option<PathBuf> {
    let mut dir = file.parent();
    while let Some(current) = dir {
        if current == root || watch_dirs.iter().any(|w| w == current) {
            return None;
        }
        let nfos = nfo_files_in(current);
        if nfos.len() == 1 {
            return nfos.into_iter().next();
        }
        dir = current.parent();
    }
    None
}

fn nfo_files_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|e| e.to_string_lossy().eq_ignore_ascii_case("nfo"))
                .unwrap_or(false)
        })
        .collect()
}

/// Extract an IMDB title id from NFO content.
///
/// An IMDB URL wins over a bare `tt` id elsewhere in the text.
pub fn imdb_id_from_text(text: &str) -> Option<String> {
    if let Ok(re) = Regex::new(r"(?i)www\.imdb\.[^/\s]*/(?:title/)?(tt\d+)") {
        if let Some(caps) = re.captures(text) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    let re = Regex::new(r"\b(tt\d{7,8})\b").ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Read an NFO file and extract its IMDB id.
pub fn imdb_id_from_file(nfo: &Path) -> Option<String> {
    // NFO files are frequently not UTF-8.
    let bytes = match std::fs::read(nfo) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Unable to read NFO file {}: {}", nfo.display(), e);
            return None;
        }
    };
    imdb_id_from_text(&String::from_utf8_lossy(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_imdb_id_from_text() {
        assert_eq!(
            imdb_id_from_text("Link: http://www.imdb.com/title/tt0133093/ more"),
            Some("tt0133093".to_string())
        );
        assert_eq!(
            imdb_id_from_text("see https://www.imdb.co.uk/tt0371746"),
            Some("tt0371746".to_string())
        );
        assert_eq!(
            imdb_id_from_text("id tt1234567 and nothing else"),
            Some("tt1234567".to_string())
        );
        assert_eq!(imdb_id_from_text("no id here"), None);
    }

    #[test]
    fn test_find_nfo_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("films");
        let release = root.join("The.Matrix.1999.DVDRip");
        let cd1 = release.join("CD1");
        fs::create_dir_all(&cd1).unwrap();
        fs::write(release.join("matrix.NFO"), "tt0133093").unwrap();
        let file = cd1.join("matrix.avi");
        fs::write(&file, "").unwrap();

        assert_eq!(
            find_nfo_file(&file, &root, &[]),
            Some(release.join("matrix.NFO"))
        );

        // A watch directory stops the climb.
        assert_eq!(find_nfo_file(&file, &root, &[release.clone()]), None);
    }

    #[test]
    fn test_find_nfo_file_ignores_root_and_ambiguous_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("films");
        let dir = root.join("Film");
        fs::create_dir_all(&dir).unwrap();
        fs::write(root.join("root.nfo"), "").unwrap();
        fs::write(dir.join("a.nfo"), "").unwrap();
        fs::write(dir.join("b.nfo"), "").unwrap();

        assert_eq!(find_nfo_file(&dir.join("film.avi"), &root, &[]), None);
    }
}
