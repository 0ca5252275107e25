//! Font file discovery for fontsearch-core (made by FontLab https://www.fontlab.com/)

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

/// Environment variable overriding the platform font directories.
pub const FONT_DIRS_ENV: &str = "FONTSEARCH_FONT_DIRS";

/// Recursive filesystem walker that collects common font formats.
#[derive(Debug, Clone)]
pub struct PathDiscovery {
    roots: Vec<PathBuf>,
    follow_symlinks: bool,
}

impl PathDiscovery {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let roots = roots.into_iter().map(Into::into).collect();
        Self {
            roots,
            follow_symlinks: false,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walk every root and return the font files found, in walk order.
    /// Roots that do not exist are skipped with a warning.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        for root in &self.roots {
            if !root.exists() {
                log::warn!("skipping missing font directory {}", root.display());
                continue;
            }

            for entry in WalkDir::new(root)
                .follow_links(self.follow_symlinks)
                .sort_by_file_name()
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log::debug!("skipping unreadable entry under {}: {err}", root.display());
                        continue;
                    }
                };
                if entry.file_type().is_file() && is_font(entry.path()) {
                    found.push(entry.path().to_path_buf());
                }
            }
        }

        Ok(found)
    }
}

pub(crate) fn is_font(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return false,
    };

    matches!(ext.as_str(), "ttf" | "otf" | "ttc" | "otc")
}

/// Font directories for the current platform, honouring `FONTSEARCH_FONT_DIRS`.
///
/// Directories that do not exist are dropped. An empty result is not an
/// error: a machine without fonts simply yields an empty catalog.
pub fn system_font_roots() -> Vec<PathBuf> {
    if let Ok(raw) = env::var(FONT_DIRS_ENV) {
        return split_dir_list(&raw);
    }

    let mut candidates: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "macos")]
    {
        candidates.push(PathBuf::from("/System/Library/Fonts"));
        candidates.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        candidates.push(PathBuf::from("/usr/share/fonts"));
        candidates.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = env::var_os("HOME") {
            let home = PathBuf::from(home);
            candidates.push(home.join(".local/share/fonts"));
            candidates.push(home.join(".fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(system_root) = env::var_os("SYSTEMROOT") {
            candidates.push(PathBuf::from(system_root).join("Fonts"));
        }
        if let Some(local_appdata) = env::var_os("LOCALAPPDATA") {
            candidates.push(PathBuf::from(local_appdata).join("Microsoft/Windows/Fonts"));
        }
    }

    candidates.retain(|p| p.exists());
    candidates.sort();
    candidates.dedup();
    candidates
}

fn split_dir_list(raw: &str) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = raw
        .split([':', ';'])
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .collect();

    dirs.sort();
    dirs.dedup();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn recognises_font_extensions() {
        assert!(is_font("/A/B/font.ttf".as_ref()));
        assert!(is_font("/A/B/font.OTF".as_ref()));
        assert!(is_font("/A/B/fonts.ttc".as_ref()));
        assert!(!is_font("/A/B/font.txt".as_ref()));
        assert!(!is_font("/A/B/font".as_ref()));
    }

    #[test]
    fn discovers_nested_fonts_in_name_order() {
        let tmp = tempdir().expect("tempdir");
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(nested.join("zeta.ttf"), b"").expect("touch font");
        fs::write(nested.join("alpha.otf"), b"").expect("touch font");
        fs::write(nested.join("notes.md"), b"").expect("touch note");

        let fonts = PathDiscovery::new([tmp.path()]).discover().expect("discover");

        assert_eq!(
            fonts,
            vec![nested.join("alpha.otf"), nested.join("zeta.ttf")]
        );
    }

    #[test]
    fn missing_root_is_skipped() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("kept.ttf"), b"").expect("touch font");
        let missing = tmp.path().join("gone");

        let fonts = PathDiscovery::new([missing, tmp.path().to_path_buf()])
            .discover()
            .expect("discover");

        assert_eq!(fonts, vec![tmp.path().join("kept.ttf")]);
    }

    #[test]
    fn dir_list_drops_missing_and_duplicate_entries() {
        let tmp = tempdir().expect("tempdir");
        let dir = tmp.path().display().to_string();
        let raw = format!("{dir}:/nonexistent/fontsearch;{dir};");

        assert_eq!(split_dir_list(&raw), vec![tmp.path().to_path_buf()]);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks_when_enabled() {
        use std::os::unix::fs::symlink;

        let tmp = tempdir().expect("tempdir");
        let real_dir = tmp.path().join("real");
        let link_dir = tmp.path().join("link");
        fs::create_dir_all(&real_dir).expect("mkdir real");
        fs::write(real_dir.join("linked.otf"), b"").expect("touch font");
        symlink(&real_dir, &link_dir).expect("symlink");

        let fonts = PathDiscovery::new([&link_dir])
            .follow_symlinks(true)
            .discover()
            .expect("discover");

        assert!(fonts.iter().any(|f| f.ends_with("linked.otf")));
    }
}
