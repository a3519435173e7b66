use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use url::Url;

use crate::app::{decrement, increment};

/// Extensions offered by the Browse dialog.
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mp3", "wav", "m4a"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Directory listing used to pick a local media file.
#[derive(Debug)]
pub struct FileBrowser {
    dir: PathBuf,
    entries: Vec<BrowserEntry>,
    selected: usize,
}

fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MEDIA_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn read_entries(dir: &Path) -> io::Result<Vec<BrowserEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        if path.is_dir() {
            dirs.push(BrowserEntry {
                name,
                path,
                is_dir: true,
            });
        } else if is_media_file(&path) {
            files.push(BrowserEntry {
                name,
                path,
                is_dir: false,
            });
        }
    }

    dirs.sort_by_key(|e| e.name.to_lowercase());
    files.sort_by_key(|e| e.name.to_lowercase());

    let mut entries = Vec::with_capacity(dirs.len() + files.len() + 1);
    if let Some(parent) = dir.parent() {
        entries.push(BrowserEntry {
            name: "..".to_string(),
            path: parent.to_path_buf(),
            is_dir: true,
        });
    }
    entries.extend(dirs);
    entries.extend(files);
    Ok(entries)
}

impl FileBrowser {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        let entries = read_entries(&dir)?;
        Ok(Self {
            dir,
            entries,
            selected: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[BrowserEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = increment(self.selected, self.entries.len(), false);
        }
    }

    pub fn previous(&mut self) {
        if !self.entries.is_empty() {
            self.selected = decrement(self.selected, self.entries.len(), false);
        }
    }

    /// Enters the selected directory, or returns the `file://` URI of the
    /// selected file.
    pub fn activate(&mut self) -> io::Result<Option<String>> {
        let Some(entry) = self.entries.get(self.selected).cloned() else {
            return Ok(None);
        };

        if entry.is_dir {
            self.entries = read_entries(&entry.path)?;
            self.dir = entry.path;
            self.selected = 0;
            return Ok(None);
        }

        let uri = Url::from_file_path(&entry.path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| entry.path.display().to_string());
        Ok(Some(uri.trim().to_string()))
    }
}
