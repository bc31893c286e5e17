//! File picker used to choose a cover image.
//!
//! Lists the sub-directories of one directory followed by the files whose
//! extension is an accepted image type.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone)]
pub struct FilePicker {
    dir: PathBuf,
    entries: Vec<PickerEntry>,
    selected: usize,
    extensions: Vec<String>,
}

impl FilePicker {
    /// Open the picker in `dir`, accepting files with one of `extensions`.
    pub fn open(dir: impl Into<PathBuf>, extensions: &[String]) -> Self {
        let mut picker = Self {
            dir: dir.into(),
            entries: Vec::new(),
            selected: 0,
            extensions: extensions.to_vec(),
        };
        picker.refresh();
        picker
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&PickerEntry> {
        self.entries.get(self.selected)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }

    /// Re-read the current directory.
    pub fn refresh(&mut self) {
        let mut dirs: Vec<PickerEntry> = Vec::new();
        let mut files: Vec<PickerEntry> = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }

            let is_dir = entry.file_type().is_dir();
            if !is_dir && !self.accepts(entry.path()) {
                continue;
            }

            let item = PickerEntry {
                path: entry.into_path(),
                name,
                is_dir,
            };
            if is_dir {
                dirs.push(item);
            } else {
                files.push(item);
            }
        }

        dirs.sort_by_key(|e| e.name.to_lowercase());
        files.sort_by_key(|e| e.name.to_lowercase());

        self.entries = dirs;
        self.entries.extend(files);
        self.selected = 0;
    }

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.entries.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.entries.len() - 1);
        }
    }

    /// Go up one directory.
    pub fn parent(&mut self) {
        if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
            self.dir = parent;
            self.refresh();
        }
    }

    /// Open the selected directory, or return the selected image file.
    pub fn choose(&mut self) -> Option<PathBuf> {
        let entry = self.selected_entry()?.clone();
        if entry.is_dir {
            self.dir = entry.path;
            self.refresh();
            None
        } else {
            Some(entry.path)
        }
    }
}
