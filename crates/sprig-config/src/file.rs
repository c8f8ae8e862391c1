//! Line-preserving INI configuration file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum LineKind {
    /// Blank line or comment.
    Other,
    Section(String),
    Entry {
        section: String,
        key: String,
        value: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Line {
    raw: String,
    kind: LineKind,
}

impl Line {
    fn section(name: &str) -> Self {
        Self {
            raw: format!("[{name}]"),
            kind: LineKind::Section(name.to_string()),
        }
    }

    fn entry(section: &str, key: &str, value: &str, indent: &str) -> Self {
        Self {
            raw: format!("{indent}{key} = {value}"),
            kind: LineKind::Entry {
                section: section.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            },
        }
    }

    fn is_entry(&self, section: &str, key: &str) -> bool {
        matches!(&self.kind, LineKind::Entry { section: s, key: k, .. } if s == section && k == key)
    }

    fn is_section(&self, section: &str) -> bool {
        matches!(&self.kind, LineKind::Section(s) if s == section)
    }
}

/// Split `section.key` at the last dot.
pub fn split_key(full: &str) -> ConfigResult<(&str, &str)> {
    match full.rsplit_once('.') {
        Some((section, key)) if !section.is_empty() && !key.is_empty() => Ok((section, key)),
        _ => Err(ConfigError::InvalidKey(full.to_string())),
    }
}

fn full_key(section: &str, key: &str) -> String {
    format!("{section}.{key}")
}

/// An INI-style configuration file that keeps every untouched line as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    lines: Vec<Line>,
}

impl ConfigFile {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut lines = Vec::new();
        let mut current: Option<String> = None;

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let kind = if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                LineKind::Other
            } else if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| ConfigError::Parse {
                        line: i + 1,
                        reason: format!("bad section header {line:?}"),
                    })?;
                current = Some(name.to_string());
                LineKind::Section(name.to_string())
            } else {
                let (key, value) = line
                    .split_once('=')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .filter(|(k, _)| !k.is_empty())
                    .ok_or_else(|| ConfigError::Parse {
                        line: i + 1,
                        reason: format!("expected key = value, got {line:?}"),
                    })?;
                let section = current.clone().ok_or_else(|| ConfigError::Parse {
                    line: i + 1,
                    reason: format!("key {key:?} outside any section"),
                })?;
                LineKind::Entry {
                    section,
                    key: key.to_string(),
                    value: value.to_string(),
                }
            };
            lines.push(Line {
                raw: raw.to_string(),
                kind,
            });
        }
        Ok(Self { lines })
    }

    /// Read and parse the file at `path`. A missing file is empty.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Render back to text, one line per stored line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.raw);
            out.push('\n');
        }
        out
    }

    /// Write to `path` through a temp file in the same directory.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(self.to_text().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    fn matching(&self, section: &str, key: &str) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_entry(section, key))
            .map(|(i, _)| i)
            .collect()
    }

    /// First value of `section.key`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|l| match &l.kind {
            LineKind::Entry { section: s, key: k, value } if s == section && k == key => {
                Some(value.as_str())
            }
            _ => None,
        })
    }

    /// All values of `section.key`, in file order.
    pub fn get_all(&self, section: &str, key: &str) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match &l.kind {
                LineKind::Entry { section: s, key: k, value } if s == section && k == key => {
                    Some(value.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Append a value, keeping any existing ones.
    ///
    /// The line goes after the last entry of the last `[section]` block, or
    /// into a new block at the end of the file.
    pub fn add(&mut self, section: &str, key: &str, value: &str) {
        let header = self.lines.iter().rposition(|l| l.is_section(section));
        let Some(header) = header else {
            self.lines.push(Line::section(section));
            self.lines.push(Line::entry(section, key, value, "\t"));
            return;
        };

        let mut at = header + 1;
        for (i, line) in self.lines.iter().enumerate().skip(header + 1) {
            match line.kind {
                LineKind::Section(_) => break,
                LineKind::Entry { .. } => at = i + 1,
                LineKind::Other => {}
            }
        }
        self.lines.insert(at, Line::entry(section, key, value, "\t"));
    }

    /// Replace the single value of `section.key`.
    ///
    /// Returns whether the value changed. Fails with
    /// [`ConfigError::MultipleValues`] if the key has more than one value.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> ConfigResult<bool> {
        let idx = self.single(section, key)?;
        let line = &mut self.lines[idx];
        if let LineKind::Entry { value: current, .. } = &line.kind {
            if current == value {
                return Ok(false);
            }
        }
        let indent: String = line.raw.chars().take_while(|c| c.is_whitespace()).collect();
        *line = Line::entry(section, key, value, &indent);
        Ok(true)
    }

    /// Remove the single value of `section.key`.
    pub fn unset(&mut self, section: &str, key: &str) -> ConfigResult<()> {
        let idx = self.single(section, key)?;
        self.lines.remove(idx);
        self.prune_empty_section(section);
        Ok(())
    }

    /// Remove every value of `section.key`, returning how many were removed.
    pub fn unset_all(&mut self, section: &str, key: &str) -> ConfigResult<usize> {
        let before = self.lines.len();
        self.lines.retain(|l| !l.is_entry(section, key));
        let removed = before - self.lines.len();
        if removed == 0 {
            return Err(ConfigError::KeyNotFound {
                key: full_key(section, key),
            });
        }
        self.prune_empty_section(section);
        Ok(removed)
    }

    /// Collapse all values of `section.key` into one holding `value`.
    ///
    /// The first occurrence is rewritten in place; a missing key is added.
    pub fn replace_all(&mut self, section: &str, key: &str, value: &str) {
        let found = self.matching(section, key);
        let Some((&first, rest)) = found.split_first() else {
            self.add(section, key, value);
            return;
        };
        for &i in rest.iter().rev() {
            self.lines.remove(i);
        }
        let indent: String = self.lines[first]
            .raw
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        self.lines[first] = Line::entry(section, key, value, &indent);
    }

    /// Rename every `[old]` block to `[new]`. Returns `false` if none exist.
    pub fn rename_section(&mut self, old: &str, new: &str) -> bool {
        let mut renamed = false;
        for line in &mut self.lines {
            if line.is_section(old) {
                *line = Line::section(new);
                renamed = true;
            } else if let LineKind::Entry { section, .. } = &mut line.kind {
                if section.as_str() == old {
                    *section = new.to_string();
                }
            }
        }
        renamed
    }

    /// Drop every `[section]` block with all of its lines.
    pub fn remove_section(&mut self, section: &str) -> bool {
        let before = self.lines.len();
        let mut inside = false;
        self.lines.retain(|l| {
            if let LineKind::Section(name) = &l.kind {
                inside = name == section;
            }
            !inside
        });
        before != self.lines.len()
    }

    /// Every `(section.key, value)` pair in file order.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.lines
            .iter()
            .filter_map(|l| match &l.kind {
                LineKind::Entry { section, key, value } => {
                    Some((full_key(section, key), value.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn single(&self, section: &str, key: &str) -> ConfigResult<usize> {
        match self.matching(section, key)[..] {
            [] => Err(ConfigError::KeyNotFound {
                key: full_key(section, key),
            }),
            [idx] => Ok(idx),
            _ => Err(ConfigError::MultipleValues {
                key: full_key(section, key),
            }),
        }
    }

    /// Remove `[section]` headers whose blocks no longer hold any entry.
    fn prune_empty_section(&mut self, section: &str) {
        let mut empty_headers = Vec::new();
        let mut open: Option<usize> = None;
        for (i, line) in self.lines.iter().enumerate() {
            match &line.kind {
                LineKind::Section(name) => {
                    empty_headers.extend(open.take());
                    if name == section {
                        open = Some(i);
                    }
                }
                LineKind::Entry { .. } => open = None,
                LineKind::Other => {}
            }
        }
        empty_headers.extend(open);
        for i in empty_headers.into_iter().rev() {
            self.lines.remove(i);
        }
    }
}
