// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-palette handicap levels read from a plain text table.
//!
//! Each line is `definition, level level level ...` with one level per
//! palette. Missing levels and unparsable numbers count as zero.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use versus_core::entity::MAX_PALETTES;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Handicap levels keyed by entity definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandicapTable {
    levels: HashMap<String, Vec<i32>>,
}

impl HandicapTable {
    /// A table without handicaps.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the table format.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        let mut levels = HashMap::new();
        for line in text.lines() {
            let Some((definition, row)) = line.split_once(',') else {
                continue;
            };
            let mut row: Vec<i32> = row
                .trim()
                .split(' ')
                .map(|level| level.trim().parse().unwrap_or(0))
                .collect();
            if row.len() < MAX_PALETTES {
                row.resize(MAX_PALETTES, 0);
            }
            levels.insert(definition.to_string(), row);
        }
        Self { levels }
    }

    /// Reads the table at `path`. A missing, unreadable or too short file
    /// yields an empty table.
    pub fn load(path: &Path) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Handicap table '{}' unavailable: {}", path.display(), e);
                return Self::empty();
            }
        };
        if bytes.len() < 3 {
            return Self::empty();
        }
        match String::from_utf8(bytes) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                log::warn!("Handicap table '{}' is not valid UTF-8: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Level of `definition` drawn with the 1-based `palette_no`.
    pub fn level(&self, definition: &str, palette_no: u32) -> i32 {
        let Some(index) = (palette_no as usize).checked_sub(1) else {
            return 0;
        };
        self.levels
            .get(definition)
            .and_then(|row| row.get(index))
            .copied()
            .unwrap_or(0)
    }

    /// Number of entities with an entry.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// `true` when no entity has an entry.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_mark_and_pads() {
        let table = HandicapTable::parse("\u{feff}chars/kfm.def, 1 2 x\nno comma here\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.level("chars/kfm.def", 1), 1);
        assert_eq!(table.level("chars/kfm.def", 2), 2);
        assert_eq!(table.level("chars/kfm.def", 3), 0);
        assert_eq!(table.level("chars/kfm.def", 12), 0);
        assert_eq!(table.level("chars/kfm.def", 0), 0);
        assert_eq!(table.level("chars/other.def", 1), 0);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HandicapTable::load(&dir.path().join("autolevel.txt")).is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autolevel.txt");
        fs::write(&path, "a.def, -1 3\r\nb.def,4\n").unwrap();
        let table = HandicapTable::load(&path);
        assert_eq!(table.level("a.def", 1), -1);
        assert_eq!(table.level("a.def", 2), 3);
        assert_eq!(table.level("b.def", 1), 4);
    }
}
