/*
 * This file is part of Busmap.
 *
 * Copyright (C) 2025 Busmap contributors
 *
 * Busmap is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Busmap is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Busmap. If not, see <https://www.gnu.org/licenses/>.
 */

//! Ordered directory traversal.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::sysfs::Depth;

/// Name filter applied before sorting
pub type NamePredicate<'a> = &'a dyn Fn(&str) -> bool;

/// Call `callback(dir, name, accumulator, depth)` for every child of `dir`
/// accepted by `predicate`, in `comparator` order.
///
/// Children are listed once. One that disappears before its callback runs is
/// left to the callback's own absence handling. Every surviving sibling is
/// visited exactly once; the callback decides for itself whether there is
/// anything left to do. Returns the number of callbacks made.
pub fn for_each_ordered<A, C, F>(
    dir: &Path,
    predicate: Option<NamePredicate<'_>>,
    comparator: C,
    mut callback: F,
    accumulator: &mut A,
    depth: Depth,
) -> usize
where
    C: Fn(&str, &str) -> Ordering,
    F: FnMut(&Path, &str, &mut A, Depth),
{
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Cannot list directory");
            return 0;
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| predicate.map_or(true, |p| p(name.as_str())))
        .collect();
    names.sort_by(|a, b| comparator(a.as_str(), b.as_str()));

    for name in &names {
        trace!(dir = %dir.display(), name = %name, "Visiting");
        callback(dir, name.as_str(), accumulator, depth);
    }
    names.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c_util::i2c_compare;
    use tempfile::TempDir;

    fn dir_with(names: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for name in names {
            fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_numeric_order() {
        let temp_dir = dir_with(&["i2c-10", "i2c-2", "i2c-1"]);
        let mut seen: Vec<String> = Vec::new();
        let count = for_each_ordered(
            temp_dir.path(),
            None,
            i2c_compare,
            |_, name, acc: &mut Vec<String>, _| acc.push(name.to_string()),
            &mut seen,
            -1,
        );
        assert_eq!(count, 3);
        assert_eq!(seen, vec!["i2c-1", "i2c-2", "i2c-10"]);
    }

    #[test]
    fn test_predicate_filters() {
        let temp_dir = dir_with(&["card1", "card0", "controlD64", "renderD128"]);
        let is_card = |n: &str| n.starts_with("card");
        let mut seen: Vec<String> = Vec::new();
        for_each_ordered(
            temp_dir.path(),
            Some(&is_card),
            i2c_compare,
            |_, name, acc: &mut Vec<String>, _| acc.push(name.to_string()),
            &mut seen,
            -1,
        );
        assert_eq!(seen, vec!["card0", "card1"]);
    }

    #[test]
    fn test_passes_dir_and_depth() {
        let temp_dir = dir_with(&["a"]);
        let mut calls: Vec<(std::path::PathBuf, Depth)> = Vec::new();
        for_each_ordered(
            temp_dir.path(),
            None,
            |a: &str, b: &str| a.cmp(b),
            |dir, _, acc: &mut Vec<(std::path::PathBuf, Depth)>, depth| {
                acc.push((dir.to_path_buf(), depth))
            },
            &mut calls,
            4,
        );
        assert_eq!(calls, vec![(temp_dir.path().to_path_buf(), 4)]);
    }

    #[test]
    fn test_missing_dir_visits_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut hits = 0usize;
        let count = for_each_ordered(
            &temp_dir.path().join("drm"),
            None,
            i2c_compare,
            |_, _, acc: &mut usize, _| *acc += 1,
            &mut hits,
            -1,
        );
        assert_eq!((count, hits), (0, 0));
    }

    #[test]
    fn test_every_sibling_visited_once() {
        let temp_dir = dir_with(&["card0-DP-1", "card0-DP-2", "card0-HDMI-A-1"]);
        // the callback stops doing work after the first hit, but is still called
        let mut state: (Option<String>, usize) = (None, 0);
        for_each_ordered(
            temp_dir.path(),
            None,
            i2c_compare,
            |_, name, acc: &mut (Option<String>, usize), _| {
                acc.1 += 1;
                if acc.0.is_none() {
                    acc.0 = Some(name.to_string());
                }
            },
            &mut state,
            -1,
        );
        assert_eq!(state, (Some("card0-DP-1".to_string()), 3));
    }
}
