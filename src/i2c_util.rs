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

//! Bus-name helpers shared by the resolver, the scanner and the CLI.

use std::cmp::Ordering;

use crate::constants::names::I2C_PREFIX;
use crate::error::{BusmapError, Result};

/// Bus number of an adapter node name such as `i2c-13`.
///
/// Client nodes (`1-0050`), `i2c-` alone and anything with trailing
/// characters are rejected.
pub fn bus_number_from_device_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(I2C_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Node name for a bus number: `i2c-<busno>`
pub fn bus_device_name(busno: u32) -> String {
    format!("{}{}", I2C_PREFIX, busno)
}

/// Parse a bus given on the command line, either `7` or `i2c-7`.
pub fn parse_bus_arg(arg: &str) -> Result<u32> {
    if let Some(busno) = bus_number_from_device_name(arg) {
        return Ok(busno);
    }
    if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(busno) = arg.parse() {
            return Ok(busno);
        }
    }
    Err(BusmapError::InvalidBusName(arg.to_string()))
}

/// Numeric-aware name ordering: `i2c-2` < `i2c-10`, `card0-DP-2` < `card0-DP-10`.
///
/// Runs of digits compare by value, everything else byte-wise. Names that
/// only differ in leading zeros fall back to plain string order so the
/// ordering stays total.
pub fn i2c_compare(a: &str, b: &str) -> Ordering {
    let mut left = Chunks { rest: a };
    let mut right = Chunks { rest: b };
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = compare_chunk(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_chunk(l: &str, r: &str) -> Ordering {
    let l_digits = l.bytes().all(|b| b.is_ascii_digit());
    let r_digits = r.bytes().all(|b| b.is_ascii_digit());
    if l_digits && r_digits {
        let l = l.trim_start_matches('0');
        let r = r.trim_start_matches('0');
        l.len().cmp(&r.len()).then_with(|| l.cmp(r))
    } else {
        l.cmp(r)
    }
}

/// Splits a name into alternating digit / non-digit runs
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_number_from_device_name_valid() {
        assert_eq!(bus_number_from_device_name("i2c-0"), Some(0));
        assert_eq!(bus_number_from_device_name("i2c-7"), Some(7));
        assert_eq!(bus_number_from_device_name("i2c-13"), Some(13));
    }

    #[test]
    fn test_bus_number_from_device_name_invalid() {
        assert_eq!(bus_number_from_device_name("1-0050"), None);
        assert_eq!(bus_number_from_device_name("i2c-"), None);
        assert_eq!(bus_number_from_device_name("i2c-3a"), None);
        assert_eq!(bus_number_from_device_name("i2c--1"), None);
        assert_eq!(bus_number_from_device_name("dev-i2c-1"), None);
        assert_eq!(bus_number_from_device_name(""), None);
    }

    #[test]
    fn test_bus_device_name() {
        assert_eq!(bus_device_name(4), "i2c-4");
    }

    #[test]
    fn test_parse_bus_arg() {
        assert_eq!(parse_bus_arg("5").unwrap(), 5);
        assert_eq!(parse_bus_arg("i2c-12").unwrap(), 12);
        assert!(matches!(parse_bus_arg("bus5"), Err(BusmapError::InvalidBusName(_))));
        assert!(parse_bus_arg("-3").is_err());
        assert!(parse_bus_arg("").is_err());
        assert!(parse_bus_arg("99999999999").is_err());
    }

    #[test]
    fn test_i2c_compare_numeric_suffix() {
        assert_eq!(i2c_compare("i2c-2", "i2c-10"), Ordering::Less);
        assert_eq!(i2c_compare("i2c-10", "i2c-2"), Ordering::Greater);
        assert_eq!(i2c_compare("i2c-3", "i2c-3"), Ordering::Equal);
    }

    #[test]
    fn test_i2c_compare_connector_names() {
        assert_eq!(i2c_compare("card0-DP-2", "card0-DP-10"), Ordering::Less);
        assert_eq!(i2c_compare("card0-DP-1", "card0-HDMI-A-1"), Ordering::Less);
        assert_eq!(i2c_compare("card2", "card10"), Ordering::Less);
        assert_eq!(i2c_compare("card0", "card0-DP-1"), Ordering::Less);
    }

    #[test]
    fn test_i2c_compare_mixed_names() {
        // client nodes sort before adapters, the digit run comes first
        assert_eq!(i2c_compare("1-0050", "i2c-1"), Ordering::Less);
        assert_ne!(i2c_compare("i2c-01", "i2c-1"), Ordering::Equal);
    }

    #[test]
    fn test_i2c_compare_sorts_list() {
        let mut names = vec!["i2c-10", "i2c-2", "i2c-1", "1-0037", "i2c-11", "i2c-3"];
        names.sort_by(|a, b| i2c_compare(a, b));
        assert_eq!(names, vec!["1-0037", "i2c-1", "i2c-2", "i2c-3", "i2c-10", "i2c-11"]);
    }
}
