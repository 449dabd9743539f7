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

//! Decoder for the 128-byte EDID base block exposed as a connector's
//! `edid` attribute.
//!
//! Only the identification fields are decoded; they are what tells two
//! monitors on different buses apart.

use serde::Serialize;
use thiserror::Error;

pub const EDID_BLOCK_LEN: usize = 128;

const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
const DESCRIPTOR_OFFSETS: [usize; 4] = [54, 72, 90, 108];
const DESCRIPTOR_LEN: usize = 18;
const TAG_MONITOR_SERIAL: u8 = 0xFF;
const TAG_MONITOR_NAME: u8 = 0xFC;
const MODEL_YEAR_BASE: u16 = 1990;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EdidError {
    #[error("EDID too short: {0} bytes, need 128")]
    TooShort(usize),
    #[error("EDID header mismatch")]
    BadHeader,
    #[error("EDID checksum mismatch: block sums to {0:#04x}")]
    BadChecksum(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEdid {
    /// Three-letter PNP id, e.g. "DEL"
    pub mfg_id: String,
    pub product_code: u16,
    pub serial_number: u32,
    pub model_name: Option<String>,
    pub serial_ascii: Option<String>,
    pub manufacture_week: u8,
    pub manufacture_year: u16,
    pub version: u8,
    pub revision: u8,
    pub extension_count: u8,
}

impl ParsedEdid {
    /// One-line identification used by the text report
    pub fn summary(&self) -> String {
        let model = self
            .model_name
            .clone()
            .unwrap_or_else(|| format!("product {:#06x}", self.product_code));
        match &self.serial_ascii {
            Some(sn) => format!("{} {} (serial {})", self.mfg_id, model, sn),
            None => format!("{} {} (serial {})", self.mfg_id, model, self.serial_number),
        }
    }
}

/// Decode the base block. Trailing extension blocks are counted, not parsed.
pub fn parse_edid(bytes: &[u8]) -> Result<ParsedEdid, EdidError> {
    if bytes.len() < EDID_BLOCK_LEN {
        return Err(EdidError::TooShort(bytes.len()));
    }
    let block = &bytes[..EDID_BLOCK_LEN];
    if block[..8] != EDID_HEADER {
        return Err(EdidError::BadHeader);
    }
    let sum = block.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != 0 {
        return Err(EdidError::BadChecksum(sum));
    }

    let mut model_name = None;
    let mut serial_ascii = None;
    for offset in DESCRIPTOR_OFFSETS {
        let desc = &block[offset..offset + DESCRIPTOR_LEN];
        // display descriptors have a zero pixel clock
        if desc[0] != 0 || desc[1] != 0 || desc[2] != 0 {
            continue;
        }
        match desc[3] {
            TAG_MONITOR_NAME => model_name = descriptor_text(&desc[5..]),
            TAG_MONITOR_SERIAL => serial_ascii = descriptor_text(&desc[5..]),
            _ => {}
        }
    }

    Ok(ParsedEdid {
        mfg_id: decode_pnp_id(block[8], block[9]),
        product_code: u16::from_le_bytes([block[10], block[11]]),
        serial_number: u32::from_le_bytes([block[12], block[13], block[14], block[15]]),
        model_name,
        serial_ascii,
        manufacture_week: block[16],
        manufacture_year: MODEL_YEAR_BASE + u16::from(block[17]),
        version: block[18],
        revision: block[19],
        extension_count: block[126],
    })
}

/// Three 5-bit letters packed big-endian, 1 = 'A'
fn decode_pnp_id(hi: u8, lo: u8) -> String {
    let packed = u16::from_be_bytes([hi, lo]);
    [(packed >> 10) & 0x1F, (packed >> 5) & 0x1F, packed & 0x1F]
        .iter()
        .map(|&v| match v {
            1..=26 => char::from(b'A' + (v as u8) - 1),
            _ => '?',
        })
        .collect()
}

/// Descriptor text is terminated by 0x0A and padded with spaces
fn descriptor_text(raw: &[u8]) -> Option<String> {
    let end = raw.iter().position(|&b| b == 0x0A).unwrap_or(raw.len());
    let text: String = raw[..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { char::from(b) } else { '?' })
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
