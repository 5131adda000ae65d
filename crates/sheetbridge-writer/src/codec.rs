//! Coordinate and style conversions into the remote engine's textual forms
//!
//! Everything here is pure: column labels, cell references, colors, widths,
//! day-count timestamps and string literals for embedding into instructions.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Milliseconds between 1899-12-30 (the engine's day zero) and the unix epoch
const SERIAL_EPOCH_OFFSET_MS: f64 = 2_209_161_600_000.0;

/// Milliseconds per day
const MS_PER_DAY: f64 = 86_400_000.0;

/// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_label(col: u32) -> String {
    let mut result = String::new();
    let mut n = col as u64 + 1; // 1-based for calculation

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to an index (A = 0, Z = 25, AA = 26, etc.)
///
/// Letters are case-insensitive. Returns `None` for an empty label, a
/// non-letter character, or a label beyond `u32` range.
pub fn column_index(label: &str) -> Option<u32> {
    if label.is_empty() {
        return None;
    }

    let mut col: u64 = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        if col > u32::MAX as u64 + 1 {
            return None;
        }
    }

    u32::try_from(col - 1).ok()
}

/// A1-style reference for a 0-based row/column pair
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", column_label(col), row as u64 + 1)
}

/// A1-style range reference (`A1:C3`)
pub fn range_ref(rs: u32, cs: u32, re: u32, ce: u32) -> String {
    format!("{}:{}", cell_ref(rs, cs), cell_ref(re, ce))
}

/// An RGB color triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Create a color from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex string. The `#` is optional.
    ///
    /// Pairs that are missing or not valid hex become 0, so short input such
    /// as `#fff` yields `(255, 15, 0)`.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.trim().trim_start_matches('#');
        let pair = |i: usize| {
            digits
                .get(i..i + 2)
                .or_else(|| digits.get(i..))
                .filter(|s| !s.is_empty())
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .unwrap_or(0)
        };
        Self {
            r: pair(0),
            g: pair(2),
            b: pair(4),
        }
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Engine expression constructing this color
    pub fn to_engine(&self) -> String {
        format!("Api.CreateColorFromRGB({},{},{})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Convert a pixel width to the engine's column width unit
pub fn px_to_width(px: f64) -> f64 {
    (((px - 5.0) / 7.0 * 100.0) + 0.5).trunc() / 100.0
}

/// Approximate pixel width of `chars` characters at `font_size` points
pub fn chars_to_px(chars: f64, font_size: f64) -> f64 {
    (chars * 8.0 + (chars / 10.0).ceil() * 5.0) * (font_size / 10.0).ceil()
}

/// Column width needed to show `chars` characters at `font_size` points
pub fn chars_to_width(chars: f64, font_size: f64) -> f64 {
    px_to_width(chars_to_px(chars, font_size))
}

/// Display width of a string in narrow characters.
///
/// Each UTF-16 unit counts once, and once more when its high byte is set,
/// which approximates wide glyphs.
pub fn display_chars(s: &str) -> u32 {
    s.encode_utf16()
        .map(|unit| if unit & 0xff00 != 0 { 2 } else { 1 })
        .sum()
}

/// Day count for a UTC instant given in milliseconds since the unix epoch
pub fn utc_to_serial(ms: i64) -> f64 {
    (ms as f64 + SERIAL_EPOCH_OFFSET_MS) / MS_PER_DAY
}

/// Day count for wall-clock components, read as if they were UTC
pub fn naive_to_serial(naive: &NaiveDateTime) -> f64 {
    utc_to_serial(Utc.from_utc_datetime(naive).timestamp_millis())
}

/// A point in time to write as a date cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// An absolute instant
    Utc(DateTime<Utc>),
    /// Wall-clock time without a zone
    Local(NaiveDateTime),
}

impl Timestamp {
    /// Day count treating the timestamp as UTC
    pub fn utc_serial(&self) -> f64 {
        match self {
            Timestamp::Utc(dt) => utc_to_serial(dt.timestamp_millis()),
            Timestamp::Local(naive) => naive_to_serial(naive),
        }
    }

    /// Day count of the local wall-clock reading
    pub fn local_serial(&self) -> f64 {
        match self {
            Timestamp::Utc(dt) => naive_to_serial(&dt.with_timezone(&Local).naive_local()),
            Timestamp::Local(naive) => naive_to_serial(naive),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Utc(dt)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Timestamp::Local(naive)
    }
}

/// Parse a textual timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and a bare
/// `YYYY-MM-DD` (midnight). Zone-less forms are wall-clock time.
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Timestamp::Utc(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Timestamp::Local(naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Timestamp::Local)
}

/// Quote a string as a JSON/JS string literal
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Format a number the way the engine's scripting language prints it
pub fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // covers -0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // exponent form always carries a sign
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_column_label() {
        assert_eq!(column_label(0), "A");
        assert_eq!(column_label(25), "Z");
        assert_eq!(column_label(26), "AA");
        assert_eq!(column_label(51), "AZ");
        assert_eq!(column_label(52), "BA");
        assert_eq!(column_label(701), "ZZ");
        assert_eq!(column_label(702), "AAA");
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("AAA"), Some(702));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref(0, 0), "A1");
        assert_eq!(cell_ref(9, 27), "AB10");
        assert_eq!(range_ref(0, 0, 1, 2), "A1:C2");
    }

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("#ff8000"), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::from_hex("00ff10"), Rgb::new(0, 255, 16));
        assert_eq!(Rgb::from_hex("#fff"), Rgb::new(255, 15, 0));
        assert_eq!(Rgb::from_hex("zz0000"), Rgb::new(0, 0, 0));
        assert_eq!(Rgb::new(1, 2, 3).to_hex(), "#010203");
        assert_eq!(
            Rgb::from_hex("#102030").to_engine(),
            "Api.CreateColorFromRGB(16,32,48)"
        );
    }

    #[test]
    fn test_widths() {
        assert_eq!(px_to_width(75.0), 10.0);
        assert_eq!(px_to_width(12.0), 1.0);
        // 5 chars at 10pt: 5*8 + 1*5 = 45px
        assert_eq!(chars_to_px(5.0, 10.0), 45.0);
        // 12 chars at 11pt: (96 + 10) * 2
        assert_eq!(chars_to_px(12.0, 11.0), 212.0);
        assert_eq!(chars_to_width(5.0, 10.0), 5.71);
    }

    #[test]
    fn test_display_chars() {
        assert_eq!(display_chars("abc"), 3);
        assert_eq!(display_chars("中文"), 4);
        assert_eq!(display_chars(""), 0);
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(utc_to_serial(0), 25569.0);
        let noon = NaiveDate::from_ymd_opt(1970, 1, 2)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();
        assert_eq!(naive_to_serial(&noon), 25570.5);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("1970-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.utc_serial(), 25569.0);
        let ts = parse_timestamp("1970-01-02 12:00:00").unwrap();
        assert_eq!(ts.utc_serial(), 25570.5);
        let ts = parse_timestamp("1970-01-03").unwrap();
        assert_eq!(ts.local_serial(), 25571.0);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_js_literals() {
        assert_eq!(js_string("a\"b"), r#""a\"b""#);
        assert_eq!(js_number(10.0), "10");
        assert_eq!(js_number(12.5), "12.5");
        assert_eq!(js_number(-0.0), "0");
        assert_eq!(js_number(f64::NAN), "NaN");
        assert_eq!(js_number(1e21), "1e+21");
        assert_eq!(js_number(-2.5e22), "-2.5e+22");
        assert_eq!(js_number(1e20), "100000000000000000000");
        assert_eq!(js_number(1e-7), "1e-7");
        assert_eq!(js_number(1.5e-7), "1.5e-7");
        assert_eq!(js_number(0.000001), "0.000001");
    }

    proptest! {
        #[test]
        fn column_label_round_trips(label in "[A-Z]{1,3}") {
            let index = column_index(&label).unwrap();
            prop_assert_eq!(column_label(index), label);
        }

        #[test]
        fn column_index_round_trips(col in 0u32..100_000) {
            prop_assert_eq!(column_index(&column_label(col)), Some(col));
        }
    }
}
