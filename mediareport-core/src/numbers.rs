//! Number and duration formatting shared by every serializer.
//!
//! This is the only place where numbers become text. Formatters are keyed by
//! locale (English `.` or French `,` decimal separator) and precision tier,
//! built once in [`NUMBER_UTILS`] and never mutated afterwards.

use once_cell::sync::Lazy;
use std::time::Duration;

/// Finite stand-in for negative infinity, below every realistic decibel floor.
pub const NEGATIVE_INFINITY_SENTINEL: i32 = -144;

/// Finite stand-in for positive infinity.
pub const POSITIVE_INFINITY_SENTINEL: i32 = 144;

/// Placeholder displayed for unknown values.
pub const UNKNOWN_VALUE_PLACEHOLDER: &str = "?";

/// French grouping separator (narrow no-break space).
const FRENCH_GROUPING: char = '\u{202F}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    English,
    French,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// One fraction digit, no grouping.
    Low,
    /// Up to five fraction digits, no grouping.
    High,
    /// Grouped thousands, one fraction digit.
    Full,
}

/// Replaces infinities by their sentinels. NaN is passed through untouched.
#[must_use]
pub fn clamp_infinity(value: f64) -> f64 {
    if value == f64::NEG_INFINITY {
        f64::from(NEGATIVE_INFINITY_SENTINEL)
    } else if value == f64::INFINITY {
        f64::from(POSITIVE_INFINITY_SENTINEL)
    } else {
        value
    }
}

/// The number a typed sink stores for a float: infinities become their
/// sentinels and NaN has no value.
#[must_use]
pub fn storable_float(value: f64) -> Option<f64> {
    let value = clamp_infinity(value);
    (!value.is_nan()).then_some(value)
}

/// Decimal formatter with a fixed separator set and a fraction digit cap.
///
/// Trailing fraction zeros are dropped and a rounded negative zero prints as
/// `0`, so `3.10` renders `3.1` and `-0.00001` at one digit renders `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    decimal_separator: char,
    grouping_separator: Option<char>,
    max_fraction_digits: usize,
}

impl NumberFormat {
    pub const fn new(
        decimal_separator: char,
        grouping_separator: Option<char>,
        max_fraction_digits: usize,
    ) -> Self {
        Self {
            decimal_separator,
            grouping_separator,
            max_fraction_digits,
        }
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn max_fraction_digits(&self) -> usize {
        self.max_fraction_digits
    }

    /// Formats a float. NaN gives an empty string, infinities their sentinels.
    #[must_use]
    pub fn format_float(&self, value: f64) -> String {
        if value.is_nan() {
            return String::new();
        }
        let value = clamp_infinity(value);

        let fixed = format!("{:.*}", self.max_fraction_digits, value);
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
            None => (fixed.as_str(), ""),
        };
        let (negative, digits) = match int_part.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, int_part),
        };
        let is_zero = frac_part.is_empty() && digits.bytes().all(|b| b == b'0');

        let mut out = String::with_capacity(fixed.len() + digits.len() / 3);
        if negative && !is_zero {
            out.push('-');
        }
        self.push_grouped(&mut out, digits);
        if !frac_part.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }

    /// Formats an integer, grouped when this formatter groups.
    #[must_use]
    pub fn format_integer(&self, value: i64) -> String {
        let digits = value.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if value < 0 {
            out.push('-');
        }
        self.push_grouped(&mut out, &digits);
        out
    }

    /// Parses text produced by this formatter back into a float.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let mut normalized: String = text
            .chars()
            .filter(|c| Some(*c) != self.grouping_separator)
            .collect();
        if self.decimal_separator != '.' {
            normalized = normalized.replace(self.decimal_separator, ".");
        }
        normalized.parse().ok()
    }

    fn push_grouped(&self, out: &mut String, digits: &str) {
        let Some(separator) = self.grouping_separator else {
            out.push_str(digits);
            return;
        };
        let len = digits.len();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(separator);
            }
            out.push(c);
        }
    }
}

/// The process-wide formatter set, one per locale and precision.
#[derive(Debug)]
pub struct NumberUtils {
    english_low: NumberFormat,
    english_high: NumberFormat,
    english_full: NumberFormat,
    french_low: NumberFormat,
    french_high: NumberFormat,
    french_full: NumberFormat,
}

pub static NUMBER_UTILS: Lazy<NumberUtils> = Lazy::new(NumberUtils::new);

impl Default for NumberUtils {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberUtils {
    pub fn new() -> Self {
        Self {
            english_low: NumberFormat::new('.', None, 1),
            english_high: NumberFormat::new('.', None, 5),
            english_full: NumberFormat::new('.', Some(','), 1),
            french_low: NumberFormat::new(',', None, 1),
            french_high: NumberFormat::new(',', None, 5),
            french_full: NumberFormat::new(',', Some(FRENCH_GROUPING), 1),
        }
    }

    pub fn formatter(&self, locale: Locale, precision: Precision) -> &NumberFormat {
        match (locale, precision) {
            (Locale::English, Precision::Low) => &self.english_low,
            (Locale::English, Precision::High) => &self.english_high,
            (Locale::English, Precision::Full) => &self.english_full,
            (Locale::French, Precision::Low) => &self.french_low,
            (Locale::French, Precision::High) => &self.french_high,
            (Locale::French, Precision::Full) => &self.french_full,
        }
    }

    /// Display text for a possibly unknown value, grouped, one decimal digit.
    #[must_use]
    pub fn value_to_string(&self, value: Option<f64>) -> String {
        match value {
            None => UNKNOWN_VALUE_PLACEHOLDER.to_string(),
            Some(v) if v.is_nan() => UNKNOWN_VALUE_PLACEHOLDER.to_string(),
            Some(v) => self.english_full.format_float(v),
        }
    }

    /// Display text for an integer, grouped.
    #[must_use]
    pub fn long_to_string(&self, value: i64) -> String {
        self.english_full.format_integer(value)
    }
}

/// Formats a duration as `HH:MM:SS[.mmm]`.
///
/// Hours keep counting past a day (48h gives `48:00:00`) and the millisecond
/// group is left out on whole seconds.
#[must_use]
pub fn duration_to_string(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    if millis > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Converts seconds to milliseconds, keeping NaN.
#[must_use]
pub fn sec_to_ms(seconds: f64) -> f64 {
    seconds * 1000.0
}

/// Differences between consecutive values. The first slot is NaN.
#[must_use]
pub fn time_derivative(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(values.windows(2).map(|pair| pair[1] - pair[0]));
    out
}
