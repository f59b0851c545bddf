//! Label fitting: full, shrunk, abbreviated, truncated or omitted.
//!
//! Given a scientific name and the space a layout can offer, the fitter walks
//! a fixed fallback chain and returns the first variant that fits:
//!
//! 1. the full name at full size
//! 2. the full name shrunk, if the shrink factor stays above `min_scale`
//! 3. the binomial abbreviation ("Homo sapiens" → "H. sapiens"), for
//!    species-level ranks only, full size or shrunk
//! 4. the full name truncated with an ellipsis
//! 5. nothing

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '…';

/// Truncations keeping fewer characters than this are omitted instead.
const MIN_TRUNCATED_CHARS: usize = 3;

/// Ranks whose names are binomials (or longer) and may be abbreviated.
const BINOMIAL_RANKS: &[&str] = &[
    "species",
    "subspecies",
    "variety",
    "varietas",
    "forma",
    "strain",
    "isolate",
];

/// Measures rendered text width in layout units.
pub trait TextMeasurer {
    fn width(&self, text: &str) -> f64;
}

/// Fixed advance per display column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharWidthMeasurer {
    pub char_width: f64,
}

impl CharWidthMeasurer {
    pub fn new(char_width: f64) -> Self {
        Self { char_width }
    }
}

impl TextMeasurer for CharWidthMeasurer {
    fn width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }
}

/// Which step of the fallback chain produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FitKind {
    Full,
    Scaled,
    Abbreviated,
    Truncated,
}

/// A label that fits its space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FittedLabel {
    pub text: String,
    /// Rendered width after scaling.
    pub width: f64,
    /// Font scale in `(0, 1]`.
    pub scale: f64,
    pub kind: FitKind,
}

/// Walks the label fallback chain against a measurer.
#[derive(Debug, Clone, Copy)]
pub struct LabelFitter<'a, M: TextMeasurer> {
    measurer: &'a M,
    min_scale: f64,
}

impl<'a, M: TextMeasurer> LabelFitter<'a, M> {
    pub fn new(measurer: &'a M, min_scale: f64) -> Self {
        Self {
            measurer,
            min_scale: min_scale.clamp(f64::EPSILON, 1.0),
        }
    }

    /// Fit `text` unchanged, shrinking it if allowed.
    pub fn fit_unchanged(&self, text: &str, available: f64) -> Option<FittedLabel> {
        self.fit_as(text, available, FitKind::Full)
    }

    /// Fit a name through the whole fallback chain.
    pub fn fit(&self, name: &str, rank: &str, available: f64) -> Option<FittedLabel> {
        if name.is_empty() || !(available > 0.0) {
            return None;
        }
        if let Some(label) = self.fit_unchanged(name, available) {
            return Some(label);
        }
        if let Some(short) = abbreviate_binomial(name, rank) {
            if let Some(label) = self.fit_as(&short, available, FitKind::Abbreviated) {
                return Some(label);
            }
        }
        self.truncate(name, available)
    }

    fn fit_as(&self, text: &str, available: f64, kind: FitKind) -> Option<FittedLabel> {
        let width = self.measurer.width(text);
        if width <= 0.0 {
            return None;
        }
        if width <= available {
            return Some(FittedLabel {
                text: text.to_string(),
                width,
                scale: 1.0,
                kind,
            });
        }
        let scale = available / width;
        if scale >= self.min_scale {
            let kind = if kind == FitKind::Full {
                FitKind::Scaled
            } else {
                kind
            };
            return Some(FittedLabel {
                text: text.to_string(),
                width: available,
                scale,
                kind,
            });
        }
        None
    }

    fn truncate(&self, name: &str, available: f64) -> Option<FittedLabel> {
        let mut best: Option<(String, f64)> = None;
        let mut prefix = String::new();
        for (count, c) in name.chars().enumerate() {
            prefix.push(c);
            let candidate = format!("{}{}", prefix.trim_end(), ELLIPSIS);
            let width = self.measurer.width(&candidate);
            if width > available {
                break;
            }
            if count + 1 >= MIN_TRUNCATED_CHARS {
                best = Some((candidate, width));
            }
        }
        best.map(|(text, width)| FittedLabel {
            text,
            width,
            scale: 1.0,
            kind: FitKind::Truncated,
        })
    }
}

/// Abbreviate every word but the last to its initial.
///
/// Only applies to species-level ranks with at least two words:
/// "Homo sapiens neanderthalensis" → "H. s. neanderthalensis".
pub fn abbreviate_binomial(name: &str, rank: &str) -> Option<String> {
    if !BINOMIAL_RANKS.contains(&rank.to_ascii_lowercase().as_str()) {
        return None;
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    let (last, head) = words.split_last()?;
    if head.is_empty() {
        return None;
    }
    let mut parts: Vec<String> = head
        .iter()
        .filter_map(|word| word.chars().next())
        .map(|initial| format!("{initial}."))
        .collect();
    parts.push((*last).to_string());
    Some(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEASURER: CharWidthMeasurer = CharWidthMeasurer { char_width: 10.0 };

    fn fitter() -> LabelFitter<'static, CharWidthMeasurer> {
        LabelFitter::new(&MEASURER, 0.8)
    }

    #[test]
    fn test_measure_uses_display_columns() {
        assert_eq!(MEASURER.width("Homo"), 40.0);
        assert_eq!(MEASURER.width(""), 0.0);
    }

    #[test]
    fn test_abbreviate_binomial() {
        assert_eq!(
            abbreviate_binomial("Homo sapiens", "species").as_deref(),
            Some("H. sapiens")
        );
        assert_eq!(
            abbreviate_binomial("Homo sapiens neanderthalensis", "subspecies").as_deref(),
            Some("H. s. neanderthalensis")
        );
        assert_eq!(abbreviate_binomial("Homo sapiens", "genus"), None);
        assert_eq!(abbreviate_binomial("Homo", "species"), None);
    }

    #[test]
    fn test_full_fit() {
        let label = fitter().fit("Homo sapiens", "species", 200.0).unwrap();
        assert_eq!(label.text, "Homo sapiens");
        assert_eq!(label.kind, FitKind::Full);
        assert_eq!(label.scale, 1.0);
        assert_eq!(label.width, 120.0);
    }

    #[test]
    fn test_scaled_fit() {
        let label = fitter().fit("Homo sapiens", "species", 110.0).unwrap();
        assert_eq!(label.kind, FitKind::Scaled);
        assert!((label.scale - 110.0 / 120.0).abs() < 1e-9);
        assert_eq!(label.width, 110.0);
    }

    #[test]
    fn test_abbreviated_before_truncated() {
        // Full name would need a 0.75 shrink, below the 0.8 floor.
        let label = fitter().fit("Homo sapiens", "species", 90.0).unwrap();
        assert_eq!(label.text, "H. sapiens");
        assert_eq!(label.kind, FitKind::Abbreviated);
        assert!((label.scale - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_when_not_binomial() {
        let label = fitter().fit("Hominidae", "family", 60.0).unwrap();
        assert_eq!(label.kind, FitKind::Truncated);
        assert_eq!(label.text, "Homin…");
        assert!(label.width <= 60.0);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let label = fitter().fit("Ærøskøbingia", "genus", 50.0).unwrap();
        assert_eq!(label.text, "Ærøs…");
    }

    #[test]
    fn test_omitted_when_no_room() {
        assert!(fitter().fit("Hominidae", "family", 25.0).is_none());
        assert!(fitter().fit("Hominidae", "family", 0.0).is_none());
        assert!(fitter().fit("", "family", 100.0).is_none());
    }
}
