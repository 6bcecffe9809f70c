//! Line-item codec
//!
//! Packs an ordered list of (flavor, dozens) pairs into the order's single
//! `detail` text column and back. Encoding strips the separator sequences
//! from flavor text so the delimiters stay unambiguous. Decoding is
//! maximally permissive: malformed entries are dropped, never raised, so
//! legacy rows always load.
//!
//! A `detail` value with no value separator at all is legacy data from
//! before the multi-flavor format and decodes as a single item of one dozen.

use shared::models::LineItem;

const ENTRY_SEPARATOR: &str = "||";
const VALUE_SEPARATOR: &str = "::";

/// Display separator between rendered entries
const DISPLAY_SEPARATOR: &str = " · ";

/// Encode line items into the persisted text form
///
/// Items with a blank flavor or non-positive dozens are silently dropped.
/// Empty input encodes to an empty string.
pub fn encode(items: &[LineItem]) -> String {
    items
        .iter()
        .filter_map(|item| {
            let flavor = item.flavor.trim();
            if flavor.is_empty() || item.dozens <= 0 {
                return None;
            }
            let flavor = flavor.replace(VALUE_SEPARATOR, "").replace(ENTRY_SEPARATOR, "");
            Some(format!("{}{}{}", flavor, VALUE_SEPARATOR, item.dozens))
        })
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Decode the persisted text form back into line items
///
/// Never fails: entries that do not split into exactly flavor and quantity,
/// have an unparsable or non-positive quantity, or a blank flavor are
/// dropped.
pub fn decode(raw: &str) -> Vec<LineItem> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    if !raw.contains(VALUE_SEPARATOR) {
        // Legacy single-flavor row: the whole text is the flavor, one dozen
        return vec![LineItem::new(raw.trim(), 1)];
    }

    raw.split(ENTRY_SEPARATOR)
        .filter_map(|part| {
            let pieces: Vec<&str> = part.split(VALUE_SEPARATOR).collect();
            let [flavor, quantity] = pieces.as_slice() else {
                return None;
            };
            let flavor = flavor.trim();
            let dozens: i32 = quantity.trim().parse().ok()?;
            if flavor.is_empty() || dozens <= 0 {
                return None;
            }
            Some(LineItem::new(flavor, dozens))
        })
        .collect()
}

/// Human-readable rendering of a persisted `detail` value
///
/// If decoding yields nothing the raw text is returned unchanged, so legacy
/// or garbage data never disappears from a screen.
pub fn to_display_text(raw: &str) -> String {
    let decoded = decode(raw);
    if decoded.is_empty() {
        return raw.to_string();
    }
    decoded
        .iter()
        .map(|item| format!("{} ({})", item.flavor, item.dozens))
        .collect::<Vec<_>>()
        .join(DISPLAY_SEPARATOR)
}
