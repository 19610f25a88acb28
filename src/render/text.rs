//! Text measurement for the built-in Helvetica font.

/// Advance widths of Helvetica for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const ELLIPSIS: &str = "...";

/// Replace everything outside printable ASCII with `?`.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}

/// Width of sanitized `text` at `font_size` points.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text
        .bytes()
        .map(|b| {
            let index = usize::from(b.saturating_sub(32));
            u32::from(HELVETICA_WIDTHS.get(index).copied().unwrap_or(556))
        })
        .sum();
    f64::from(units) * font_size / 1000.0
}

/// Sanitize `text` and shorten it with a trailing ellipsis until it fits
/// in `max_width` points.
pub fn fit_text(text: &str, font_size: f64, max_width: f64) -> String {
    let text = sanitize(text);
    if text_width(&text, font_size) <= max_width {
        return text;
    }

    let mut kept = text.as_str();
    while !kept.is_empty() {
        kept = &kept[..kept.len() - 1];
        let candidate = format!("{kept}{ELLIPSIS}");
        if text_width(&candidate, font_size) <= max_width {
            return candidate;
        }
    }

    if text_width(ELLIPSIS, font_size) <= max_width {
        ELLIPSIS.to_string()
    } else {
        String::new()
    }
}
