//! Amount normalization.
//!
//! Backend amounts arrive in whatever shape the reporting system produced:
//! `"1,234.56"`, `"(25,000)"`, `"USD 1,000.50"`, empty strings, or nothing at
//! all. [`parse_amount`] turns every one of them into a finite `f64`. Input
//! that cannot be read as a number becomes `0.0`, so totals and charts built
//! on top never fail because of dirty data.

/// Parses a backend amount string into a finite number.
///
/// - `None`, empty and whitespace-only input yield `0.0`
/// - `"(1,234.56)"` is read as `-1234.56`
/// - every character other than an ASCII digit, `.` or `-` is discarded
/// - the longest leading decimal is parsed; if there is none, `0.0`
pub fn parse_amount(raw: Option<&str>) -> f64 {
    let Some(text) = raw else {
        return 0.0;
    };

    let mut text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let negated = text.len() >= 2 && text.starts_with('(') && text.ends_with(')');
    if negated {
        text = &text[1..text.len() - 1];
    }

    let mut cleaned = String::with_capacity(text.len() + 1);
    if negated {
        cleaned.push('-');
    }
    cleaned.extend(
        text.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-'),
    );

    if cleaned.is_empty() || cleaned == "-" || cleaned == "." {
        return 0.0;
    }

    let value = leading_decimal(&cleaned)
        .and_then(|number| number.parse::<f64>().ok())
        .unwrap_or(0.0);

    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Returns the longest prefix of `text` that reads as a decimal number
/// (optional `-`, digits, optional fraction). Requires at least one digit.
fn leading_decimal(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    (digits > 0).then(|| &text[..end])
}

/// The textual form kept on a node for display: the raw value, or `""`.
pub fn format_amount(raw: Option<&str>) -> String {
    raw.unwrap_or_default().to_string()
}

/// Renders a number with thousands separators and at most two decimals,
/// e.g. `-1234.5` becomes `"-1,234.5"`.
pub fn display_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let is_zero = grouped == "0" && frac.is_empty();

    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}
