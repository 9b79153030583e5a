/// Mask a Telegram bot token for logging: the numeric bot id is harmless,
/// the secret after the colon is not.
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) => format!("{bot_id}:***"),
        None => "***".to_string(),
    }
}

/// Format a dollar amount with thousands separators, two decimals.
pub fn format_usd(value: f64) -> String {
    let rendered = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((&rendered, "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::{format_usd, mask_token};

    #[test]
    fn masks_the_secret_half_of_a_bot_token() {
        let masked = mask_token("123456789:AAF-secret-part");
        assert_eq!(masked, "123456789:***");
        assert!(!masked.contains("secret"));
    }

    #[test]
    fn masks_tokens_without_a_separator_entirely() {
        assert_eq!(mask_token("rawsecret"), "***");
    }

    #[test]
    fn formats_usd_with_separators() {
        assert_eq!(format_usd(50_000.0), "50,000.00");
        assert_eq!(format_usd(1_234_567.891), "1,234,567.89");
        assert_eq!(format_usd(0.8), "0.80");
        assert_eq!(format_usd(999.0), "999.00");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_usd(-1_250.5), "-1,250.50");
    }
}
