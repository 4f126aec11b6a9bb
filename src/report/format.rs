use num_format::{Locale, ToFormattedString};

/// Currency cell text, e.g. `US$ 1234.50`
pub fn format_usd(amount: f64) -> String {
    format!("US$ {:.2}", amount)
}

/// Percentage cell text, e.g. `10%`
pub fn format_percent(percent: u32) -> String {
    format!("{}%", percent)
}

/// Two-decimal amount with thousands separators, e.g. `10,001.00`
pub fn format_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = match whole.parse::<u64>() {
        Ok(whole) => whole.to_formatted_string(&Locale::en),
        // Beyond u64; leave ungrouped
        Err(_) => whole.to_string(),
    };

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(240.0), "US$ 240.00");
        assert_eq!(format_usd(1234.5), "US$ 1234.50");
        assert_eq!(format_usd(0.005), "US$ 0.01");
        assert_eq!(format_usd(-100.0), "US$ -100.00");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0.00");
        assert_eq!(format_thousands(999.0), "999.00");
        assert_eq!(format_thousands(10_000.0), "10,000.00");
        assert_eq!(format_thousands(10_001.0), "10,001.00");
        assert_eq!(format_thousands(1_234_567.891), "1,234,567.89");
        assert_eq!(format_thousands(-99_001.0), "-99,001.00");
        assert_eq!(format_thousands(999.995), "1,000.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(5), "5%");
    }
}
