/// String utility functions

/// Format a number with thousands separators
pub fn format_number_with_separators(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }

    result
}

/// Format a copper amount as gold/silver/copper
pub fn format_money(copper: u64) -> String {
    let gold = copper / 10_000;
    let silver = (copper % 10_000) / 100;
    let copper = copper % 100;

    if gold > 0 {
        format!("{}g {}s {}c", format_number_with_separators(gold), silver, copper)
    } else if silver > 0 {
        format!("{}s {}c", silver, copper)
    } else {
        format!("{}c", copper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_with_separators() {
        assert_eq!(format_number_with_separators(1000), "1,000");
        assert_eq!(format_number_with_separators(1000000), "1,000,000");
        assert_eq!(format_number_with_separators(123), "123");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(42), "42c");
        assert_eq!(format_money(305), "3s 5c");
        assert_eq!(format_money(123_456), "12g 34s 56c");
        assert_eq!(format_money(10_000_000), "1,000g 0s 0c");
    }
}
