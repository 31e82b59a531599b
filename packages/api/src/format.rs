//! Display and input formatting for phone numbers, card numbers and expiry
//! dates. All functions are total: unexpected input yields a best-effort
//! string, never an error.

/// Strip everything but ASCII digits.
pub fn clean_phone_number(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Group a ten-digit number as `XXX XXX XXXX`; other lengths come back as
/// bare digits.
pub fn format_phone_number(value: &str) -> String {
    let digits = clean_phone_number(value);
    if digits.len() != 10 {
        return digits;
    }
    format!("{} {} {}", &digits[..3], &digits[3..6], &digits[6..])
}

/// Last four digits of a card number, ignoring separators.
pub fn card_last4(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}

pub fn mask_card_number(last4: &str) -> String {
    format!("**** **** **** {last4}")
}

/// Whether `value` has the shape produced by [`mask_card_number`]: one or
/// more `*` followed by exactly four digits, ignoring whitespace.
pub fn is_masked_card_number(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let tail = compact.trim_start_matches('*');
    tail.len() < compact.len() && tail.len() == 4 && tail.chars().all(|c| c.is_ascii_digit())
}

/// Insert a space after every fourth digit, for live card-number input.
pub fn format_card_input(value: &str) -> String {
    let mut out = String::new();
    for (i, c) in value.chars().filter(char::is_ascii_digit).enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// `"1226"` → `"12/26"`. At most four digits are kept.
pub fn format_expiry_input(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() <= 2 {
        return digits;
    }
    format!("{}/{}", &digits[..2], &digits[2..])
}
