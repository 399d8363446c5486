//! ISO 6346 container-identifier check digit
//!
//! A container identifier is 4 uppercase letters (owner code + category
//! identifier), 6 digits (serial number) and 1 check digit derived from the
//! preceding 10 characters. Both functions here are pure: malformed input is
//! reported as `None`, never as a panic or an error path.

use serde::Serialize;

/// Outcome of verifying a full 11-character identifier.
///
/// The expected digit is always returned so callers can present the
/// corrected identifier when the supplied digit does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub expected_check_digit: u8,
}

/// Numeric value of a letter under ISO 6346.
///
/// Values start at 10 for 'A' and increase by one per letter, skipping every
/// multiple of 11 (A=10, B=12 ... K=21, L=23 ... U=32, V=34 ... Z=38). The
/// skip keeps every character value coprime with the mod-11 step.
fn letter_value(letter: u8) -> u32 {
    let mut value = 10u32;
    for _ in 0..(letter - b'A') {
        value += 1;
        if value % 11 == 0 {
            value += 1;
        }
    }
    value
}

/// Compute the check digit for a 10-character identifier body.
///
/// The body must be exactly 4 uppercase ASCII letters followed by 6 ASCII
/// digits; any other shape yields `None`. Each position's value is weighted
/// by 2^position, summed, and reduced mod 11 with 10 wrapping to 0 (ISO 6346
/// defines no check digit of 10).
pub fn compute_check_digit(body: &str) -> Option<u8> {
    let bytes = body.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    if !bytes[..4].iter().all(u8::is_ascii_uppercase) {
        return None;
    }
    if !bytes[4..].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let weighted_sum: u32 = bytes
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let value = if i < 4 {
                letter_value(b)
            } else {
                u32::from(b - b'0')
            };
            value << i
        })
        .sum();

    let digit = weighted_sum % 11;
    Some(if digit == 10 { 0 } else { digit as u8 })
}

/// Verify a full 11-character identifier against its embedded check digit.
///
/// Returns `None` when the input does not match the 4-letters-7-digits shape.
pub fn validate(full_id: &str) -> Option<Validation> {
    let bytes = full_id.as_bytes();
    if bytes.len() != 11 || !full_id.is_ascii() || !bytes[10].is_ascii_digit() {
        return None;
    }

    let expected = compute_check_digit(&full_id[..10])?;
    let supplied = bytes[10] - b'0';

    Some(Validation {
        is_valid: supplied == expected,
        expected_check_digit: expected,
    })
}
