//! Local checks run before a message is sent.
//!
//! Nothing here touches the network.

use chrono::Duration;

use crate::errors::ValidationError;
use crate::models::{ApnsPayload, ApnsPriority, Message};

/// Most `&&`/`||` operators FCM accepts in a topic condition
pub const MAX_CONDITION_OPERATORS: usize = 2;

/// Checks that `message` is well-formed.
///
/// The rules are, in order:
/// - a message must be present
/// - exactly one of token, topic and condition is set, and the condition holds
///   at most [`MAX_CONDITION_OPERATORS`] operators
/// - an Android TTL, when set, is a valid duration string
/// - a background-only APNs payload is not sent with high priority
pub fn validate(message: Option<&Message>) -> Result<(), ValidationError> {
    let msg = message.ok_or(ValidationError::InvalidMessage)?;

    let targets = [&msg.token, &msg.topic, &msg.condition]
        .iter()
        .filter(|target| !target.is_empty())
        .count();

    if condition_operator_count(&msg.condition) > MAX_CONDITION_OPERATORS {
        return Err(ValidationError::InvalidTarget);
    }

    if targets != 1 {
        return Err(ValidationError::InvalidTarget);
    }

    if let Some(android) = &msg.android {
        if !android.ttl.is_empty() && parse_duration(&android.ttl).is_none() {
            return Err(ValidationError::InvalidTimeToLive);
        }
    }

    if let Some(apns) = &msg.apns {
        let payload = ApnsPayload::from_map(&apns.payload)?;

        if let Some(headers) = &apns.headers {
            if payload.is_background_only() && headers.priority == ApnsPriority::High.as_str() {
                return Err(ValidationError::InvalidApnsPriority);
            }
        }
    }

    Ok(())
}

/// Non-overlapping occurrences of `&&` plus `||`, regardless of nesting
pub fn condition_operator_count(condition: &str) -> usize {
    condition.matches("&&").count() + condition.matches("||").count()
}

/// Parses a duration such as "3600s", "3.5s", "1h30m" or "-2ms".
///
/// Every number needs a unit (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`) except the
/// literal "0". Returns `None` for malformed input or values that overflow
/// 64-bit nanoseconds.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Some(Duration::zero());
    }
    if rest.is_empty() {
        return None;
    }

    let limit: u128 = if negative {
        i64::MAX as u128 + 1
    } else {
        i64::MAX as u128
    };
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let unit_len = after_number
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map_or(after_number.len(), |(idx, _)| idx);
        let (unit, remainder) = after_number.split_at(unit_len);
        let unit_nanos = unit_in_nanos(unit)?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let mut value = whole.checked_mul(unit_nanos)?;

        if !frac_part.is_empty() {
            // Digits past nanosecond precision of the largest unit are noise.
            let significant = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = significant.parse().ok()?;
            let scale = 10u128.pow(significant.len() as u32);
            value = value.checked_add(numerator * unit_nanos / scale)?;
        }

        total = total.checked_add(value)?;
        if total > limit {
            return None;
        }
        rest = remainder;
    }

    let nanos = if negative {
        (total as i128).checked_neg()?
    } else {
        total as i128
    };
    Some(Duration::nanoseconds(i64::try_from(nanos).ok()?))
}

fn unit_in_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "\u{00b5}s" | "\u{03bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}
