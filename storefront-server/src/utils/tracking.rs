//! Tracking number generation
//!
//! Format: `TRK-<last 8 digits of epoch millis>-<4 random digits>`.
//! Uniqueness is enforced by the database index on
//! `order.tracking_number`; the workflow engine retries once on a
//! collision.

use chrono::Utc;
use rand::Rng;

/// Generate a tracking number, e.g. `TRK-56789012-0042`
pub fn generate_tracking_number() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(8)..];
    let random: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("TRK-{}-{:04}", tail, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_number_has_expected_shape() {
        let tn = generate_tracking_number();
        assert_eq!(tn.len(), 17, "TRK- + 8 digits + - + 4 digits: {tn}");
        assert!(tn.starts_with("TRK-"));
        let parts: Vec<&str> = tn.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
    }
}
