use rand::Rng;
use subtle::ConstantTimeEq;

const PICKUP_CODE_LEN: usize = 8;
const PICKUP_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate an 8-character uppercase alphanumeric pickup code.
///
/// Not unique by construction; the orders table enforces uniqueness and the
/// order engine regenerates on collision.
pub fn generate_pickup_code() -> String {
    let mut rng = rand::thread_rng();
    (0..PICKUP_CODE_LEN)
        .map(|_| PICKUP_CODE_CHARS[rng.gen_range(0..PICKUP_CODE_CHARS.len())] as char)
        .collect()
}

/// Generate a 6-digit collection OTP, leading zeros preserved.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..=999_999u32))
}

/// Constant-time equality for short secrets such as the collection OTP.
pub fn codes_match(supplied: &str, stored: &str) -> bool {
    supplied.as_bytes().ct_eq(stored.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pickup_code() {
        let code = generate_pickup_code();
        assert_eq!(code.len(), 8);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_otp() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_codes_match() {
        assert!(codes_match("048213", "048213"));
        assert!(!codes_match("048213", "048214"));
        assert!(!codes_match("48213", "048213"));
    }
}
