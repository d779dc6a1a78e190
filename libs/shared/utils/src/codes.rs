use rand::Rng;

const BOOKING_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 6-digit numeric one-time password.
pub fn generate_otp_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..1_000_000).to_string()
}

/// Uppercase alphanumeric booking reference of the requested length.
pub fn generate_booking_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..BOOKING_CODE_CHARSET.len());
            BOOKING_CODE_CHARSET[idx] as char
        })
        .collect()
}
