use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use argon2::password_hash::SaltString;
use rand::rngs::OsRng;
use crate::config::Config;

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn hash_password(password: &str, config: &Config) -> anyhow::Result<String> {
    let params = Params::new(
        config.hash_memory_kib,
        config.hash_iterations,
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid password hash parameters: {}", e))?;
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

/// Checks `password` against a stored credential.
///
/// Stored values that are not PHC hash strings come from plaintext records
/// and are compared verbatim.
pub fn verify_password(password: &str, stored: &str) -> bool {
    use argon2::PasswordHash;

    match PasswordHash::new(stored) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => password == stored,
    }
}

pub fn avatar_url(username: &str) -> String {
    format!("https://i.pravatar.cc/150?u={}", urlencoding::encode(username))
}

const SEED_AVATAR_SVG: &str = "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24' fill='#E0E0E0'><path d='M12 12c2.21 0 4-1.79 4-4s-1.79-4-4-4-4 1.79-4 4 1.79 4 4 4zm0 2c-2.67 0-8 1.34-8 4v2h16v-2c0-2.66-5.33-4-8-4z'/></svg>";

pub fn default_photo() -> String {
    format!("data:image/svg+xml,{}", urlencoding::encode(SEED_AVATAR_SVG))
}

/// Compact relative age: "42s", "5m", "3h", "2d", "4m" (months), "1y".
pub fn time_ago(timestamp: i64, now: i64) -> String {
    // whole seconds first, so 60.5s still reads "60s"
    let seconds = (now - timestamp).div_euclid(1000) as f64;

    // (seconds per unit, suffix), largest first
    const UNITS: [(f64, &str); 5] = [
        (31_536_000.0, "y"),
        (2_592_000.0, "m"),
        (86_400.0, "d"),
        (3_600.0, "h"),
        (60.0, "m"),
    ];
    for (span, suffix) in UNITS {
        let interval = seconds / span;
        if interval > 1.0 {
            return format!("{}{}", interval.floor() as i64, suffix);
        }
    }
    format!("{}s", seconds.max(0.0) as i64)
}
