use std::path::PathBuf;

pub const DEFAULT_DB_KEY: &str = "twitosDB";
pub const DEFAULT_DB_DIR: &str = ".twitos";

pub const MAX_POST_LENGTH: usize = 280;
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const SEED_USERNAME: &str = "naitik";
pub const SEED_PASSWORD: &str = "123456";
pub const SEED_BIO: &str = "Twitos creator ✨";
pub const SEED_POST_TEXT: &str = "Mera pehla Twitos post! 👋 #Twitos";
pub const SEED_POST_AGE_MS: i64 = 5 * 60 * 1000;

pub const DEFAULT_BIO: &str = "Hello! I'm new to Twitos!";
pub const GUEST_BIO: &str = "Just browsing!";
pub const GUEST_NAME_RANGE: u32 = 1000;
pub const GUEST_NAME_ATTEMPTS: usize = 32;

pub fn db_key() -> String {
    std::env::var("TWITOS_DB_KEY")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DB_KEY.to_string())
}

pub fn db_dir() -> PathBuf {
    std::env::var("TWITOS_DB_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_DIR))
}

pub fn hash_memory_kib() -> u32 {
    std::env::var("TWITOS_HASH_MEMORY_KIB")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(argon2::Params::DEFAULT_M_COST)
}

pub fn hash_iterations() -> u32 {
    std::env::var("TWITOS_HASH_ITERATIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(argon2::Params::DEFAULT_T_COST)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub db_key: String,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            db_key: db_key(),
            hash_memory_kib: hash_memory_kib(),
            hash_iterations: hash_iterations(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_key: DEFAULT_DB_KEY.to_string(),
            hash_memory_kib: argon2::Params::DEFAULT_M_COST,
            hash_iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}
