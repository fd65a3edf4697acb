//! Random identifier generation for short codes and API tokens.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 8;

/// Length of generated API token secrets.
pub const TOKEN_LENGTH: usize = 32;

/// Generates a random alphanumeric string (`[A-Za-z0-9]`) of `len` characters.
///
/// Uses the thread-local CSPRNG.
pub fn generate_id(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generates a short code for a new link.
pub fn generate_code() -> String {
    generate_id(CODE_LENGTH)
}

/// Generates the plaintext secret of a new API token.
pub fn generate_token() -> String {
    generate_id(TOKEN_LENGTH)
}
