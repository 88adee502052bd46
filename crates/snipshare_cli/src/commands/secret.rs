//! The `gen-secret` command.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;

/// Prints a fresh webhook signing secret in the provider's
/// `whsec_<base64>` format.
pub fn run() {
    let mut key = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut key);
    println!("whsec_{}", BASE64.encode(key));
}
