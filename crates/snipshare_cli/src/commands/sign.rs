//! The `sign` command.

use snipshare_server::{
    SigningSecret, WebhookVerifier, ID_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use std::io::Read;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Prints valid signing headers for a payload, for local delivery
/// testing with curl or similar.
pub fn run(
    payload: Option<&Path>,
    id: Option<String>,
    secret: Option<String>,
    secret_env: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let secret = match secret {
        Some(s) => s,
        None => std::env::var(secret_env)
            .map_err(|_| format!("no --secret given and {secret_env} is not set"))?,
    };

    let body = match payload {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let id = id.unwrap_or_else(|| format!("msg_{}", Uuid::new_v4().simple()));
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)?
        .as_secs()
        .to_string();

    let verifier = WebhookVerifier::new(SigningSecret::parse(&secret)?);
    let signature = verifier.sign(&id, &timestamp, &body);

    println!("{ID_HEADER}: {id}");
    println!("{TIMESTAMP_HEADER}: {timestamp}");
    println!("{SIGNATURE_HEADER}: {signature}");
    Ok(())
}
