//! Session commands: login, logout, token persistence.
//!
//! The bearer token lives in a plain file in the profile directory so the
//! session survives across invocations. Every run resumes it before
//! dispatching a command; a token the server no longer accepts simply
//! drops the run back to the local cart.

use std::io::Write;
use std::path::PathBuf;

use fashionhub_cart::{AccessToken, CartConfig, CartGateway, CartStore};

const TOKEN_FILE_NAME: &str = "session_token";

fn token_path(config: &CartConfig) -> PathBuf {
    config.profile_dir.join(TOKEN_FILE_NAME)
}

/// Read the persisted session token, if any.
///
/// # Errors
///
/// Returns error on filesystem failure other than the file being absent.
pub fn stored_token(config: &CartConfig) -> Result<Option<AccessToken>, std::io::Error> {
    match std::fs::read_to_string(token_path(config)) {
        Ok(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                Ok(None)
            } else {
                Ok(Some(AccessToken::new(raw)))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Exchange credentials for a token, persist it, and sign the store in.
///
/// # Errors
///
/// Returns error on bad credentials, transport failure, or when the token
/// cannot be persisted.
#[allow(clippy::print_stdout)]
pub async fn login(
    config: &CartConfig,
    store: &mut CartStore,
    email: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let gateway = CartGateway::new(config)?;
    let token = gateway.login(email, &password).await?;

    std::fs::create_dir_all(&config.profile_dir)?;
    std::fs::write(token_path(config), token.expose())?;

    // A session may already have been resumed; drop it so the login edge
    // fires with the fresh token.
    store.log_out().await;
    store.sign_in(token).await;

    println!("Logged in as {email}");
    Ok(())
}

/// Delete the persisted token and return the store to the local cart.
///
/// # Errors
///
/// Returns error on filesystem failure.
#[allow(clippy::print_stdout)]
pub async fn logout(
    config: &CartConfig,
    store: &mut CartStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match std::fs::remove_file(token_path(config)) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    store.log_out().await;
    println!("Logged out");
    Ok(())
}

#[allow(clippy::print_stderr)]
fn prompt_password() -> Result<String, std::io::Error> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
