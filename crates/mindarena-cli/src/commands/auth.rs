//! Auth commands - local credential management
//!
//! Tokens are issued by the external auth provider; these commands only
//! persist and clear them.

use crate::display;
use colored::*;
use dialoguer::Password;
use mindarena_sdk::ArenaClient;
use mindarena_types::AuthUser;

/// Store a token and identity
pub fn login(
    client: &ArenaClient,
    email: &str,
    token: Option<String>,
    name: Option<String>,
) -> anyhow::Result<()> {
    let token = match token {
        Some(token) => token,
        None => Password::new().with_prompt("Token").interact()?,
    };

    let mut user = AuthUser::new(email);
    user.name = name;
    client.session().login(token, user)?;

    display::success(&format!("Logged in as {}", email.bright_cyan()));
    display::info(&format!(
        "Credentials saved to {}",
        client.config().credentials_path.display()
    ));
    Ok(())
}

/// Clear stored credentials
pub fn logout(client: &ArenaClient) -> anyhow::Result<()> {
    if !client.session().is_authenticated() {
        display::info("Not logged in");
        return Ok(());
    }
    client.logout()?;
    display::success("Logged out");
    Ok(())
}

/// Show the cached identity. Does not contact the server.
pub fn whoami(client: &ArenaClient) -> anyhow::Result<()> {
    match client.current_user() {
        Ok(user) => {
            display::labeled("Email", &user.email);
            if let Some(name) = &user.name {
                display::labeled("Name", name);
            }
            display::labeled("Server", &client.config().endpoint);
        }
        Err(_) => display::warning("Not logged in"),
    }
    Ok(())
}
