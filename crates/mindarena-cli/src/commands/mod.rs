//! Subcommand implementations

pub mod auth;
pub mod history;
pub mod play;
pub mod problems;
pub mod profile;

use crate::display;
use mindarena_sdk::{ArenaClient, Navigator, Route};
use mindarena_types::UserId;

/// Turns redirects into hints about which command to run next
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => display::warning(
                "Not logged in or session expired. Run `mindarena login --email <email>`.",
            ),
            Route::Calibration => {
                display::warning("Your profile is not calibrated yet. Run `mindarena calibrate`.")
            }
            Route::Arena => display::info("Run `mindarena play` to enter the arena."),
            Route::Profile => display::info("Run `mindarena profile show` to see your profile."),
        }
    }
}

/// Logged-in user's id, or a login hint and an error
pub(crate) fn require_user(client: &ArenaClient) -> anyhow::Result<UserId> {
    match client.current_user() {
        Ok(user) => Ok(user.user_id()),
        Err(e) => {
            client.navigate(Route::Login);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindarena_sdk::mock::{MockTransport, RecordingNavigator};
    use mindarena_sdk::{ClientConfig, MemoryCredentialStore, SessionContext};
    use mindarena_types::AuthUser;
    use std::sync::Arc;

    fn client(navigator: Arc<RecordingNavigator>) -> ArenaClient {
        let session = SessionContext::new(Arc::new(MemoryCredentialStore::new()));
        ArenaClient::with_transport(ClientConfig::default(), Arc::new(MockTransport::new()), session)
            .with_navigator(navigator)
    }

    #[test]
    fn test_require_user_hints_login() {
        let navigator = Arc::new(RecordingNavigator::new());
        let client = client(navigator.clone());

        assert!(require_user(&client).is_err());
        assert_eq!(navigator.last(), Some(Route::Login));

        client
            .session()
            .login("tok", AuthUser::new("ada@example.com"))
            .unwrap();
        assert_eq!(require_user(&client).unwrap().as_str(), "ada@example.com");
    }
}
