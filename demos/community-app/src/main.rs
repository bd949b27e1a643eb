//! Demo: the auth core of a community-management app, end to end.
//!
//! Wires an in-memory auth provider into an [`AppShell`], registers the
//! app's routes, and walks through the flows the core exists for:
//! startup resolution, a login redirect with return-path preservation,
//! tier denials, and a remote sign-out arriving as a provider event.
//!
//! Run with: `cargo run -p community-app`
//! (set `RUST_LOG=debug` to watch the guard's decisions)

use std::sync::Arc;

use portico::prelude::*;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Dev auth provider
// ---------------------------------------------------------------------------

/// JSON user table standing in for the managed backend.
const USER_FIXTURES: &str = r#"[
    { "password": "atabaque",
      "identity": { "id": "u-1", "display_name": "Pai Jorge",
                    "email": "jorge@example.com", "role": "admin" } },
    { "password": "axe",
      "identity": { "id": "u-2", "display_name": "Maria",
                    "email": "maria@example.com", "role": "member" } },
    { "password": "visit",
      "identity": { "id": "u-3", "display_name": "Visitor",
                    "email": "visitor@example.com", "role": "guest" } }
]"#;

/// In-memory provider. Development only — accounts live in a JSON blob and
/// nobody persists a session across restarts.
struct DevProvider {
    accounts: Vec<(String, Identity)>,
}

impl DevProvider {
    fn from_fixtures() -> Self {
        let rows: Vec<serde_json::Value> =
            serde_json::from_str(USER_FIXTURES).expect("fixtures are valid JSON");
        let accounts = rows
            .into_iter()
            .map(|row| {
                let password = row["password"]
                    .as_str()
                    .expect("fixture has a password")
                    .to_string();
                let identity: Identity =
                    serde_json::from_value(row["identity"].clone())
                        .expect("fixture identity parses");
                (password, identity)
            })
            .collect();
        Self { accounts }
    }
}

impl AuthProvider for DevProvider {
    async fn current_session(&self) -> Result<Option<Identity>, AuthError> {
        // Fresh start every run.
        Ok(None)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        self.accounts
            .iter()
            .find(|(pw, identity)| identity.email == email && pw == password)
            .map(|(_, identity)| identity.clone())
            .ok_or_else(|| {
                AuthError::CredentialsRejected("unknown account".into())
            })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App wiring
// ---------------------------------------------------------------------------

fn routes() -> RouteTable {
    RouteTable::new()
        .with("/", RoutePolicy::public())
        .with("/login", RoutePolicy::anonymous_only())
        .with("/frentes", RoutePolicy::public())
        .with("/events", RoutePolicy::public())
        .with("/readings", RoutePolicy::members_only())
        .with("/messages", RoutePolicy::members_only())
        .with("/profile", RoutePolicy::authenticated())
        .with("/admin/members", RoutePolicy::admin_only())
        .with("/admin/events", RoutePolicy::admin_only())
}

fn show(shell: &AppShell<DevProvider>, path: &str) -> Option<String> {
    match shell.navigate(path) {
        Ok(nav) => {
            match &nav.decision {
                Decision::Render => println!("  {path} -> render"),
                Decision::ShowLoading => println!("  {path} -> loading..."),
                Decision::Redirect {
                    target,
                    preserve_return_path,
                } => println!(
                    "  {path} -> redirect to {target}{}",
                    if *preserve_return_path { " (will return)" } else { "" }
                ),
            }
            nav.return_token
        }
        Err(e) => {
            println!("  {path} -> error: {e}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), PorticoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let shell = Arc::new(AppShell::new(DevProvider::from_fixtures(), routes()));

    println!("before initialize (session still resolving):");
    show(&shell, "/messages");

    shell.initialize().await;

    println!("\nanonymous visitor:");
    show(&shell, "/");
    show(&shell, "/frentes");
    let token = show(&shell, "/messages");

    println!("\nsigning in as maria@example.com...");
    let destination = shell
        .complete_sign_in(
            "maria@example.com",
            "axe",
            token.as_deref(),
        )
        .await?;
    println!("  -> back to {destination}");

    println!("\nas a member:");
    show(&shell, "/messages");
    show(&shell, "/login");
    show(&shell, "/admin/members");

    // A sign-out from "another tab" arrives over the provider bridge.
    println!("\nremote sign-out event:");
    let (tx, rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn({
        let shell = Arc::clone(&shell);
        async move { shell.drive_events(rx).await }
    });
    tx.send(AuthEvent::SignedOut).expect("driver is running");
    drop(tx);
    driver.await.expect("driver exits when the channel closes");

    show(&shell, "/messages");

    Ok(())
}
