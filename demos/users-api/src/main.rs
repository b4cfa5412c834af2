//! Users API demo
//!
//! Reads and writes a `users` collection through a `ResourceService`.
//!
//! ```text
//! USERS_API_URL=http://localhost:8080/api RUST_LOG=rivet=debug cargo run -p users-api-demo
//! ```

#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use rivet::prelude::*;
use tracing::info;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";

// ============================================================================
// Models
// ============================================================================

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[model(path = "/users", after_materialize = "normalize")]
pub struct User {
    pub id: Option<u64>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub active: bool,
}

impl User {
    fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }
}

/// Fields to change on a user.
#[derive(Debug, Clone, Serialize, Deserialize, Identified)]
pub struct UserChanges {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ============================================================================
// Workflow
// ============================================================================

async fn run(users: &ResourceService<User>) -> rivet::Result<()> {
    let page = users
        .find_all()
        .only(["id", "name", "email"])
        .limit(5)
        .order_by_asc("name")
        .list()
        .await?;
    info!(shown = page.len(), total = ?page.count(), "listed users");
    for user in page.items() {
        println!("{:>4}  {:<20} {}", user.id.unwrap_or_default(), user.name, user.email);
    }

    let mut ada = User {
        id: None,
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        active: false,
    };
    users.create(&mut ada).await?;
    info!(id = ?ada.id, "created user");

    if let Some(id) = ada.id {
        let mut changes = UserChanges {
            id,
            active: Some(true),
        };
        users.patch(&mut changes).await?;

        let fresh = users.find_by_id(id).fresh().one().await?;
        println!("{} is active: {}", fresh.name, fresh.active);
    }

    users.find_where("active", false).and_where("name", "Ada Lovelace").remove().await?;
    info!("removed inactive duplicates");

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> rivet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rivet=info,users_api_demo=info")),
        )
        .init();

    let api_url = std::env::var("USERS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    ApiConfig::global().set_base_url(api_url);

    let client = HyperClient::builder().with_logging().build();
    let users = ResourceService::<User>::new(client);
    println!("Users endpoint: {}", users.api_url());

    run(&users).await
}

// ============================================================================
// Tests using wiremock
// ============================================================================
