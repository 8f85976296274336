//! JSON request executor for the app backend.
//!
//! A [`Client`] resolves an [`Endpoint`] against its base URL, attaches
//! `Content-Type: application/json` and an optional bearer token, sends the
//! request, and either decodes the 2xx body or fails with one [`Error`].
//!
//! ```no_run
//! use api_client::{Client, ClientConfig, Endpoint};
//! use serde::Deserialize;
//!
//! enum Api {
//!     User(u64),
//! }
//!
//! impl Endpoint for Api {
//!     fn path(&self) -> String {
//!         match self {
//!             Api::User(id) => format!("/users/{id}"),
//!         }
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn run() -> api_client::Result<()> {
//! let config = ClientConfig::new("https://api.example.com").with_token("abc");
//! let client = Client::from_config(&config)?;
//! let user: User = client.get(&Api::User(42)).await?;
//! println!("{} {}", user.id, user.name);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod model;
mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use error::{BoxError, Error, Result};
