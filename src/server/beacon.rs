//! Registration with a search-engine directory
//!
//! On start the server announces its public address to a directory with a
//! single `PUT`. The outcome is only logged; it never stops the server.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct Registration<'a> {
    request_url: &'a str,
}

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconStatus {
    /// 201: the directory added this server
    Registered,
    /// 200: the directory already knew this server
    AlreadyRegistered,
    /// Any other status
    Unexpected(u16),
    /// The request did not complete
    Failed(String),
}

/// Sends one registration request
pub async fn register(client: &Client, directory_url: &str, public_address: &str) -> BeaconStatus {
    let result = client
        .put(directory_url)
        .json(&Registration {
            request_url: public_address,
        })
        .send()
        .await;

    match result {
        Ok(response) => match response.status() {
            StatusCode::CREATED => BeaconStatus::Registered,
            StatusCode::OK => BeaconStatus::AlreadyRegistered,
            other => BeaconStatus::Unexpected(other.as_u16()),
        },
        Err(e) => BeaconStatus::Failed(e.to_string()),
    }
}

/// Registers and logs the outcome
pub async fn announce(directory_url: &str, public_address: &str) -> BeaconStatus {
    let client = match Client::builder().timeout(Duration::from_secs(10)).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Could not build registration client: {}", e);
            return BeaconStatus::Failed(e.to_string());
        }
    };

    let status = register(&client, directory_url, public_address).await;
    match &status {
        BeaconStatus::Registered => {
            tracing::info!("Registered {} with {}", public_address, directory_url)
        }
        BeaconStatus::AlreadyRegistered => {
            tracing::info!("{} already registered with {}", public_address, directory_url)
        }
        BeaconStatus::Unexpected(code) => {
            tracing::warn!("Directory {} answered registration with {}", directory_url, code)
        }
        BeaconStatus::Failed(error) => {
            tracing::warn!("Registration with {} failed: {}", directory_url, error)
        }
    }
    status
}
