//! Subscribes to a few live update streams and prints what arrives.
//!
//! Reads `AERODATA_API_KEY` (and optionally `AERODATA_BASE_URL`) from the
//! environment or a `.env` file:
//!
//! ```sh
//! AERODATA_API_KEY=... cargo run --example realtime_monitor
//! ```

use aerodata::{AerodataClient, ClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    aerodata::utils::logging::init("info");

    let config = ClientConfig::from_env()?;
    let client = AerodataClient::with_config(config)?;

    let realtime = client.realtime();
    realtime
        .subscribe_airport("SFO", |update| println!("SFO: {update}"), None)
        .await?;
    realtime
        .subscribe_flight("UA123", |update| println!("UA123: {update}"))
        .await?;
    realtime
        .subscribe_route("SFO", "LAX", |update| println!("SFO-LAX: {update}"))
        .await?;

    println!("Listening for updates; press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;

    client.close().await;
    Ok(())
}
