/*
[INPUT]:  FUGLE_API_KEY (or another FUGLE_* credential) from the environment
[OUTPUT]: Real-time trades for one symbol printed to stdout
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use fugle_marketdata::*;
use tokio::time::{Duration, sleep};

/// Example: stream trades for 2330 for thirty seconds
#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Fugle WebSocket Example ===\n");

    let options = ClientOptions::from_env().health_check(HealthCheckConfig {
        enabled: true,
        ..HealthCheckConfig::default()
    });
    let factory = WebSocketClientFactory::new(options)?;
    let stock = factory.stock();
    println!("✓ WebSocket client created for {}", stock.url());

    stock.on(EventKind::Message, |event| {
        if let Event::Message(raw) = event {
            println!("{raw}");
        }
    });
    stock.on(EventKind::Disconnect, |event| println!("✗ {event:?}"));

    stock.connect().await?;
    println!("✓ Authenticated\n");

    stock.subscribe(serde_json::json!({ "channel": "trades", "symbol": "2330" }))?;
    sleep(Duration::from_secs(30)).await;

    stock.disconnect();
    println!("\n✓ WebSocket example complete");
    Ok(())
}
