/*
[INPUT]:  FUGLE_API_KEY (or another FUGLE_* credential) from the environment
[OUTPUT]: Intraday quote and historical candles for 2330
[POS]:    Examples - REST market data queries
[UPDATE]: When adding new market data endpoints
*/

use fugle_marketdata::*;

#[tokio::main]
async fn main() {
    println!("=== Fugle Market Data Example ===\n");

    let factory = match RestClientFactory::new(ClientOptions::from_env()) {
        Ok(factory) => factory,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    let stock = match factory.stock() {
        Ok(stock) => stock,
        Err(e) => {
            eprintln!("Failed to create stock client: {}", e);
            return;
        }
    };

    let symbol = "2330";

    println!("Querying intraday quote for {}...", symbol);
    match stock.intraday().quote(symbol, &[]).await {
        Ok(quote) => println!("✓ Quote: {}", quote),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying historical candles for {}...", symbol);
    match stock
        .historical()
        .candles(symbol, &[("from", "2023-02-06"), ("to", "2023-02-08")])
        .await
    {
        Ok(candles) => println!("✓ Candles: {}", candles),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
