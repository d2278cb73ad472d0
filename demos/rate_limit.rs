//! Example: Client-side rate limiting.
//!
//! Run with: cargo run --example rate_limit

use std::time::Duration;

use tokio::time::Instant;
use topstats::rate_limit::{
    Cooldowns, RateLimitConfig, RateLimiters, SlidingWindow, WindowLimit, endpoint_key,
};
use topstats::TopStatsClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Endpoint keys drop numeric IDs, so every bot shares one budget.
    println!("Key: {}", endpoint_key("/bots/432610292342587392/historical"));

    // A window allowing two calls per second; the third waits.
    let window = std::sync::Arc::new(SlidingWindow::new(2, Duration::from_secs(1)));
    let limiters = RateLimiters::new(vec![window.clone()]);
    let start = Instant::now();
    for call in 1..=3 {
        limiters.acquire().await;
        limiters.release().await;
        println!("Call #{call} after {:?}", start.elapsed());
    }
    println!("Calls in window: {}", window.len().await);

    // Cooldowns reject calls locally until their deadline passes.
    let mut cooldowns: Cooldowns<String> = Cooldowns::new();
    cooldowns.set("/rankings/bots".to_string(), Instant::now() + Duration::from_secs(30));
    println!(
        "Rankings cooldown: {:?}",
        cooldowns.remaining(&"/rankings/bots".to_string())
    );

    // A client with a tighter budget for the historical endpoint.
    let config = RateLimitConfig::default()
        .with_override("/bots/historical", WindowLimit::new(10, Duration::from_secs(60)));
    let client = TopStatsClient::builder()
        .token("demo-token")
        .rate_limit(config)
        .build()?;
    println!(
        "Historical budget: {:?}",
        client.rate_limits().config().limit_for("/bots/historical")
    );

    Ok(())
}
