#[macro_use]
extern crate log;

use std::sync::Arc;

use anyhow::Context as AnyhowContext;

use health_events_notifier::config::Config;
use health_events_notifier::receiver::{self, Handler};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    pretty_env_logger::init();

    let config = Config::load().with_context(|| "Failed to load notifier config")?;
    let handler = Arc::new(Handler::new());

    let addr = config.socket_addr();
    info!("Listening for health events on {}", addr);

    warp::serve(receiver::routes(&config, handler))
        .run(addr)
        .await;

    Ok(())
}
