//! # Order Tracker
//!
//! Console front end for the tracking engine.
//!
//! Reads `<user> <message>` lines from stdin and feeds them to the
//! [`Dispatcher`]. The config path is the first argument; without one the
//! built-in defaults are used.
//!
//! Notifications go to WhatsApp when a `[whatsapp]` section is configured and
//! to the log otherwise.

use order_tracker::clients::{EsbasClient, LogNotifier, NotificationService, WhatsAppClient};
use order_tracker::config::Config;
use order_tracker::dispatcher::Dispatcher;
use order_tracker::lifecycle::{setup_tracing, TrackingSystem};
use order_tracker::model::UserId;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).map_err(|e| e.to_string())?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };
    if config.order_source.username.is_empty() {
        warn!("order_source.username is empty; gateway logins will likely fail");
    }

    let source = Arc::new(EsbasClient::new(&config.order_source).map_err(|e| e.to_string())?);
    let notifier: Arc<dyn NotificationService> = match &config.whatsapp {
        Some(whatsapp) => Arc::new(WhatsAppClient::new(whatsapp).map_err(|e| e.to_string())?),
        None => {
            info!("No [whatsapp] section, notifications go to the log");
            Arc::new(LogNotifier)
        }
    };

    let system = TrackingSystem::new(&config.tracking, source, notifier.clone());
    let dispatcher = Arc::new(Dispatcher::new(system, notifier));
    info!("Ready. Enter '<user> <message>' lines.");

    // Each line is handled in its own task so a slow status query does not
    // hold up other users.
    let mut handlers = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let Some((user, text)) = line.trim().split_once(char::is_whitespace) else {
                        if !line.trim().is_empty() {
                            warn!(%line, "Expected '<user> <message>'");
                        }
                        continue;
                    };
                    let dispatcher = dispatcher.clone();
                    let user = UserId::from(user);
                    let text = text.trim().to_string();
                    handlers.spawn(async move { dispatcher.handle(user, &text).await });
                }
                Ok(None) => {
                    info!("Input closed");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to read input");
                    break;
                }
            },
            Some(finished) = handlers.join_next(), if !handlers.is_empty() => {
                if let Err(e) = finished {
                    error!(error = %e, "Command handler failed");
                }
            }
        }
    }

    while let Some(finished) = handlers.join_next().await {
        if let Err(e) = finished {
            error!(error = %e, "Command handler failed");
        }
    }

    let dispatcher = Arc::into_inner(dispatcher)
        .ok_or_else(|| "Dispatcher still shared at shutdown".to_string())?;
    dispatcher
        .into_system()
        .shutdown()
        .await
        .map_err(|e| e.to_string())
}
