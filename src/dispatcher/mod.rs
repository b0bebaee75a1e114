//! Turns inbound text into tracking operations and replies.

pub mod command;

pub use command::Command;

use crate::clients::NotificationService;
use crate::lifecycle::{StartOutcome, SystemError, TrackingSystem};
use crate::messages;
use crate::model::UserId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Handles one message at a time from any number of users.
///
/// Replies go out through the same notifier the trackers use. A successful
/// start gets no reply; the tracker's first notification acknowledges it.
pub struct Dispatcher {
    system: TrackingSystem,
    notifier: Arc<dyn NotificationService>,
}

impl Dispatcher {
    pub fn new(system: TrackingSystem, notifier: Arc<dyn NotificationService>) -> Self {
        Self { system, notifier }
    }

    pub fn system(&self) -> &TrackingSystem {
        &self.system
    }

    /// Consumes the dispatcher, handing back the engine for shutdown.
    pub fn into_system(self) -> TrackingSystem {
        self.system
    }

    #[instrument(skip(self, text), fields(user = %user))]
    pub async fn handle(&self, user: UserId, text: &str) {
        let command = Command::parse(text);
        info!(?command, "Command received");

        let reply = match self.execute(user.clone(), command).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Command failed");
                Some(messages::SERVICE_UNAVAILABLE.to_string())
            }
        };

        if let Some(reply) = reply {
            if let Err(e) = self.notifier.send(&user, &reply).await {
                warn!(error = %e, "Reply failed");
            }
        }
    }

    async fn execute(&self, user: UserId, command: Command) -> Result<Option<String>, SystemError> {
        let reply = match command {
            Command::Help => messages::HELP.to_string(),
            Command::Unknown => messages::UNKNOWN_COMMAND.to_string(),
            Command::Start(order) => {
                match self.system.start_tracking(user, order.clone()).await? {
                    StartOutcome::Started => return Ok(None),
                    StartOutcome::AlreadyTracked => messages::already_tracking(&order),
                    StartOutcome::CoolingDown { remaining } => messages::cooldown(remaining),
                }
            }
            Command::Stop(order) => {
                if self.system.stop_tracking(user, order.clone()).await? {
                    messages::tracking_cancelled(&order)
                } else {
                    messages::not_tracked(&order)
                }
            }
            Command::StopAll => {
                if self.system.stop_all_tracking(user).await? {
                    messages::STOPPED_ALL.to_string()
                } else {
                    messages::NOTHING_TRACKED.to_string()
                }
            }
            Command::List => messages::tracked_list(&self.system.list_tracked(user).await?),
            Command::StatusAll => {
                messages::status_report(&self.system.query_status(user, None).await?)
            }
            Command::Status(order) => {
                messages::status_report(&self.system.query_status(user, Some(order)).await?)
            }
        };
        Ok(Some(reply))
    }
}
