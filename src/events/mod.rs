use crate::entities::form::{FormStatus, FormType};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Queues an event without waiting for capacity.
    ///
    /// The form change has already been committed when events go out, so a
    /// full or closed channel drops the event with a warning.
    pub fn send_or_log(&self, event: Event) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(?event, "Event channel full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(?event, "Event channel closed, dropping event");
            }
        }
    }
}

/// Things that happened to a form after its transaction committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    FormCreated {
        form_id: i32,
        form_number: String,
        form_type: FormType,
    },
    FormStatusChanged {
        form_id: i32,
        old_status: FormStatus,
        new_status: FormStatus,
    },
    FormAssigned {
        form_id: i32,
        assigned_to_id: i32,
    },
}

/// Channel pair with the capacity used by the server.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::FormCreated {
                form_id,
                form_number,
                form_type,
            } => {
                info!(form_id, %form_number, %form_type, "form created");
            }
            Event::FormStatusChanged {
                form_id,
                old_status,
                new_status,
            } => {
                info!(form_id, %old_status, %new_status, "form status changed");
            }
            Event::FormAssigned {
                form_id,
                assigned_to_id,
            } => {
                info!(form_id, assigned_to_id, "form assigned");
            }
        }
    }

    info!("Event processing loop stopped");
}
