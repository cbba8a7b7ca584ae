// Communication channels between the bot loop and its controller
use super::types::{AutomationCommand, AutomationEvent};
use tokio::sync::mpsc;

/// Events are sent with `try_send`; a full queue drops the event.
const EVENT_QUEUE: usize = 64;
const COMMAND_QUEUE: usize = 8;

/// Helper function to create automation channels
pub fn create_automation_channels() -> (
    mpsc::Sender<AutomationCommand>,
    mpsc::Receiver<AutomationCommand>,
    mpsc::Sender<AutomationEvent>,
    mpsc::Receiver<AutomationEvent>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
    (cmd_tx, cmd_rx, event_tx, event_rx)
}
