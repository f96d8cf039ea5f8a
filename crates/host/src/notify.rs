//! Channel-backed `RefreshNotifier`.

use std::sync::mpsc::Sender;

use crate::RefreshNotifier;

/// Forwards notifications over a channel. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: Sender<()>,
}

impl ChannelNotifier {
    pub fn new(sender: Sender<()>) -> Self {
        Self { sender }
    }
}

impl RefreshNotifier for ChannelNotifier {
    fn workspace_changed(&self) {
        let _ = self.sender.send(());
    }
}
