//! Observer channel to the presentation layer
//!
//! The game never draws anything itself. Whatever renders it implements
//! [`Tunnel`] and receives a message for every visible change, plus a full
//! snapshot whenever it asks for one through [`crate::app::App::sync`].

use crate::app::{SyncMessage, UpdateMessage};

/// Trait for sending messages to whatever displays the game
pub trait Tunnel {
    /// Sends an incremental update
    ///
    /// # Arguments
    ///
    /// * `message` - The change to apply to the current view
    fn send_message(&self, message: &UpdateMessage);

    /// Sends the complete state of the current screen
    ///
    /// # Arguments
    ///
    /// * `state` - Everything needed to draw the current screen from scratch
    fn send_state(&self, state: &SyncMessage);
}

impl<T: Tunnel + ?Sized> Tunnel for &T {
    fn send_message(&self, message: &UpdateMessage) {
        (**self).send_message(message);
    }

    fn send_state(&self, state: &SyncMessage) {
        (**self).send_state(state);
    }
}
