//! Outbound delivery interface.
//!
//! Each connection owns an unbounded channel drained by its socket writer,
//! so pushing never waits on the network.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// Sending half of a connection's outbound queue (serialized frames).
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Attach the outbound queue of a new connection.
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Detach a connection. Unknown ids are ignored.
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Push one frame to every target. A failure for one target never stops
    /// delivery to the rest. Targets that are no longer registered are
    /// skipped; closed queues are reported as [`MessagePushError::PartialDelivery`].
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
