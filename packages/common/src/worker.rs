use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::mq::{Message, MessageError};

/// Envelope placed on the job queue. The worker dispatches on `task_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub task_type: String,
    pub payload: serde_json::Value,
}

impl Task {
    /// Wrap a typed message, using its message type as the task type.
    pub fn from_message<M: Message>(message: &M) -> Result<Self, MessageError> {
        debug!(
            message_type = M::message_type(),
            message_id = %message.message_id(),
            "Wrapping message into task"
        );

        Ok(Self {
            id: message.message_id().to_string(),
            task_type: M::message_type().to_string(),
            payload: serde_json::to_value(message)?,
        })
    }

    /// Decode the payload into a typed message.
    pub fn decode<M: Message>(&self) -> Result<M, MessageError> {
        if self.task_type != M::message_type() {
            return Err(MessageError::TypeMismatch {
                expected: M::message_type().to_string(),
                actual: self.task_type.clone(),
            });
        }

        serde_json::from_value(self.payload.clone()).map_err(|e| {
            error!(error = %e, task_id = %self.id, "Task payload deserialization failed");
            MessageError::Serialization(e)
        })
    }

    /// Best-effort extraction of the review id from a payload that failed to decode.
    pub fn review_id_hint(&self) -> Option<i32> {
        self.payload
            .get("review_id")
            .and_then(|v| v.as_i64())
            .and_then(|v| i32::try_from(v).ok())
    }
}
