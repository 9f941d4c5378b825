//! SQS queue module
//!
//! [`SqsService`] addresses queues by name. Every operation resolves the name
//! to a queue URL first, then makes one call against that URL. Nothing is
//! cached between calls.
//!
//! # Example
//!
//! ```no_run
//! use aws_wrapper::sqs::{SqsQueue, SqsService};
//! use serde_json::json;
//!
//! # async fn example(client: aws_sdk_sqs::Client) -> Result<(), Box<dyn std::error::Error>> {
//! let sqs = SqsService::new(SqsQueue::new(client));
//!
//! sqs.push_message("jobs", &json!({ "task": "resize", "id": 42 })).await?;
//!
//! if let Some(message) = sqs.get_message("jobs").await? {
//!     println!("task = {}", message.parsed_body["task"]);
//!     sqs.delete_message("jobs", &message.receipt_handle).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod queue;

pub use queue::{MessageQueue, ReceivedMessage, SendReceipt, SqsQueue};

use crate::error::RemoteServiceError;
use crate::metrics;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;

/// Queue errors
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Missing argument: {0} is required")]
    MissingArgument(&'static str),

    #[error("Queue '{queue}' not found")]
    QueueNotFound {
        queue: String,
        #[source]
        source: RemoteServiceError,
    },

    #[error("Failed to encode message: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    Remote(#[from] RemoteServiceError),
}

/// A received message with its decoded body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueMessage {
    pub message_id: Option<String>,
    /// Token needed to delete this message
    pub receipt_handle: String,
    /// Raw message body
    pub body: String,
    pub md5_of_body: Option<String>,
    /// Body decoded as JSON, or an empty object when it is not valid JSON
    pub parsed_body: Value,
    /// URL the queue name resolved to
    pub queue_url: String,
}

impl QueueMessage {
    fn from_received(message: ReceivedMessage, queue_url: String) -> Self {
        let parsed_body = serde_json::from_str(&message.body)
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self {
            message_id: message.message_id,
            receipt_handle: message.receipt_handle,
            body: message.body,
            md5_of_body: message.md5_of_body,
            parsed_body,
            queue_url,
        }
    }
}

/// Queue facade over a [`MessageQueue`]
pub struct SqsService<Q = SqsQueue> {
    queue: Q,
}

impl<Q: MessageQueue> SqsService<Q> {
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    /// Get the underlying queue client
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Resolve a queue name; any lookup failure means the queue is unusable.
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, QueueError> {
        let queue_url = self
            .queue
            .get_queue_url(queue_name)
            .await
            .map_err(|source| QueueError::QueueNotFound {
                queue: queue_name.to_string(),
                source,
            })?;

        tracing::Span::current().record("sqs.queue_url", queue_url.as_str());
        Ok(queue_url)
    }

    /// Send `message` as a JSON body
    #[tracing::instrument(
        name = "sqs.push_message",
        skip(self, message),
        fields(
            sqs.queue = %queue_name,
            sqs.queue_url = tracing::field::Empty,
            sqs.message_id = tracing::field::Empty
        ),
        err
    )]
    pub async fn push_message<T>(
        &self,
        queue_name: &str,
        message: &T,
    ) -> Result<SendReceipt, QueueError>
    where
        T: Serialize + ?Sized,
    {
        if queue_name.trim().is_empty() {
            return Err(QueueError::MissingArgument("queue name"));
        }

        let body = serde_json::to_value(message)?;
        if body.is_null() {
            return Err(QueueError::MissingArgument("message object"));
        }

        let start_time = Instant::now();
        let result = self.send(queue_name, body.to_string()).await;
        metrics::record_operation(
            "sqs",
            "push_message",
            result.is_ok(),
            start_time.elapsed().as_secs_f64(),
        );

        let receipt = result?;
        if let Some(ref message_id) = receipt.message_id {
            tracing::Span::current().record("sqs.message_id", message_id.as_str());
        }
        tracing::debug!("Message sent");
        Ok(receipt)
    }

    async fn send(&self, queue_name: &str, body: String) -> Result<SendReceipt, QueueError> {
        let queue_url = self.resolve_queue_url(queue_name).await?;
        Ok(self.queue.send_message(&queue_url, body).await?)
    }

    /// Receive one message.
    ///
    /// Only the last message of the returned batch is handed back; the others
    /// stay on the queue and become visible again per the queue's settings.
    /// Returns `Ok(None)` when nothing is available.
    #[tracing::instrument(
        name = "sqs.get_message",
        skip(self),
        fields(
            sqs.queue = %queue_name,
            sqs.queue_url = tracing::field::Empty,
            sqs.batch_size = tracing::field::Empty
        ),
        err
    )]
    pub async fn get_message(&self, queue_name: &str) -> Result<Option<QueueMessage>, QueueError> {
        if queue_name.trim().is_empty() {
            return Err(QueueError::MissingArgument("queue name"));
        }

        let start_time = Instant::now();
        let result = self.receive_one(queue_name).await;
        metrics::record_operation(
            "sqs",
            "get_message",
            result.is_ok(),
            start_time.elapsed().as_secs_f64(),
        );

        result
    }

    async fn receive_one(&self, queue_name: &str) -> Result<Option<QueueMessage>, QueueError> {
        let queue_url = self.resolve_queue_url(queue_name).await?;
        let mut batch = self.queue.receive_messages(&queue_url).await?;
        tracing::Span::current().record("sqs.batch_size", batch.len());

        Ok(batch
            .pop()
            .map(|message| QueueMessage::from_received(message, queue_url)))
    }

    /// Delete a received message by its receipt handle
    #[tracing::instrument(
        name = "sqs.delete_message",
        skip(self, receipt_handle),
        fields(sqs.queue = %queue_name, sqs.queue_url = tracing::field::Empty),
        err
    )]
    pub async fn delete_message(
        &self,
        queue_name: &str,
        receipt_handle: &str,
    ) -> Result<(), QueueError> {
        if queue_name.trim().is_empty() {
            return Err(QueueError::MissingArgument("queue name"));
        }
        if receipt_handle.trim().is_empty() {
            return Err(QueueError::MissingArgument("receipt handle"));
        }

        let start_time = Instant::now();
        let result = async {
            let queue_url = self.resolve_queue_url(queue_name).await?;
            self.queue
                .delete_message(&queue_url, receipt_handle)
                .await
                .map_err(QueueError::from)
        }
        .await;
        metrics::record_operation(
            "sqs",
            "delete_message",
            result.is_ok(),
            start_time.elapsed().as_secs_f64(),
        );

        result
    }

    /// Remove every message from a queue
    #[tracing::instrument(
        name = "sqs.purge_queue",
        skip(self),
        fields(sqs.queue = %queue_name, sqs.queue_url = tracing::field::Empty),
        err
    )]
    pub async fn purge_queue(&self, queue_name: &str) -> Result<(), QueueError> {
        if queue_name.trim().is_empty() {
            return Err(QueueError::MissingArgument("queue name"));
        }

        let start_time = Instant::now();
        let result = async {
            let queue_url = self.resolve_queue_url(queue_name).await?;
            self.queue
                .purge_queue(&queue_url)
                .await
                .map_err(QueueError::from)
        }
        .await;
        metrics::record_operation(
            "sqs",
            "purge_queue",
            result.is_ok(),
            start_time.elapsed().as_secs_f64(),
        );

        if result.is_ok() {
            tracing::info!("Queue purged");
        }
        result
    }
}
