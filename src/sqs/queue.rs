//! Message queue seam
//!
//! [`MessageQueue`] lists the remote calls the queue facade needs;
//! [`SqsQueue`] implements it with `aws_sdk_sqs::Client`.

use crate::error::RemoteServiceError;
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use serde::Serialize;

/// Acknowledgment returned by SendMessage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub message_id: Option<String>,
    pub md5_of_message_body: Option<String>,
}

/// A message as returned by ReceiveMessage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: Option<String>,
    pub receipt_handle: String,
    pub body: String,
    pub md5_of_body: Option<String>,
}

/// Remote queue operations used by [`super::SqsService`]
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Resolve a queue name to its URL
    async fn get_queue_url(&self, queue_name: &str) -> Result<String, RemoteServiceError>;

    /// Send one message body
    async fn send_message(
        &self,
        queue_url: &str,
        body: String,
    ) -> Result<SendReceipt, RemoteServiceError>;

    /// Receive a batch using the provider defaults
    async fn receive_messages(
        &self,
        queue_url: &str,
    ) -> Result<Vec<ReceivedMessage>, RemoteServiceError>;

    /// Delete a received message
    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), RemoteServiceError>;

    /// Remove every message from a queue
    async fn purge_queue(&self, queue_url: &str) -> Result<(), RemoteServiceError>;
}

/// [`MessageQueue`] backed by the AWS SQS SDK
#[derive(Debug, Clone)]
pub struct SqsQueue {
    client: Client,
}

impl SqsQueue {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Underlying SDK client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn get_queue_url(&self, queue_name: &str) -> Result<String, RemoteServiceError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("GetQueueUrl", e))?;

        output.queue_url().map(str::to_owned).ok_or_else(|| {
            RemoteServiceError::new("GetQueueUrl", None, "response did not include a queue URL")
        })
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: String,
    ) -> Result<SendReceipt, RemoteServiceError> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("SendMessage", e))?;

        Ok(SendReceipt {
            message_id: output.message_id().map(str::to_owned),
            md5_of_message_body: output.md5_of_message_body().map(str::to_owned),
        })
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
    ) -> Result<Vec<ReceivedMessage>, RemoteServiceError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("ReceiveMessage", e))?;

        // A message without a receipt handle can never be deleted
        Ok(output
            .messages()
            .iter()
            .filter_map(|message| {
                let Some(receipt_handle) = message.receipt_handle() else {
                    tracing::warn!(
                        message_id = ?message.message_id(),
                        "Skipping received message without a receipt handle"
                    );
                    return None;
                };

                Some(ReceivedMessage {
                    message_id: message.message_id().map(str::to_owned),
                    receipt_handle: receipt_handle.to_string(),
                    body: message.body().unwrap_or_default().to_string(),
                    md5_of_body: message.md5_of_body().map(str::to_owned),
                })
            })
            .collect())
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), RemoteServiceError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("DeleteMessage", e))?;
        Ok(())
    }

    async fn purge_queue(&self, queue_url: &str) -> Result<(), RemoteServiceError> {
        self.client
            .purge_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| RemoteServiceError::from_sdk("PurgeQueue", e))?;
        Ok(())
    }
}
