//! Common Test Infrastructure
//!
//! In-memory fakes for the two client seams:
//! - `FakeObjectStore` records every S3 call and keeps objects in a map
//! - `FakeMessageQueue` keeps named queues as message lists

#![allow(dead_code)]

use async_trait::async_trait;
use aws_wrapper::s3::{ObjectStore, PutObjectRequest};
use aws_wrapper::sqs::{MessageQueue, ReceivedMessage, SendReceipt};
use aws_wrapper::RemoteServiceError;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

/// Object stored by `FakeObjectStore`
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub acl: String,
}

/// In-memory `ObjectStore`
#[derive(Default)]
pub struct FakeObjectStore {
    buckets: Mutex<Vec<String>>,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    calls: Mutex<Vec<String>>,
    create_bucket_error: Mutex<Option<(Option<String>, String)>>,
    list_buckets_error: Mutex<Option<String>>,
}

impl FakeObjectStore {
    pub fn with_buckets(buckets: &[&str]) -> Self {
        let store = Self::default();
        *store.buckets.lock().unwrap() = buckets.iter().map(|b| b.to_string()).collect();
        store
    }

    /// Make the next CreateBucket calls fail with the given code
    pub fn fail_create_bucket(&self, code: Option<&str>, message: &str) {
        *self.create_bucket_error.lock().unwrap() =
            Some((code.map(str::to_owned), message.to_string()));
    }

    /// Make ListBuckets fail
    pub fn fail_list_buckets(&self, message: &str) {
        *self.list_buckets_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn insert_object(&self, bucket: &str, key: &str, body: &str) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: Bytes::copy_from_slice(body.as_bytes()),
                content_type: None,
                acl: "private".into(),
            },
        );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn buckets(&self) -> Vec<String> {
        self.buckets.lock().unwrap().clone()
    }

    /// Remote calls made so far, e.g. `["ListBuckets", "PutObject photos/cat.png"]`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn list_bucket_names(&self) -> Result<Vec<String>, RemoteServiceError> {
        self.record("ListBuckets".into());
        if let Some(message) = self.list_buckets_error.lock().unwrap().clone() {
            return Err(RemoteServiceError::new("ListBuckets", Some("AccessDenied"), message));
        }
        Ok(self.buckets())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), RemoteServiceError> {
        self.record(format!("CreateBucket {}", bucket));
        if let Some((code, message)) = self.create_bucket_error.lock().unwrap().clone() {
            return Err(RemoteServiceError::new("CreateBucket", code.as_deref(), message));
        }
        self.buckets.lock().unwrap().push(bucket.to_string());
        Ok(())
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<(), RemoteServiceError> {
        self.record(format!("PutObject {}/{}", request.bucket, request.key));
        let body = request
            .body
            .collect()
            .await
            .map_err(|e| RemoteServiceError::from_error("PutObject", e))?
            .into_bytes();

        self.objects.lock().unwrap().insert(
            (request.bucket, request.key),
            StoredObject {
                body,
                content_type: request.content_type,
                acl: request.acl,
            },
        );
        Ok(())
    }

    async fn get_object_text(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<String, RemoteServiceError> {
        self.record(format!("GetObject {}/{}", bucket, key));
        self.object(bucket, key)
            .map(|object| String::from_utf8_lossy(&object.body).into_owned())
            .ok_or_else(|| {
                RemoteServiceError::new(
                    "GetObject",
                    Some("NoSuchKey"),
                    "The specified key does not exist.",
                )
            })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), RemoteServiceError> {
        self.record(format!("DeleteObject {}/{}", bucket, key));
        if !self.buckets().iter().any(|b| b == bucket) {
            return Err(RemoteServiceError::new(
                "DeleteObject",
                Some("NoSuchBucket"),
                "The specified bucket does not exist",
            ));
        }
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

pub const QUEUE_URL_PREFIX: &str = "https://sqs.us-east-1.amazonaws.com/123456789012/";

/// In-memory `MessageQueue`. Received messages stay queued until deleted.
#[derive(Default)]
pub struct FakeMessageQueue {
    queues: Mutex<HashMap<String, Vec<ReceivedMessage>>>,
    calls: Mutex<Vec<String>>,
    next_id: Mutex<u64>,
}

impl FakeMessageQueue {
    pub fn with_queues(names: &[&str]) -> Self {
        let fake = Self::default();
        {
            let mut queues = fake.queues.lock().unwrap();
            for name in names {
                queues.insert(format!("{}{}", QUEUE_URL_PREFIX, name), Vec::new());
            }
        }
        fake
    }

    /// Put a raw body on a queue, bypassing the facade
    pub fn enqueue_raw(&self, queue_name: &str, body: &str) -> String {
        let handle = self.next_handle();
        self.queues
            .lock()
            .unwrap()
            .get_mut(&format!("{}{}", QUEUE_URL_PREFIX, queue_name))
            .expect("queue exists")
            .push(ReceivedMessage {
                message_id: Some(format!("msg-{}", handle)),
                receipt_handle: handle.clone(),
                body: body.to_string(),
                md5_of_body: None,
            });
        handle
    }

    pub fn len(&self, queue_name: &str) -> usize {
        self.queues
            .lock()
            .unwrap()
            .get(&format!("{}{}", QUEUE_URL_PREFIX, queue_name))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .count()
    }

    fn next_handle(&self) -> String {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        format!("handle-{}", next_id)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn missing_queue(operation: &'static str) -> RemoteServiceError {
        RemoteServiceError::new(
            operation,
            Some("AWS.SimpleQueueService.NonExistentQueue"),
            "The specified queue does not exist for this wsdl version.",
        )
    }
}

#[async_trait]
impl MessageQueue for FakeMessageQueue {
    async fn get_queue_url(&self, queue_name: &str) -> Result<String, RemoteServiceError> {
        self.record(format!("GetQueueUrl {}", queue_name));
        let url = format!("{}{}", QUEUE_URL_PREFIX, queue_name);
        if self.queues.lock().unwrap().contains_key(&url) {
            Ok(url)
        } else {
            Err(Self::missing_queue("GetQueueUrl"))
        }
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: String,
    ) -> Result<SendReceipt, RemoteServiceError> {
        self.record(format!("SendMessage {}", queue_url));
        let handle = self.next_handle();
        let message_id = format!("msg-{}", handle);
        let mut queues = self.queues.lock().unwrap();
        let queue = queues
            .get_mut(queue_url)
            .ok_or_else(|| Self::missing_queue("SendMessage"))?;

        queue.push(ReceivedMessage {
            message_id: Some(message_id.clone()),
            receipt_handle: handle,
            body,
            md5_of_body: None,
        });

        Ok(SendReceipt {
            message_id: Some(message_id),
            md5_of_message_body: Some("d41d8cd98f00b204e9800998ecf8427e".into()),
        })
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
    ) -> Result<Vec<ReceivedMessage>, RemoteServiceError> {
        self.record(format!("ReceiveMessage {}", queue_url));
        self.queues
            .lock()
            .unwrap()
            .get(queue_url)
            .cloned()
            .ok_or_else(|| Self::missing_queue("ReceiveMessage"))
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), RemoteServiceError> {
        self.record(format!("DeleteMessage {}", queue_url));
        let mut queues = self.queues.lock().unwrap();
        let queue = queues
            .get_mut(queue_url)
            .ok_or_else(|| Self::missing_queue("DeleteMessage"))?;

        let before = queue.len();
        queue.retain(|message| message.receipt_handle != receipt_handle);
        if queue.len() == before {
            return Err(RemoteServiceError::new(
                "DeleteMessage",
                Some("ReceiptHandleIsInvalid"),
                "The input receipt handle is invalid.",
            ));
        }
        Ok(())
    }

    async fn purge_queue(&self, queue_url: &str) -> Result<(), RemoteServiceError> {
        self.record(format!("PurgeQueue {}", queue_url));
        self.queues
            .lock()
            .unwrap()
            .get_mut(queue_url)
            .ok_or_else(|| Self::missing_queue("PurgeQueue"))?
            .clear();
        Ok(())
    }
}
