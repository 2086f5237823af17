use async_trait::async_trait;
use std::sync::{Arc, Mutex, Weak};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The destination no longer exists (bubble removed, transcript cleared, reader gone).
    #[error("sink detached")]
    Detached,
}

/// Destination of rendered markup. Chunks arrive strictly in reveal order.
#[async_trait]
pub trait TextSink: Send {
    async fn append(&mut self, markup: &str) -> Result<(), SinkError>;
}

/// Shared, growable markup buffer backing one chat bubble.
///
/// The owner keeps the `MarkupBuffer`; renderers write through a
/// [`BufferSink`] that only holds a weak reference, so dropping the buffer
/// detaches every sink pointing at it.
#[derive(Debug, Clone, Default)]
pub struct MarkupBuffer {
    inner: Arc<Mutex<String>>,
}

impl MarkupBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> BufferSink {
        BufferSink {
            target: Arc::downgrade(&self.inner),
        }
    }

    pub fn snapshot(&self) -> String {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

/// Weak writer into a [`MarkupBuffer`].
#[derive(Debug, Clone)]
pub struct BufferSink {
    target: Weak<Mutex<String>>,
}

impl BufferSink {
    pub fn is_attached(&self) -> bool {
        self.target.strong_count() > 0
    }
}

#[async_trait]
impl TextSink for BufferSink {
    async fn append(&mut self, markup: &str) -> Result<(), SinkError> {
        let target = self.target.upgrade().ok_or(SinkError::Detached)?;
        let mut guard = target.lock().map_err(|_| SinkError::Detached)?;
        guard.push_str(markup);
        Ok(())
    }
}

#[async_trait]
impl TextSink for String {
    async fn append(&mut self, markup: &str) -> Result<(), SinkError> {
        self.push_str(markup);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffer_sink_appends_in_order() {
        let buffer = MarkupBuffer::new();
        let mut sink = buffer.sink();
        sink.append("<strong>").await.unwrap();
        sink.append("a").await.unwrap();
        assert_eq!(buffer.snapshot(), "<strong>a");
        assert!(sink.is_attached());
    }

    #[tokio::test]
    async fn dropping_the_buffer_detaches_sinks() {
        let buffer = MarkupBuffer::new();
        let mut sink = buffer.sink();
        drop(buffer);
        assert!(!sink.is_attached());
        assert_eq!(sink.append("x").await, Err(SinkError::Detached));
    }
}
