//! Deferred dispatcher
//!
//! A FIFO queue bound to the session's thread. The sending half can be
//! handed to any thread; messages are only ever handled on the thread that
//! owns the session.

use std::cell::{Cell, RefCell};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::snapshot::{TabId, TabSnapshot};
use crate::store::StoreError;

/// Identifies one in-flight persistence request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Debug)]
pub(crate) enum Message {
    /// Bring a tab to focus, creating its engine if needed
    HoistTab(TabId),
    SaveComplete {
        token: RequestToken,
        result: Result<(), StoreError>,
    },
    QueryComplete {
        token: RequestToken,
        result: Result<Vec<TabSnapshot>, StoreError>,
    },
}

pub(crate) struct Notifier {
    sender: UnboundedSender<Message>,
    receiver: RefCell<Option<UnboundedReceiver<Message>>>,
    next_token: Cell<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender,
            receiver: RefCell::new(Some(receiver)),
            next_token: Cell::new(0),
        }
    }

    pub fn sender(&self) -> UnboundedSender<Message> {
        self.sender.clone()
    }

    pub fn post(&self, message: Message) {
        // The receiver lives as long as `self`
        if self.sender.send(message).is_err() {
            tracing::warn!("Notifier queue closed, dropping message");
        }
    }

    pub fn next_token(&self) -> RequestToken {
        let token = self.next_token.get() + 1;
        self.next_token.set(token);
        RequestToken(token)
    }

    /// Pop the next queued message without waiting.
    ///
    /// Returns `None` while [`Notifier::take_receiver`] has the queue checked out.
    pub fn try_next(&self) -> Option<Message> {
        self.receiver.borrow_mut().as_mut()?.try_recv().ok()
    }

    /// Check the queue out for an async driver. It goes back when the guard drops.
    pub fn take_receiver(&self) -> Option<ReceiverGuard<'_>> {
        let receiver = self.receiver.borrow_mut().take()?;
        Some(ReceiverGuard {
            notifier: self,
            receiver: Some(receiver),
        })
    }
}

pub(crate) struct ReceiverGuard<'a> {
    notifier: &'a Notifier,
    receiver: Option<UnboundedReceiver<Message>>,
}

impl ReceiverGuard<'_> {
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.as_mut()?.recv().await
    }
}

impl Drop for ReceiverGuard<'_> {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            *self.notifier.receiver.borrow_mut() = Some(receiver);
        }
    }
}
