use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use crate::core::error::Result;

/// One complete, authoritative view of a subscribed collection.
///
/// Consumers replace their local copy with `items`; they never merge.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    /// Whether the platform considers this view caught up with the server
    pub is_synced: bool,
}

/// Live, cancellable sequence of collection snapshots.
///
/// Closing the subscription (explicitly with [`Subscription::close`] or by
/// dropping it) tells the producer to stop and release its server-side
/// resources. After that the stream ends.
pub struct Subscription<T> {
    stream: BoxStream<'static, Result<Snapshot<T>>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl<T: Send + 'static> Subscription<T> {
    pub fn new(
        stream: BoxStream<'static, Result<Snapshot<T>>>,
        cancel: oneshot::Sender<()>,
    ) -> Self {
        Self {
            stream,
            cancel: Some(cancel),
        }
    }

    /// Wrap the receiving half of a producer channel
    pub fn from_receiver(
        rx: mpsc::Receiver<Result<Snapshot<T>>>,
        cancel: oneshot::Sender<()>,
    ) -> Self {
        Self::new(ReceiverStream::new(rx).boxed(), cancel)
    }

    /// Convert every item of every snapshot, keeping the same cancellation handle.
    ///
    /// Items for which `f` returns `None` are left out of the snapshot; the
    /// remaining items are still delivered.
    pub fn filter_map_items<U, F>(mut self, f: F) -> Subscription<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + 'static,
    {
        let cancel = self.cancel.take();
        let inner = std::mem::replace(&mut self.stream, stream::empty().boxed());

        let stream = inner
            .map(move |snapshot| {
                let snapshot = snapshot?;
                let items = snapshot.items.into_iter().filter_map(&f).collect();
                Ok(Snapshot {
                    items,
                    is_synced: snapshot.is_synced,
                })
            })
            .boxed();

        Subscription { stream, cancel }
    }
}

impl<T> Subscription<T> {
    /// Stop the subscription and release the producer
    pub fn close(mut self) {
        self.cancel_producer();
    }

    fn cancel_producer(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel_producer();
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<Snapshot<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().stream.poll_next_unpin(cx)
    }
}
