// Helpers for driving the keyed serializer into a known queue state.

use crate::shared::infrastructure::keyed_serializer::KeyedSerializer;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Polls `future` once so that it registers with the serializer, then hands it back.
pub async fn registered<F: Future>(future: F) -> Pin<Box<F>> {
    let mut future = Box::pin(future);
    std::future::poll_fn(|cx| {
        assert!(future.as_mut().poll(cx).is_pending(), "expected to be queued");
        Poll::Ready(())
    })
    .await;
    future
}

pub struct HeldKey {
    release: oneshot::Sender<()>,
    holder: JoinHandle<anyhow::Result<()>>,
}

impl HeldKey {
    pub async fn release(self) {
        let _ = self.release.send(());
        self.holder
            .await
            .expect("holder task panicked")
            .expect("holder operation failed");
    }
}

/// Occupies `key` with a running operation until `HeldKey::release` is called.
pub async fn hold_key(serializer: &Arc<KeyedSerializer<String>>, key: &str) -> HeldKey {
    let (release, released) = oneshot::channel::<()>();
    let (started, is_started) = oneshot::channel::<()>();
    let serializer = serializer.clone();
    let key = key.to_string();
    let holder = tokio::spawn(async move {
        serializer
            .run(key, || async move {
                let _ = started.send(());
                let _ = released.await;
                Ok(())
            })
            .await
    });
    is_started.await.expect("holder never started");
    HeldKey { release, holder }
}
