//! The buffered channel underneath the event hook system.
//!
//! Each [`EventHandler`] owns one mpsc channel and one hook function. Producers push events into
//! the channel; the handler task spawns the hook for every event it receives, so a slow hook
//! never blocks the publisher side. Hooks are stateless: they see the event payload and nothing
//! else.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    inbox: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    hook: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, hook: Handler<E>) -> Self {
        let (sender, inbox) = mpsc::channel(buffer_size);
        Self { inbox, sender, hook }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Receives events until every producer has been dropped, then waits for the in-flight hook
    /// invocations to finish before returning.
    pub async fn start_handler(mut self) {
        debug!("📬️ Event handler listening");
        // Our own sender must go first, or the channel never closes.
        drop(self.sender);
        let mut in_flight = JoinSet::new();
        while let Some(ev) = self.inbox.recv().await {
            trace!("📬️ Dispatching event to hook");
            let hook = Arc::clone(&self.hook);
            in_flight.spawn(async move { (hook)(ev).await });
            // Reap finished invocations as we go so the set stays small.
            while let Some(done) = in_flight.try_join_next() {
                log_hook_result(done);
            }
        }
        debug!("📬️ Channel closed; draining {} in-flight hook(s)", in_flight.len());
        while let Some(done) = in_flight.join_next().await {
            log_hook_result(done);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_hook_result(result: Result<(), tokio::task::JoinError>) {
    match result {
        Ok(()) => trace!("📬️ Event handled"),
        Err(e) => warn!("📬️ An event hook panicked: {e}"),
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::AtomicU64;

    use super::*;

    #[tokio::test]
    async fn all_published_events_are_handled_before_shutdown() {
        let _ = env_logger::try_init();
        let count = Arc::new(AtomicU64::new(0));
        let c2 = count.clone();
        let hook = Arc::new(move |v| {
            let count = count.clone();
            Box::pin(async move {
                debug!("Hook received {v}");
                // Stay busy long enough that shutdown has something to drain
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                let _ = count.fetch_add(v, std::sync::atomic::Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let event_handler = EventHandler::new(1, hook);
        let producer_1 = event_handler.subscribe();
        let producer_2 = event_handler.subscribe();
        tokio::spawn(async move {
            for i in 0..5 {
                producer_1.publish_event(i * 2 + 1).await;
            }
        });
        tokio::spawn(async move {
            for i in 0..5 {
                producer_2.publish_event(i * 2).await;
            }
        });

        event_handler.start_handler().await;
        assert_eq!(c2.load(std::sync::atomic::Ordering::SeqCst), 45);
    }
}
