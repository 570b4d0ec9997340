use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, PairConfirmedEvent, RequestFailedEvent, RequestMatchedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub request_matched_producer: Vec<EventProducer<RequestMatchedEvent>>,
    pub pair_confirmed_producer: Vec<EventProducer<PairConfirmedEvent>>,
    pub request_failed_producer: Vec<EventProducer<RequestFailedEvent>>,
}

pub struct EventHandlers {
    pub on_request_matched: Option<EventHandler<RequestMatchedEvent>>,
    pub on_pair_confirmed: Option<EventHandler<PairConfirmedEvent>>,
    pub on_request_failed: Option<EventHandler<RequestFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_request_matched = hooks.on_request_matched.map(|f| EventHandler::new(buffer_size, f));
        let on_pair_confirmed = hooks.on_pair_confirmed.map(|f| EventHandler::new(buffer_size, f));
        let on_request_failed = hooks.on_request_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_request_matched, on_pair_confirmed, on_request_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_request_matched {
            result.request_matched_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_pair_confirmed {
            result.pair_confirmed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_request_failed {
            result.request_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_request_matched {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_pair_confirmed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_request_failed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_request_matched: Option<Handler<RequestMatchedEvent>>,
    pub on_pair_confirmed: Option<Handler<PairConfirmedEvent>>,
    pub on_request_failed: Option<Handler<RequestFailedEvent>>,
}

impl EventHooks {
    pub fn on_request_matched<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(RequestMatchedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_request_matched = Some(Arc::new(f));
        self
    }

    pub fn on_pair_confirmed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PairConfirmedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_pair_confirmed = Some(Arc::new(f));
        self
    }

    pub fn on_request_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(RequestFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_request_failed = Some(Arc::new(f));
        self
    }
}
