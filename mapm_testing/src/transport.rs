//! A scripted in-memory [`Transport`].

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        MutexGuard,
        PoisonError,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use mapm::{
    MapEvent,
    message::{
        Body,
        MAP_MESSAGE_GROUP,
        Message,
        connection::ClientRegistration,
        function,
        response::StatusResponse,
    },
    transport::{InboundSink, Transport, TransportError},
};
use tokio::sync::watch;

/// Bus address the mock reports for the server process.
pub const SERVER_ADDRESS_ID: u32 = 0x0000_0100;

/// Produces the response to one request.
pub type Responder = Box<dyn FnOnce(&Message) -> Result<Message, TransportError> + Send>;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for the platform bus.
///
/// Requests are answered by the responders queued for their function code,
/// in order. A request with nothing queued gets a zero status, which every
/// status-only call treats as success.
pub struct MockTransport {
    server_address_id: u32,
    message_id: AtomicU32,
    responders: Mutex<HashMap<u32, VecDeque<Responder>>>,
    requests: Mutex<Vec<Message>>,
    recorded: watch::Sender<usize>,
    sink: Mutex<Option<InboundSink>>,
}

impl Default for MockTransport {
    fn default() -> Self { Self::new() }
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            server_address_id: SERVER_ADDRESS_ID,
            message_id: AtomicU32::new(1),
            responders: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            recorded: watch::channel(0).0,
            sink: Mutex::new(None),
        }
    }

    /// Queue a responder for the next unanswered request of `function`.
    pub fn respond(
        &self,
        function: u32,
        responder: impl FnOnce(&Message) -> Result<Message, TransportError> + Send + 'static,
    ) {
        locked(&self.responders)
            .entry(function)
            .or_default()
            .push_back(Box::new(responder));
    }

    /// Answer the next request of `function` with `body`.
    pub fn respond_with<B: Body + Send + 'static>(&self, function: u32, body: B) {
        self.respond(function, move |request| Ok(request.reply_with(&body)));
    }

    /// Answer the next request of `function` with a bare status.
    pub fn respond_status(&self, function: u32, status: i32) {
        self.respond_with(function, StatusResponse { status });
    }

    /// Fail the next request of `function` with `error`.
    pub fn fail(&self, function: u32, error: TransportError) {
        self.respond(function, move |_| Err(error));
    }

    /// Every request sent so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Message> { locked(&self.requests).clone() }

    /// Requests sent so far with the given function code.
    #[must_use]
    pub fn requests_for(&self, function: u32) -> Vec<Message> {
        locked(&self.requests)
            .iter()
            .filter(|m| m.function() == function)
            .cloned()
            .collect()
    }

    /// Wait up to one second for the first request of `function`.
    pub async fn wait_for_request(&self, function: u32) -> Option<Message> {
        let mut changes = self.recorded.subscribe();
        let wait = async {
            loop {
                if let Some(found) = self.requests_for(function).into_iter().next() {
                    return Some(found);
                }
                if changes.changed().await.is_err() {
                    return None;
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(1), wait)
            .await
            .ok()
            .flatten()
    }

    /// Report whether a MAP group handler is registered.
    #[must_use]
    pub fn has_handler(&self) -> bool { locked(&self.sink).is_some() }

    /// Deliver `message` as if the server process had sent it.
    ///
    /// Returns `false` if no handler is registered or it has gone away.
    pub fn inject_message(&self, message: Message) -> bool {
        locked(&self.sink)
            .as_ref()
            .is_some_and(|sink| sink.send(message).is_ok())
    }

    /// Deliver `event` from the server process.
    pub fn inject(&self, event: &MapEvent) -> bool {
        let message = event.to_message(self.server_address_id, self.next_message_id());
        self.inject_message(message)
    }

    /// Announce that the server process left the bus.
    pub fn server_unregistered(&self) -> bool {
        let notice = ClientRegistration {
            address_id: self.server_address_id,
            registered: false,
        };
        let message = Message::with_body(
            self.server_address_id,
            self.next_message_id(),
            function::CLIENT_REGISTRATION,
            &notice,
        );
        self.inject_message(message)
    }

    fn answer(&self, message: &Message) -> Result<Message, TransportError> {
        let responder = locked(&self.responders)
            .get_mut(&message.function())
            .and_then(VecDeque::pop_front);
        match responder {
            Some(responder) => responder(message),
            None => Ok(message.reply_with(&StatusResponse { status: 0 })),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn server_address_id(&self) -> u32 { self.server_address_id }

    fn next_message_id(&self) -> u32 { self.message_id.fetch_add(1, Ordering::Relaxed) }

    async fn send_message_response(
        &self,
        message: Message,
        _timeout: Duration,
    ) -> Result<Message, TransportError> {
        let response = self.answer(&message);
        locked(&self.requests).push(message);
        self.recorded.send_modify(|count| *count += 1);
        response
    }

    fn register_group_handler(&self, group: u32, sink: InboundSink) -> Result<(), TransportError> {
        let mut current = locked(&self.sink);
        if group != MAP_MESSAGE_GROUP || current.as_ref().is_some_and(|s| !s.is_closed()) {
            return Err(TransportError::GroupInUse(group));
        }
        *current = Some(sink);
        Ok(())
    }

    fn unregister_group_handler(&self, _group: u32) { *locked(&self.sink) = None; }
}
