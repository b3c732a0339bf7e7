//! Inbound message dispatch.
//!
//! A single task drains the group-handler channel, so at most one inbound
//! message is processed at a time. Each message is decoded, matched to a
//! registry record under the manager lock, and delivered to the record's
//! callback after the lock is released.

use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Weak},
};

use futures::FutureExt;
use log::{debug, error, trace, warn};
use tokio::sync::mpsc;

use crate::{
    address::BdAddr,
    event::{EventCallback, EventTarget, MapEvent},
    manager::{Inner, State},
    message::{
        MAP_MESSAGE_GROUP,
        Message,
        connection::{ClientRegistration, ConnectionStatusNotice, ConnectionTarget},
        function,
    },
    panic::{format_panic, run_isolated},
    power,
    registry::{RecordKey, Registry},
    types::ConnectionRole,
};

/// Drain `inbound` until the channel closes or the manager is dropped.
pub(crate) async fn run(manager: Weak<Inner>, mut inbound: mpsc::UnboundedReceiver<Message>) {
    let task = AssertUnwindSafe(async move {
        while let Some(message) = inbound.recv().await {
            let Some(inner) = manager.upgrade() else {
                break;
            };
            dispatch(&inner, &message);
        }
    })
    .catch_unwind();

    if let Err(panic) = task.await {
        let panic_msg = format_panic(&*panic);
        // Emit via both `log` and `tracing` for tests that capture either.
        error!("MAP dispatch task panicked: panic={panic_msg}");
        tracing::error!(panic = %panic_msg, "MAP dispatch task panicked");
    }
}

/// Callbacks captured under the lock for one event.
#[derive(Default)]
struct Delivery {
    primary: Option<EventCallback>,
    data: Option<EventCallback>,
}

/// Process one inbound message.
pub(crate) fn dispatch(inner: &Arc<Inner>, message: &Message) {
    let header = message.header();
    if header.message_group != MAP_MESSAGE_GROUP {
        trace!("ignoring message for group {:#x}", header.message_group);
        return;
    }
    if message.is_response() {
        trace!("ignoring unsolicited response: message_id={:#x}", header.message_id);
        return;
    }
    if message.function() == function::CLIENT_REGISTRATION {
        handle_registration(inner, message);
        return;
    }

    let event = match MapEvent::decode(message) {
        Some(Ok(event)) => event,
        Some(Err(e)) => {
            warn!(
                "dropping malformed {}: {e}",
                function::name(message.function()).unwrap_or("message")
            );
            return;
        }
        None => {
            debug!("ignoring unknown MAP function {:#x}", message.function());
            return;
        }
    };

    let delivery = {
        let Ok(mut state) = inner.lock() else {
            error!("dropping {event:?}: manager lock poisoned");
            return;
        };
        if !state.initialized {
            return;
        }
        route(&mut state, &event)
    };

    if let Some(callback) = delivery.primary {
        run_isolated("MAP event callback", || callback(&event));
    }
    if let Some(callback) = delivery.data {
        run_isolated("MAP data callback", || callback(&event));
    }
}

fn handle_registration(inner: &Inner, message: &Message) {
    let notice = match message.parse::<ClientRegistration>() {
        Ok(notice) => notice,
        Err(e) => {
            warn!("dropping malformed client registration notice: {e}");
            return;
        }
    };
    if notice.registered || notice.address_id != inner.server_address() {
        return;
    }
    match inner.lock() {
        Ok(mut state) => {
            let woken = power::fail_openers(&mut state.entries);
            debug!("server process unregistered; failed {woken} pending connects");
        }
        Err(_) => error!("cannot fail pending connects: manager lock poisoned"),
    }
}

/// Find the record an event is addressed to and apply its registry effects.
fn route(state: &mut State, event: &MapEvent) -> Delivery {
    let address = event.remote_device();
    let instance_id = event.instance_id();

    let primary = match event {
        MapEvent::ConnectionStatus(notice) => connection_status(&mut state.entries, notice),
        MapEvent::DeviceConnected(target) => {
            let key = connection_key(&state.entries, target.role, address, instance_id);
            key.and_then(|key| state.entries.get_mut(&key)).and_then(|record| {
                if record.role == target.role && !record.role.is_client() {
                    record.remote_address = address;
                }
                record.callback()
            })
        }
        MapEvent::DeviceDisconnected(target) => disconnected(&mut state.entries, target),
        _ => {
            let role = target_role(event.target());
            state
                .entries
                .find(role, address, instance_id)
                .and_then(|record| record.callback())
        }
    };
    if primary.is_none() {
        debug!("no callback for {event:?}");
    }

    let data = event
        .carries_data()
        .then(|| {
            state
                .data_entries
                .find(target_role(event.target()), address, instance_id)
                .and_then(|record| record.callback())
        })
        .flatten();
    Delivery { primary, data }
}

fn target_role(target: EventTarget) -> ConnectionRole {
    match target {
        EventTarget::AccessServer => ConnectionRole::AccessServer,
        EventTarget::AccessClient | EventTarget::Connection => ConnectionRole::AccessClient,
    }
}

/// Resolve the record for a connection event.
///
/// Notification connections without a record of their own report against
/// the access connection they belong to: a notification server against the
/// access client for the same peer and instance, a notification client
/// against the local access server for the instance.
fn connection_key(
    registry: &Registry,
    role: ConnectionRole,
    address: BdAddr,
    instance_id: u32,
) -> Option<RecordKey> {
    let present = |key: RecordKey| registry.get(&key).is_some().then_some(key);
    RecordKey::for_role(role, address, instance_id)
        .and_then(present)
        .or_else(|| {
            let fallback = match role {
                ConnectionRole::NotificationServer => {
                    RecordKey::for_role(ConnectionRole::AccessClient, address, instance_id)
                }
                ConnectionRole::NotificationClient => Some(RecordKey::AccessServer(instance_id)),
                ConnectionRole::AccessServer | ConnectionRole::AccessClient => None,
            };
            fallback.and_then(present)
        })
}

fn connection_status(
    registry: &mut Registry,
    notice: &ConnectionStatusNotice,
) -> Option<EventCallback> {
    let role = notice.role;
    let key = connection_key(registry, role, notice.remote_device, notice.instance_id)?;
    let record = registry.get_mut(&key)?;
    let own = record.role == role;

    if own && record.opening {
        record.complete(notice.status);
        if !notice.status.is_success() && role.is_client() {
            registry.remove_key(&key);
        }
        return None;
    }

    if own {
        record.status = notice.status;
    }
    let callback = record.callback();
    if own && !notice.status.is_success() && role.is_client() {
        registry.remove_key(&key);
    }
    callback
}

fn disconnected(registry: &mut Registry, target: &ConnectionTarget) -> Option<EventCallback> {
    let role = target.role;
    let key = connection_key(registry, role, target.remote_device, target.instance_id)?;
    let record = registry.get_mut(&key)?;
    let callback = record.callback();
    if record.role == role {
        if role.is_client() {
            registry.remove_key(&key);
        } else {
            record.remote_address = BdAddr::NULL;
        }
    }
    callback
}
