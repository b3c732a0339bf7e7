//! Outgoing connections in callback and blocking mode.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use mapm::{
    BdAddr,
    ConnectMode,
    ConnectionFlags,
    ConnectionRole,
    ConnectionStatus,
    DeviceEvent,
    EventCallback,
    MapEvent,
    MapmError,
    Manager,
    MessageTypes,
    ServerFlags,
    message::{
        connection::{ConnectRemoteDevice, ConnectionStatusNotice, ConnectionTarget},
        function,
    },
    transport::TransportError,
};
use mapm_testing::recorder;
use rstest::rstest;
use tokio::task::JoinHandle;

mod common;
use common::{Harness, PEER, TestResult};

const PORT: u32 = 10;
const INSTANCE: u32 = 3;
const SERVER_INSTANCE: u32 = 7;

fn status(status: ConnectionStatus) -> MapEvent {
    MapEvent::ConnectionStatus(ConnectionStatusNotice {
        role: ConnectionRole::AccessClient,
        remote_device: PEER,
        instance_id: INSTANCE,
        status,
    })
}

fn spawn_blocking_connect(manager: &Manager) -> JoinHandle<mapm::Result<ConnectionStatus>> {
    let manager = manager.clone();
    tokio::spawn(async move {
        manager
            .connect_remote_device(
                ConnectionRole::AccessClient,
                PEER,
                PORT,
                INSTANCE,
                ConnectionFlags::NONE,
                ConnectMode::Blocking,
            )
            .await
    })
}

async fn outcome(
    task: JoinHandle<mapm::Result<ConnectionStatus>>,
) -> TestResult<mapm::Result<ConnectionStatus>> {
    Ok(tokio::time::timeout(Duration::from_secs(1), task).await??)
}

fn tracked(harness: &Harness) -> Option<ConnectionStatus> {
    harness
        .manager
        .connection_status(ConnectionRole::AccessClient, PEER, INSTANCE)
}

/// A blocking connect returns once the server reports success.
#[tokio::test]
async fn blocking_connect_waits_for_status() -> TestResult {
    let harness = Harness::start()?;
    let task = spawn_blocking_connect(&harness.manager);

    let request = harness
        .transport
        .wait_for_request(function::CONNECT_REMOTE_DEVICE)
        .await
        .ok_or("connect request never sent")?;
    let body: ConnectRemoteDevice = request.parse()?;
    assert_eq!(body.remote_server_port, PORT);
    assert!(!task.is_finished());

    assert!(harness.transport.inject(&status(ConnectionStatus::Success)));
    assert_eq!(outcome(task).await??, ConnectionStatus::Success);
    assert_eq!(tracked(&harness), Some(ConnectionStatus::Success));
    Ok(())
}

#[rstest]
#[case(ConnectionStatus::FailureRefused)]
#[case(ConnectionStatus::FailureTimeout)]
#[case(ConnectionStatus::FailureSecurity)]
#[tokio::test]
async fn blocking_connect_reports_failure(#[case] reported: ConnectionStatus) -> TestResult {
    let harness = Harness::start()?;
    let task = spawn_blocking_connect(&harness.manager);
    harness
        .transport
        .wait_for_request(function::CONNECT_REMOTE_DEVICE)
        .await
        .ok_or("connect request never sent")?;

    harness.transport.inject(&status(reported));
    match outcome(task).await? {
        Err(MapmError::UnableToConnectToDevice { status }) => assert_eq!(status, reported),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(tracked(&harness), None);
    Ok(())
}

#[rstest]
#[case(DeviceEvent::PoweringOff)]
#[case(DeviceEvent::PoweredOff)]
#[tokio::test]
async fn power_down_fails_pending_connect(#[case] event: DeviceEvent) -> TestResult {
    let harness = Harness::start()?;
    let (callback, _events) = recorder();
    harness
        .manager
        .connect_remote_device(
            ConnectionRole::AccessClient,
            common::OTHER_PEER,
            PORT,
            INSTANCE,
            ConnectionFlags::NONE,
            ConnectMode::Callback(callback),
        )
        .await?;
    let task = spawn_blocking_connect(&harness.manager);
    tokio::time::timeout(Duration::from_secs(1), async {
        while harness.transport.requests_for(function::CONNECT_REMOTE_DEVICE).len() < 2 {
            tokio::task::yield_now().await;
        }
    })
    .await?;

    harness.manager.handle_device_event(event);
    assert!(!harness.manager.is_powered());
    assert!(matches!(
        outcome(task).await?,
        Err(MapmError::UnableToConnectToDevice {
            status: ConnectionStatus::FailureDevicePowerOff
        })
    ));
    assert_eq!(tracked(&harness), None);
    assert_eq!(
        harness.manager.connection_status(
            ConnectionRole::AccessClient,
            common::OTHER_PEER,
            INSTANCE
        ),
        None,
        "established connections are dropped on power-down"
    );
    Ok(())
}

#[tokio::test]
async fn server_process_exit_fails_pending_connect() -> TestResult {
    let harness = Harness::start()?;
    let task = spawn_blocking_connect(&harness.manager);
    harness
        .transport
        .wait_for_request(function::CONNECT_REMOTE_DEVICE)
        .await
        .ok_or("connect request never sent")?;

    assert!(harness.transport.server_unregistered());
    assert!(matches!(
        outcome(task).await?,
        Err(MapmError::UnableToConnectToDevice {
            status: ConnectionStatus::FailureDevicePowerOff
        })
    ));
    assert!(harness.manager.is_powered(), "only the waiters are failed");
    Ok(())
}

#[tokio::test]
async fn shutdown_wakes_pending_connect() -> TestResult {
    let harness = Harness::start()?;
    let task = spawn_blocking_connect(&harness.manager);
    harness
        .transport
        .wait_for_request(function::CONNECT_REMOTE_DEVICE)
        .await
        .ok_or("connect request never sent")?;

    harness.manager.shutdown();
    assert!(matches!(
        outcome(task).await?,
        Err(MapmError::UnableToConnectToDevice {
            status: ConnectionStatus::FailureUnknown
        })
    ));
    Ok(())
}

/// Callback mode returns as soon as the request is accepted; the outcome
/// arrives on the callback.
#[tokio::test]
async fn callback_connect_returns_immediately() -> TestResult {
    let harness = Harness::start()?;
    let (callback, mut events) = recorder();
    let accepted = harness
        .manager
        .connect_remote_device(
            ConnectionRole::AccessClient,
            PEER,
            PORT,
            INSTANCE,
            ConnectionFlags::NONE,
            ConnectMode::Callback(callback),
        )
        .await?;
    assert_eq!(accepted, ConnectionStatus::Success);

    let connected = MapEvent::DeviceConnected(ConnectionTarget {
        role: ConnectionRole::AccessClient,
        remote_device: PEER,
        instance_id: INSTANCE,
    });
    harness.transport.inject(&connected);
    assert_eq!(events.next().await, Some(connected));

    harness.transport.inject(&status(ConnectionStatus::FailureRefused));
    assert_eq!(events.next().await, Some(status(ConnectionStatus::FailureRefused)));
    assert_eq!(tracked(&harness), None);
    Ok(())
}

#[tokio::test]
async fn duplicate_connect_is_refused() -> TestResult {
    let harness = Harness::start()?;
    let (callback, _events) = recorder();
    let connect = |mode| {
        harness.manager.connect_remote_device(
            ConnectionRole::AccessClient,
            PEER,
            PORT,
            INSTANCE,
            ConnectionFlags::NONE,
            mode,
        )
    };
    connect(ConnectMode::Callback(callback.clone())).await?;
    assert!(matches!(
        connect(ConnectMode::Callback(callback)).await,
        Err(MapmError::UnableToAddEntry)
    ));
    assert_eq!(
        harness.transport.requests_for(function::CONNECT_REMOTE_DEVICE).len(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn undeliverable_connect_is_forgotten() -> TestResult {
    let harness = Harness::start()?;
    harness.transport.fail(
        function::CONNECT_REMOTE_DEVICE,
        TransportError::Timeout(Duration::from_millis(5)),
    );
    let result = spawn_blocking_connect(&harness.manager);
    assert!(matches!(outcome(result).await?, Err(MapmError::UnableToAddEntry)));
    assert_eq!(tracked(&harness), None);
    Ok(())
}

#[rstest]
#[case(ConnectionRole::AccessServer, PEER, PORT)]
#[case(ConnectionRole::AccessClient, BdAddr::NULL, PORT)]
#[case(ConnectionRole::NotificationServer, PEER, PORT)]
#[case(ConnectionRole::AccessClient, PEER, 0)]
#[tokio::test]
async fn invalid_connect_arguments(
    #[case] role: ConnectionRole,
    #[case] address: BdAddr,
    #[case] port: u32,
) -> TestResult {
    let harness = Harness::start()?;
    let result = harness
        .manager
        .connect_remote_device(role, address, port, INSTANCE, ConnectionFlags::NONE, ConnectMode::Blocking)
        .await;
    assert!(matches!(result, Err(MapmError::InvalidParameter)));
    assert!(harness.transport.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn disconnect_forgets_client() -> TestResult {
    let harness = Harness::start()?;
    assert!(matches!(
        harness
            .manager
            .disconnect(ConnectionRole::AccessClient, PEER, INSTANCE)
            .await,
        Err(MapmError::InvalidConnectionState)
    ));

    let (callback, _events) = recorder();
    harness
        .manager
        .connect_remote_device(
            ConnectionRole::AccessClient,
            PEER,
            PORT,
            INSTANCE,
            ConnectionFlags::NONE,
            ConnectMode::Callback(callback),
        )
        .await?;
    harness
        .manager
        .disconnect(ConnectionRole::AccessClient, PEER, INSTANCE)
        .await?;
    assert_eq!(tracked(&harness), None);
    Ok(())
}

/// A failed blocking connect only cleans up its own record: a connection
/// opened under the same key after the failure stays tracked.
#[tokio::test]
async fn failed_connect_leaves_successor_tracked() -> TestResult {
    let harness = Harness::start()?;
    let reopened = Arc::new(Mutex::new(None));
    let on_server_event: EventCallback = {
        let manager = harness.manager.clone();
        let reopened = reopened.clone();
        Arc::new(move |event: &MapEvent| {
            if !matches!(event, MapEvent::DeviceConnected(_)) {
                return;
            }
            let (callback, _events) = recorder();
            let result = futures::executor::block_on(manager.connect_remote_device(
                ConnectionRole::AccessClient,
                PEER,
                PORT,
                INSTANCE,
                ConnectionFlags::NONE,
                ConnectMode::Callback(callback),
            ));
            *reopened.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
        })
    };
    harness
        .manager
        .register_server(
            PORT,
            ServerFlags::NONE,
            SERVER_INSTANCE,
            MessageTypes::EMAIL,
            on_server_event,
        )
        .await?;

    let task = spawn_blocking_connect(&harness.manager);
    harness
        .transport
        .wait_for_request(function::CONNECT_REMOTE_DEVICE)
        .await
        .ok_or("connect request never sent")?;

    // Both messages are queued before the dispatcher runs, so the second
    // connect lands before the failed caller resumes.
    harness.transport.inject(&status(ConnectionStatus::FailureRefused));
    harness
        .transport
        .inject(&MapEvent::DeviceConnected(ConnectionTarget {
            role: ConnectionRole::AccessServer,
            remote_device: common::OTHER_PEER,
            instance_id: SERVER_INSTANCE,
        }));

    assert!(matches!(
        outcome(task).await?,
        Err(MapmError::UnableToConnectToDevice {
            status: ConnectionStatus::FailureRefused
        })
    ));
    let second = reopened
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .ok_or("server callback never ran")?;
    assert_eq!(second?, ConnectionStatus::Success);
    assert_eq!(tracked(&harness), Some(ConnectionStatus::Success));
    Ok(())
}
