//! Local MSE registration and service records.

use std::sync::Arc;

use mapm::{
    BdAddr,
    ConnectionRole,
    ConnectionStatus,
    DeviceEvent,
    MapEvent,
    MapmError,
    MessageTypes,
    ServerFlags,
    message::{
        connection::{InstanceRequest, RegisterServer},
        function,
        response::ServiceRecordResponse,
    },
};
use mapm_testing::recorder;
use rstest::rstest;

mod common;
use common::{Harness, TestResult};

const PORT: u32 = 4;
const INSTANCE: u32 = 5;

async fn register(harness: &Harness, instance_id: u32) -> mapm::Result<()> {
    let (callback, _events) = recorder();
    harness
        .manager
        .register_server(
            PORT,
            ServerFlags::NONE,
            instance_id,
            MessageTypes::SMS_GSM | MessageTypes::EMAIL,
            callback,
        )
        .await
}

/// A server can be registered once, unregistered, and registered again.
#[tokio::test]
async fn register_duplicate_unregister_reregister() -> TestResult {
    let harness = Harness::start()?;

    register(&harness, INSTANCE).await?;
    assert_eq!(
        harness
            .manager
            .connection_status(ConnectionRole::AccessServer, BdAddr::NULL, INSTANCE),
        Some(ConnectionStatus::Success)
    );
    assert!(matches!(
        register(&harness, INSTANCE).await,
        Err(MapmError::UnableToAddEntry)
    ));
    assert_eq!(
        harness.transport.requests_for(function::REGISTER_SERVER).len(),
        1,
        "a duplicate must not reach the server"
    );

    harness.manager.un_register_server(INSTANCE).await?;
    let sent = harness
        .transport
        .requests_for(function::UN_REGISTER_SERVER)
        .first()
        .map(|m| m.parse::<InstanceRequest>())
        .transpose()?;
    assert_eq!(sent, Some(InstanceRequest { instance_id: INSTANCE }));

    register(&harness, INSTANCE).await?;
    let body: RegisterServer = harness.transport.requests_for(function::REGISTER_SERVER)[1].parse()?;
    assert_eq!(body.server_port, PORT);
    assert!(body.supported_message_types.contains(MessageTypes::EMAIL));
    Ok(())
}

#[tokio::test]
async fn rejected_registration_leaves_nothing_behind() -> TestResult {
    let harness = Harness::start()?;
    harness.transport.respond_status(function::REGISTER_SERVER, -20);

    assert!(matches!(register(&harness, INSTANCE).await, Err(MapmError::Remote(-20))));
    assert_eq!(
        harness
            .manager
            .connection_status(ConnectionRole::AccessServer, BdAddr::NULL, INSTANCE),
        None
    );
    register(&harness, INSTANCE).await?;
    Ok(())
}

#[tokio::test]
async fn unknown_instance_cannot_be_unregistered() -> TestResult {
    let harness = Harness::start()?;
    assert!(matches!(
        harness.manager.un_register_server(9).await,
        Err(MapmError::InvalidInstanceId)
    ));
    assert!(harness.transport.requests().is_empty());
    Ok(())
}

#[rstest]
#[case(0, INSTANCE)]
#[case(31, INSTANCE)]
#[case(PORT, 256)]
#[tokio::test]
async fn out_of_range_arguments_are_rejected(#[case] port: u32, #[case] instance_id: u32) -> TestResult {
    let harness = Harness::start()?;
    let result = harness
        .manager
        .register_server(
            port,
            ServerFlags::NONE,
            instance_id,
            MessageTypes::SMS_GSM,
            Arc::new(|_: &MapEvent| {}),
        )
        .await;
    assert!(matches!(result, Err(MapmError::InvalidParameter)));
    assert!(harness.transport.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn powered_down_radio_refuses_registration() -> TestResult {
    let harness = Harness::start()?;
    harness.manager.handle_device_event(DeviceEvent::PoweredOff);
    assert!(matches!(
        register(&harness, INSTANCE).await,
        Err(MapmError::LocalDevicePoweredDown)
    ));

    harness.manager.handle_device_event(DeviceEvent::PoweredOn);
    register(&harness, INSTANCE).await?;
    Ok(())
}

#[tokio::test]
async fn service_record_handle_is_returned() -> TestResult {
    let harness = Harness::start()?;
    assert!(matches!(
        harness.manager.register_service_record(INSTANCE, Some("MAP MAS")).await,
        Err(MapmError::InvalidInstanceId)
    ));

    register(&harness, INSTANCE).await?;
    harness.transport.respond_with(function::REGISTER_SERVICE_RECORD, ServiceRecordResponse {
        status: 0,
        service_record_handle: 0x0001_0005,
    });
    let handle = harness
        .manager
        .register_service_record(INSTANCE, Some("MAP MAS"))
        .await?;
    assert_eq!(handle, 0x0001_0005);

    harness.manager.un_register_service_record(INSTANCE).await?;
    assert_eq!(
        harness
            .transport
            .requests_for(function::UN_REGISTER_SERVICE_RECORD)
            .len(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn not_initialised_manager_refuses_calls() -> TestResult {
    let harness = Harness::start()?;
    assert!(matches!(
        harness.manager.initialize(),
        Err(MapmError::AlreadyInitialized)
    ));

    harness.manager.shutdown();
    assert!(!harness.transport.has_handler());
    assert!(matches!(
        register(&harness, INSTANCE).await,
        Err(MapmError::NotInitialized)
    ));
    assert!(matches!(
        harness.manager.update_inbox(common::PEER, 0).await,
        Err(MapmError::NotInitialized)
    ));

    harness.manager.initialize()?;
    register(&harness, INSTANCE).await?;
    Ok(())
}
