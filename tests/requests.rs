//! Request marshalling and response validation for MCE and MSE calls.

use bytes::Bytes;
use mapm::{
    BdAddr,
    CharSet,
    ConnectionRole,
    FractionalType,
    MapmError,
    MessageTypes,
    ServiceDetails,
    SetFolderOption,
    StatusIndicator,
    TimeDate,
    message::{
        Body,
        DecodeError,
        Message,
        access::{
            GetMessage,
            MessageData,
            MessageListingSize,
            Notification,
            PushConfirmation,
            PushMessage,
            SetFolder,
        },
        connection::ConnectionTarget,
        function,
        response::{CurrentFolderResponse, ParseServicesResponse, StatusResponse},
    },
    transport::TransportError,
};
use rstest::rstest;

mod common;
use common::{Harness, PEER, TestResult};

const INSTANCE: u32 = 0;

fn services() -> ParseServicesResponse {
    ParseServicesResponse {
        status: 0,
        services: vec![
            ServiceDetails {
                server_port: 2,
                instance_id: 0,
                supported_message_types: MessageTypes::SMS_GSM | MessageTypes::MMS,
                service_name: Some("SMS/MMS".to_owned()),
            },
            ServiceDetails {
                server_port: 5,
                instance_id: 1,
                supported_message_types: MessageTypes::EMAIL,
                service_name: None,
            },
        ],
    }
}

#[tokio::test]
async fn remote_services_are_parsed() -> TestResult {
    let harness = Harness::start()?;
    harness
        .transport
        .respond_with(function::PARSE_REMOTE_MESSAGE_ACCESS_SERVICES, services());

    let info = harness
        .manager
        .parse_remote_message_access_services(PEER)
        .await?;
    assert_eq!(info.len(), 2);
    assert_eq!(info.services, services().services);
    Ok(())
}

/// A name-buffer length that disagrees with the per-record lengths is
/// rejected rather than trusted.
#[tokio::test]
async fn inconsistent_service_lengths_are_rejected() -> TestResult {
    let harness = Harness::start()?;
    let mut payload = services().to_bytes().to_vec();
    let declared = u32::from_be_bytes(payload[8..12].try_into()?) + 1;
    payload[8..12].copy_from_slice(&declared.to_be_bytes());
    payload.push(0);
    harness.transport.respond(
        function::PARSE_REMOTE_MESSAGE_ACCESS_SERVICES,
        move |request| {
            let mut header = request.header().as_response();
            header.message_length = u32::try_from(payload.len()).unwrap_or(u32::MAX);
            Ok(Message::from_parts(header, Bytes::from(payload)))
        },
    );

    let result = harness.manager.parse_remote_message_access_services(PEER).await;
    assert!(matches!(
        result,
        Err(MapmError::ResponseMessageInvalid(DecodeError::Inconsistent { .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn short_response_is_rejected() -> TestResult {
    let harness = Harness::start()?;
    harness.transport.respond(function::UPDATE_INBOX, |request| {
        let mut header = request.header().as_response();
        header.message_length = 2;
        Ok(Message::from_parts(header, Bytes::from_static(&[0, 0])))
    });

    let result = harness.manager.update_inbox(PEER, INSTANCE).await;
    assert!(matches!(
        result,
        Err(MapmError::ResponseMessageInvalid(DecodeError::TooShort {
            declared: 2,
            minimum: StatusResponse::MIN_SIZE,
        }))
    ));
    Ok(())
}

#[tokio::test]
async fn mismatched_response_function_is_rejected() -> TestResult {
    let harness = Harness::start()?;
    harness.transport.respond(function::UPDATE_INBOX, |request| {
        Ok(Message::with_body(
            request.header().address_id,
            request.header().message_id,
            function::ABORT,
            &StatusResponse { status: 0 },
        ))
    });

    let result = harness.manager.update_inbox(PEER, INSTANCE).await;
    assert!(matches!(
        result,
        Err(MapmError::ResponseMessageInvalid(DecodeError::UnexpectedFunction { .. }))
    ));
    Ok(())
}

#[rstest]
#[case(Some("telecom/msg/inbox"), "telecom/msg/inbox")]
#[case(None, "")]
#[tokio::test]
async fn current_folder_is_reported(
    #[case] folder_name: Option<&'static str>,
    #[case] expected: &str,
) -> TestResult {
    let harness = Harness::start()?;
    harness
        .transport
        .respond_with(function::QUERY_CURRENT_FOLDER, CurrentFolderResponse {
            status: 0,
            folder_name: folder_name.map(str::to_owned),
        });

    let folder = harness.manager.query_current_folder(PEER, INSTANCE).await?;
    assert_eq!(folder, expected);
    Ok(())
}

#[tokio::test]
async fn server_failures_are_propagated() -> TestResult {
    let harness = Harness::start()?;
    harness.transport.respond_status(function::ENABLE_NOTIFICATIONS, -11);
    harness.transport.fail(function::UPDATE_INBOX, TransportError::Disconnected);

    let refused = harness.manager.enable_notifications(PEER, INSTANCE, true).await;
    assert!(matches!(refused, Err(MapmError::Remote(-11))));
    let lost = harness.manager.update_inbox(PEER, INSTANCE).await;
    assert!(matches!(lost, Err(MapmError::Transport(TransportError::Disconnected))));
    assert_eq!(lost.map_err(|e| e.code()), Err(-16));
    Ok(())
}

#[tokio::test]
async fn requests_carry_their_arguments() -> TestResult {
    let harness = Harness::start()?;
    harness
        .manager
        .get_message(
            PEER,
            INSTANCE,
            "20000100001",
            true,
            CharSet::Utf8,
            FractionalType::First,
        )
        .await?;
    harness
        .manager
        .set_folder(PEER, INSTANCE, SetFolderOption::Down, Some("telecom"))
        .await?;

    let requests = harness.transport.requests();
    assert!(requests.iter().all(|m| m.header().address_id == mapm_testing::SERVER_ADDRESS_ID));
    let get: GetMessage = requests[0].parse()?;
    assert_eq!(get.message_handle, "20000100001");
    assert!(get.attachment);
    let set: SetFolder = requests[1].parse()?;
    assert_eq!(set.folder_name.as_deref(), Some("telecom"));
    assert_ne!(
        requests[0].header().message_id,
        requests[1].header().message_id
    );
    Ok(())
}

#[tokio::test]
async fn address_override_redirects_requests() -> TestResult {
    let harness =
        Harness::start_with(mapm::ManagerConfig::default().address_id_override(Some(0x42)))?;
    harness.manager.update_inbox(PEER, INSTANCE).await?;
    assert_eq!(harness.transport.requests()[0].header().address_id, 0x42);
    Ok(())
}

/// Arguments are validated locally; nothing reaches the server.
#[tokio::test]
async fn invalid_arguments_are_rejected_locally() -> TestResult {
    let harness = Harness::start()?;
    let manager = &harness.manager;
    let invalid = |result: mapm::Result<()>| matches!(result, Err(MapmError::InvalidParameter));

    assert!(invalid(manager.update_inbox(BdAddr::NULL, INSTANCE).await));
    assert!(invalid(manager.update_inbox(PEER, 256).await));
    assert!(invalid(
        manager
            .set_folder(PEER, INSTANCE, SetFolderOption::Down, None)
            .await
    ));
    assert!(invalid(
        manager
            .set_message_status(PEER, INSTANCE, "", StatusIndicator::ReadStatus, true)
            .await
    ));
    assert!(invalid(
        manager
            .get_message(
                PEER,
                INSTANCE,
                "12345678901234567",
                false,
                CharSet::Utf8,
                FractionalType::Unfragmented,
            )
            .await
    ));
    let mut push = PushMessage::new(PEER, INSTANCE, None, Bytes::new());
    push.is_final = false;
    assert!(invalid(manager.push_message(push).await));
    assert!(invalid(
        manager
            .send_notification(PEER, INSTANCE, Bytes::new(), false)
            .await
    ));
    assert!(invalid(
        manager
            .push_message_confirmation(PEER, INSTANCE, 0xA0, "")
            .await
    ));
    assert!(harness.transport.requests().is_empty());

    manager
        .set_folder(PEER, INSTANCE, SetFolderOption::Up, None)
        .await?;
    manager
        .send_notification(PEER, INSTANCE, Bytes::new(), true)
        .await?;
    assert_eq!(harness.transport.requests().len(), 2);
    Ok(())
}

/// MSE replies reach the transport under their own function codes with the
/// caller's arguments intact.
#[tokio::test]
async fn server_sends_are_marshalled() -> TestResult {
    let harness = Harness::start()?;
    let manager = &harness.manager;
    let now = TimeDate {
        year: 2024,
        month: 3,
        day: 9,
        hour: 14,
        minute: 5,
        second: 30,
        utc_time: true,
        utc_offset: 60,
    };

    manager
        .send_message(
            PEER,
            INSTANCE,
            0xA0,
            FractionalType::Last,
            Bytes::from_static(b"BEGIN:BMSG"),
            true,
        )
        .await?;
    manager
        .send_notification(PEER, INSTANCE, Bytes::from_static(b"<MAP-event-report/>"), true)
        .await?;
    manager
        .push_message_confirmation(PEER, INSTANCE, 0xA0, "20000100002")
        .await?;
    manager
        .send_message_listing_size(PEER, INSTANCE, 0xA0, 7, true, now)
        .await?;

    let requests = harness.transport.requests();
    let functions: Vec<u32> = requests.iter().map(|m| m.function()).collect();
    assert_eq!(functions, [
        function::SEND_MESSAGE,
        function::SEND_NOTIFICATION,
        function::PUSH_MESSAGE_CONFIRMATION,
        function::SEND_MESSAGE_LISTING_SIZE,
    ]);

    assert_eq!(requests[0].parse::<MessageData>()?, MessageData {
        remote_device: PEER,
        instance_id: INSTANCE,
        response_code: 0xA0,
        fractional_type: FractionalType::Last,
        is_final: true,
        data: Bytes::from_static(b"BEGIN:BMSG"),
    });
    assert_eq!(requests[1].parse::<Notification>()?, Notification {
        remote_device: PEER,
        instance_id: INSTANCE,
        is_final: true,
        data: Bytes::from_static(b"<MAP-event-report/>"),
    });
    assert_eq!(requests[2].parse::<PushConfirmation>()?, PushConfirmation {
        remote_device: PEER,
        instance_id: INSTANCE,
        response_code: 0xA0,
        message_handle: "20000100002".to_owned(),
    });
    assert_eq!(requests[3].parse::<MessageListingSize>()?, MessageListingSize {
        remote_device: PEER,
        instance_id: INSTANCE,
        response_code: 0xA0,
        message_count: 7,
        new_message: true,
        current_time: now,
    });
    Ok(())
}

#[tokio::test]
async fn abort_targets_the_connection() -> TestResult {
    let harness = Harness::start()?;
    harness
        .manager
        .abort(ConnectionRole::AccessClient, PEER, INSTANCE)
        .await?;
    let request = harness
        .transport
        .requests_for(function::ABORT)
        .pop()
        .ok_or("abort request never sent")?;
    assert_eq!(request.parse::<ConnectionTarget>()?, ConnectionTarget {
        role: ConnectionRole::AccessClient,
        remote_device: PEER,
        instance_id: INSTANCE,
    });

    harness.transport.respond_status(function::ABORT, -3);
    let refused = harness
        .manager
        .abort(ConnectionRole::AccessClient, PEER, INSTANCE)
        .await;
    assert!(matches!(refused, Err(MapmError::Remote(-3))));
    Ok(())
}
