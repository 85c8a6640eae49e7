//! Integration tests for the one-shot host commands.
//!
//! Power gating, single-tag reads, EPC writes and power level control.

mod common;

use rstest::rstest;
use uhf_hardware::{AccessPassword, MemoryBank, TagRecord};
use uhf_reader::sink::ReaderEvent;
use uhf_reader::{ReaderError, ReaderState};

use common::{next_event, ready_service, service, test_config};

const VALID_EPC: &str = "E2003412B802011526603FE2";

// ============================================================================
// Power gating
// ============================================================================

#[tokio::test]
async fn test_commands_require_power_on() {
    let (service, _events, mock) = service(test_config());

    assert!(matches!(
        service.read_single_tag().await,
        Err(ReaderError::NotInitialized)
    ));
    assert!(matches!(
        service.start_reading_tags().await,
        Err(ReaderError::NotInitialized)
    ));
    assert!(matches!(
        service.find_tag("E1").await,
        Err(ReaderError::NotInitialized)
    ));
    assert!(matches!(
        service.stop_reading_tags().await,
        Err(ReaderError::NotInitialized)
    ));
    assert!(matches!(
        service.change_power(20).await,
        Err(ReaderError::NotInitialized)
    ));
    assert!(matches!(
        service.write_data_into_epc(VALID_EPC).await,
        Err(ReaderError::NotInitialized)
    ));

    assert!(!mock.is_acquired());
    assert!(mock.writes().is_empty());
    assert_eq!(mock.poll_count(), 0);
}

#[tokio::test]
async fn test_initialize_twice_is_harmless() {
    let (service, mut events, _mock) = ready_service(test_config()).await;

    service.initialize_reader().await.unwrap().unwrap();
    assert_eq!(service.reader_state().await, ReaderState::Ready);
    assert_eq!(
        next_event(&mut events).await,
        ReaderEvent::power_status("success: power on")
    );
}

#[tokio::test]
async fn test_power_cycle() {
    let (service, mut events, mock) = ready_service(test_config()).await;

    service.deinitialize_reader().await.unwrap().unwrap();
    assert_eq!(
        next_event(&mut events).await,
        ReaderEvent::power_status("success: power off")
    );
    assert!(!mock.is_acquired());

    service.initialize_reader().await.unwrap().unwrap();
    assert_eq!(
        next_event(&mut events).await,
        ReaderEvent::power_status("success: power on")
    );
    assert!(mock.is_acquired());
}

#[tokio::test]
async fn test_failed_release_keeps_reader_ready() {
    let (service, mut events, mock) = ready_service(test_config()).await;
    mock.set_release_failure(true);

    let err = service.deinitialize_reader().await.unwrap().unwrap_err();
    assert!(matches!(err, ReaderError::Release(_)));
    assert_eq!(service.reader_state().await, ReaderState::Ready);

    match next_event(&mut events).await {
        ReaderEvent::PowerStatus { status } => assert!(status.starts_with("failed: ")),
        other => panic!("unexpected event {:?}", other),
    }
}

// ============================================================================
// Single-tag read
// ============================================================================

#[tokio::test]
async fn test_read_single_tag_returns_and_emits_record() {
    let (service, mut events, mock) = ready_service(test_config()).await;
    let tag = TagRecord::new(VALID_EPC, -42.0)
        .with_pc("3000")
        .with_tid("E2801160200074CF085B0A4F");
    mock.queue_single_tag(tag.clone());

    let read = service.read_single_tag().await.unwrap();
    assert_eq!(read, tag);
    assert_eq!(next_event(&mut events).await, ReaderEvent::TagRead(tag));
}

#[tokio::test]
async fn test_read_single_tag_with_no_tag_fails() {
    let (service, _events, _mock) = ready_service(test_config()).await;

    let err = service.read_single_tag().await.unwrap_err();
    assert!(matches!(err, ReaderError::Read(_)));
    assert_eq!(err.code(), "UHF_READER_READ_ERROR");
}

#[tokio::test]
async fn test_read_single_tag_rejected_during_inventory() {
    let (service, _events, mock) = ready_service(test_config()).await;
    mock.queue_single_tag(TagRecord::new(VALID_EPC, -42.0));

    service.start_reading_tags().await.unwrap();
    assert!(matches!(
        service.read_single_tag().await,
        Err(ReaderError::InventoryActive)
    ));

    service.stop_reading_tags().await.unwrap();
    assert_eq!(service.read_single_tag().await.unwrap().epc, VALID_EPC);
}

// ============================================================================
// EPC write
// ============================================================================

#[tokio::test]
async fn test_write_epc_uses_configured_layout() {
    let (service, _events, mock) = ready_service(test_config()).await;

    assert!(service.write_data_into_epc(VALID_EPC).await.unwrap());

    let writes = mock.writes();
    assert_eq!(writes.len(), 1);
    let write = &writes[0];
    assert_eq!(write.password, AccessPassword::ZERO);
    assert_eq!(write.bank, MemoryBank::Epc);
    assert_eq!(write.offset, 2);
    assert_eq!(write.word_count, 6);
    assert_eq!(write.data, format!("{}00000000", VALID_EPC));
}

#[rstest]
#[case("")]
#[case("AB")]
#[case("E2003412B802011526603FE")]
#[case("E2003412B802011526603FE2FF")]
#[case("Z2003412B802011526603FE2")]
#[tokio::test]
async fn test_write_epc_rejects_malformed_input(#[case] epc: &str) {
    let (service, _events, mock) = ready_service(test_config()).await;

    let err = service.write_data_into_epc(epc).await.unwrap_err();
    assert!(matches!(err, ReaderError::Write(_)));
    assert_eq!(err.code(), "UHF_READER_WRITE_ERROR");
    assert!(mock.writes().is_empty());
}

#[tokio::test]
async fn test_write_epc_refused_by_reader() {
    let (service, _events, mock) = ready_service(test_config()).await;
    mock.set_write_accepted(false);

    let err = service.write_data_into_epc(VALID_EPC).await.unwrap_err();
    assert!(matches!(err, ReaderError::Write(_)));
}

// ============================================================================
// Power level
// ============================================================================

#[tokio::test]
async fn test_change_and_read_power() {
    let (service, _events, _mock) = ready_service(test_config()).await;

    assert_eq!(service.read_power().await.unwrap(), 30);
    assert!(service.change_power(18).await.unwrap());
    assert_eq!(service.read_power().await.unwrap(), 18);
}

#[rstest]
#[case(-1)]
#[case(4)]
#[case(31)]
#[tokio::test]
async fn test_change_power_out_of_range(#[case] value: i32) {
    let (service, _events, _mock) = ready_service(test_config()).await;

    let err = service.change_power(value).await.unwrap_err();
    assert_eq!(err.to_string(), "Can't Change Power");
    assert_eq!(service.read_power().await.unwrap(), 30);
}

#[tokio::test]
async fn test_negative_reported_power_is_invalid() {
    let (service, _events, mock) = ready_service(test_config()).await;
    mock.set_reported_power(-1);

    let err = service.read_power().await.unwrap_err();
    assert_eq!(err.to_string(), "INVALID POWER VALUE");
}
