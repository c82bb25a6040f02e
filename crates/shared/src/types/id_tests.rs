use super::id::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = CompanyId::new();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = AccountId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_default() {
    let id = VoucherId::default();
    assert!(!id.into_inner().is_nil());
}

#[test]
fn test_typed_id_roundtrip_from_str() {
    let id = FiscalPeriodId::new();
    let parsed = FiscalPeriodId::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn test_typed_id_from_str_rejects_garbage() {
    assert!(UserId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_typed_ids_are_distinct() {
    let a = VoucherEntryId::new();
    let b = VoucherEntryId::new();
    assert_ne!(a, b);
}
