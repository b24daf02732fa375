//! Identifier tests

use core_kernel::{ClaimId, InvoiceId, PatientId, PayoutId};
use uuid::Uuid;

#[test]
fn display_carries_prefix() {
    assert!(InvoiceId::new().to_string().starts_with("INV-"));
    assert!(ClaimId::new().to_string().starts_with("CLM-"));
    assert!(PayoutId::new().to_string().starts_with("PYT-"));
    assert!(PatientId::new().to_string().starts_with("PAT-"));
}

#[test]
fn parse_accepts_prefixed_and_bare_uuids() {
    let id = InvoiceId::new();

    let from_prefixed: InvoiceId = id.to_string().parse().unwrap();
    assert_eq!(from_prefixed, id);

    let from_bare: InvoiceId = id.as_uuid().to_string().parse().unwrap();
    assert_eq!(from_bare, id);
}

#[test]
fn v7_ids_are_time_ordered() {
    let a = InvoiceId::new_v7();
    let b = InvoiceId::new_v7();
    assert_ne!(a, b);
}

#[test]
fn uuid_round_trip() {
    let uuid = Uuid::new_v4();
    let id = ClaimId::from_uuid(uuid);
    let back: Uuid = id.into();
    assert_eq!(uuid, back);
}
