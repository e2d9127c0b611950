// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Domain Names

use cim_cf_domain::domain::{DomainName, DomainNameError};
use proptest::prelude::*;

fn valid_name() -> impl Strategy<Value = String> {
    (
        prop::collection::vec("[a-zA-Z0-9]([a-zA-Z0-9-]{0,20}[a-zA-Z0-9])?", 1..4),
        "[a-zA-Z]{2,8}",
    )
        .prop_map(|(labels, tld)| format!("{}.{}", labels.join("."), tld))
}

proptest! {
    #[test]
    fn canonicalization_is_idempotent(raw in valid_name()) {
        let once = DomainName::new(raw.as_str()).unwrap();
        let twice = DomainName::new(once.as_str()).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.as_str(), raw.to_ascii_lowercase());
    }

    #[test]
    fn split_then_join_is_identity(raw in valid_name()) {
        let name = DomainName::new(raw).unwrap();
        let (sub, domain) = name.split_first();
        prop_assert!(!sub.contains('.'));
        prop_assert_eq!(DomainName::join(sub, domain).unwrap(), name.clone());
    }

    #[test]
    fn underscores_are_rejected(prefix in "[a-z]{1,8}", suffix in "[a-z]{1,8}") {
        let raw = format!("{}_{}.example.com", prefix, suffix);
        prop_assert_eq!(DomainName::new(raw), Err(DomainNameError::InvalidCharacter('_')));
    }

    #[test]
    fn oversized_labels_are_rejected(label in "[a-z]{64,80}") {
        let raw = format!("{}.example.com", label);
        prop_assert!(matches!(DomainName::new(raw), Err(DomainNameError::LabelTooLong(_))));
    }
}
