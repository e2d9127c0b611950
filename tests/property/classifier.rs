// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Spec Classification
//!
//! Classification is pure: kind depends only on `org`, the canonical name
//! only on the name fields, and contradictory specs are always rejected.

use cim_cf_domain::{classify, DomainError, DomainKind, DomainSpec};
use proptest::prelude::*;

fn label() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9-]{0,12}[a-zA-Z0-9]"
}

fn parent_domain() -> impl Strategy<Value = String> {
    (prop::collection::vec(label(), 1..3), "[a-z]{2,6}")
        .prop_map(|(labels, tld)| format!("{}.{}", labels.join("."), tld))
}

fn org() -> impl Strategy<Value = Option<String>> {
    prop::option::of("org-[a-z0-9]{4,12}")
}

proptest! {
    #[test]
    fn parts_form_joins_lower_cased(sub in label(), domain in parent_domain(), org in org()) {
        let spec = DomainSpec {
            org: org.clone(),
            ..DomainSpec::shared(sub.clone(), domain.clone())
        };

        let classified = classify(&spec).unwrap();

        prop_assert_eq!(
            classified.name.as_str(),
            format!("{}.{}", sub, domain).to_ascii_lowercase()
        );
        prop_assert_eq!(classified.sub_domain, sub.to_ascii_lowercase());
        prop_assert_eq!(classified.domain, domain.to_ascii_lowercase());
    }

    #[test]
    fn kind_is_private_iff_org(sub in label(), domain in parent_domain(), org in org()) {
        let name = format!("{}.{}", sub, domain);
        let spec = DomainSpec {
            name: Some(name),
            org: org.clone(),
            ..DomainSpec::default()
        };

        let expected = if org.is_some() { DomainKind::Private } else { DomainKind::Shared };
        prop_assert_eq!(classify(&spec).unwrap().kind, expected);
    }

    #[test]
    fn name_form_split_rejoins(sub in label(), domain in parent_domain()) {
        let spec = DomainSpec {
            name: Some(format!("{}.{}", sub, domain)),
            ..DomainSpec::default()
        };

        let classified = classify(&spec).unwrap();
        prop_assert_eq!(
            format!("{}.{}", classified.sub_domain, classified.domain),
            classified.name.as_str()
        );
        prop_assert!(classified.name.is_joined_from(&classified.sub_domain, &classified.domain));
    }

    #[test]
    fn org_with_router_group_always_rejected(
        sub in label(),
        domain in parent_domain(),
        org in "org-[a-z0-9]{4,12}",
        router_group in "[a-z-]{3,16}",
    ) {
        let spec = DomainSpec {
            org: Some(org),
            ..DomainSpec::shared(sub, domain).with_router_group(router_group)
        };
        prop_assert!(matches!(classify(&spec), Err(DomainError::InvalidSpec(_))));
    }

    #[test]
    fn both_name_forms_always_rejected(sub in label(), domain in parent_domain(), org in org()) {
        let spec = DomainSpec {
            name: Some(format!("{}.{}", sub, domain)),
            org,
            ..DomainSpec::shared(sub.clone(), domain.clone())
        };
        prop_assert!(matches!(classify(&spec), Err(DomainError::InvalidSpec(_))));
    }

    #[test]
    fn classification_is_deterministic(sub in label(), domain in parent_domain(), org in org()) {
        let spec = DomainSpec {
            org,
            ..DomainSpec::shared(sub, domain)
        };
        prop_assert_eq!(classify(&spec).unwrap(), classify(&spec).unwrap());
    }
}
