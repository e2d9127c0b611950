// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declared domain specification and its classification
//!
//! [`classify`] is pure: it decides the remote kind and the canonical name
//! without touching the control plane.

use serde::{Deserialize, Serialize};

use super::entity::DomainKind;
use super::name::DomainName;
use crate::errors::{DomainError, DomainResult};

/// Desired state for one domain resource, as produced by the config parser
///
/// Empty strings are treated the same as absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSpec {
    /// Fully qualified name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Left-most label(s), combined with `domain`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_domain: Option<String>,

    /// Fully qualified parent domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Owning organization GUID; makes the domain private
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,

    /// Router group GUID or name; makes the domain a shared TCP domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_group: Option<String>,
}

impl DomainSpec {
    /// Shared domain from a sub-domain and parent
    pub fn shared(sub_domain: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            sub_domain: Some(sub_domain.into()),
            domain: Some(domain.into()),
            ..Self::default()
        }
    }

    /// Private domain from a fully qualified name
    pub fn private(name: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            org: Some(org.into()),
            ..Self::default()
        }
    }

    /// Attach a router group
    pub fn with_router_group(mut self, router_group: impl Into<String>) -> Self {
        self.router_group = Some(router_group.into());
        self
    }

    pub fn org(&self) -> Option<&str> {
        present(&self.org)
    }

    pub fn router_group(&self) -> Option<&str> {
        present(&self.router_group)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Outcome of classifying a [`DomainSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDomain {
    pub kind: DomainKind,
    pub name: DomainName,
    /// Sub-domain as declared, or the first label of `name`
    pub sub_domain: String,
    /// Parent domain as declared, or everything after the first label
    pub domain: String,
}

/// Decide kind and canonical name for a spec
pub fn classify(spec: &DomainSpec) -> DomainResult<ClassifiedDomain> {
    let name = present(&spec.name);
    let sub_domain = present(&spec.sub_domain);
    let domain = present(&spec.domain);
    let org = spec.org();
    let router_group = spec.router_group();

    if org.is_some() && router_group.is_some() {
        return Err(DomainError::invalid_spec(
            "'org' and 'router_group' are mutually exclusive: private domains cannot use a router group",
        ));
    }

    let kind = if org.is_some() {
        DomainKind::Private
    } else {
        DomainKind::Shared
    };

    match (name, sub_domain, domain) {
        (Some(name), None, None) => {
            let canonical = DomainName::new(name)
                .map_err(|e| DomainError::invalid_spec(format!("name '{}': {}", name, e)))?;
            let (sub_domain, domain) = canonical.split_first();
            Ok(ClassifiedDomain {
                kind,
                sub_domain: sub_domain.to_string(),
                domain: domain.to_string(),
                name: canonical,
            })
        }
        (None, Some(sub_domain), Some(domain)) => {
            let canonical = DomainName::join(sub_domain, domain).map_err(|e| {
                DomainError::invalid_spec(format!(
                    "sub_domain '{}' + domain '{}': {}",
                    sub_domain, domain, e
                ))
            })?;
            Ok(ClassifiedDomain {
                kind,
                name: canonical,
                sub_domain: sub_domain.to_ascii_lowercase(),
                domain: domain.to_ascii_lowercase(),
            })
        }
        (Some(_), _, _) => Err(DomainError::invalid_spec(
            "'name' cannot be combined with 'sub_domain' or 'domain'",
        )),
        (None, None, None) => Err(DomainError::invalid_spec(
            "either 'name' or both 'sub_domain' and 'domain' must be set",
        )),
        (None, _, _) => Err(DomainError::invalid_spec(
            "'sub_domain' and 'domain' must be set together",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn spec(
        name: Option<&str>,
        sub_domain: Option<&str>,
        domain: Option<&str>,
        org: Option<&str>,
        router_group: Option<&str>,
    ) -> DomainSpec {
        DomainSpec {
            name: name.map(String::from),
            sub_domain: sub_domain.map(String::from),
            domain: domain.map(String::from),
            org: org.map(String::from),
            router_group: router_group.map(String::from),
        }
    }

    #[test_case(spec(None, Some("dev"), Some("example.com"), None, None), DomainKind::Shared, "dev.example.com" ; "shared from parts")]
    #[test_case(spec(None, Some("tcp-test"), Some("example.com"), None, Some("default-tcp")), DomainKind::Shared, "tcp-test.example.com" ; "shared tcp")]
    #[test_case(spec(Some("pcfdev-org.io"), None, None, Some("org-guid-123"), None), DomainKind::Private, "pcfdev-org.io" ; "private from name")]
    #[test_case(spec(Some("apps.example.com"), None, None, None, None), DomainKind::Shared, "apps.example.com" ; "shared from name")]
    #[test_case(spec(None, Some("team"), Some("example.com"), Some("org-1"), None), DomainKind::Private, "team.example.com" ; "private from parts")]
    #[test_case(spec(Some("Apps.Example.COM"), Some(""), Some(""), None, None), DomainKind::Shared, "apps.example.com" ; "empty strings are unset")]
    fn test_classify_ok(spec: DomainSpec, kind: DomainKind, name: &str) {
        let classified = classify(&spec).unwrap();
        assert_eq!(classified.kind, kind);
        assert_eq!(classified.name.as_str(), name);
    }

    #[test_case(spec(Some("a.example.com"), Some("a"), Some("example.com"), None, None) ; "name and parts")]
    #[test_case(spec(Some("a.example.com"), None, Some("example.com"), None, None) ; "name and domain")]
    #[test_case(spec(None, None, None, None, None) ; "nothing")]
    #[test_case(spec(None, Some("a"), None, None, None) ; "sub domain only")]
    #[test_case(spec(None, None, Some("example.com"), None, None) ; "domain only")]
    #[test_case(spec(Some("x.example.com"), None, None, Some("org"), Some("rg")) ; "org and router group")]
    #[test_case(spec(Some("localhost"), None, None, None, None) ; "single label")]
    #[test_case(spec(None, Some("bad_label"), Some("example.com"), None, None) ; "invalid label")]
    fn test_classify_invalid(spec: DomainSpec) {
        assert!(matches!(classify(&spec), Err(DomainError::InvalidSpec(_))));
    }

    #[test]
    fn test_name_form_computes_parts() {
        let classified = classify(&DomainSpec::private("pcfdev-org.io", "org-guid-123")).unwrap();
        assert_eq!(classified.sub_domain, "pcfdev-org");
        assert_eq!(classified.domain, "io");
    }

    #[test]
    fn test_parts_form_keeps_declared_split() {
        let classified = classify(&DomainSpec::shared("a.b", "example.com")).unwrap();
        assert_eq!(classified.name.as_str(), "a.b.example.com");
        assert_eq!(classified.sub_domain, "a.b");
        assert_eq!(classified.domain, "example.com");
    }

    #[test]
    fn test_spec_deserializes_from_config() {
        let spec: DomainSpec =
            serde_json::from_str(r#"{"sub_domain":"dev","domain":"example.com"}"#).unwrap();
        assert_eq!(spec, DomainSpec::shared("dev", "example.com"));
    }
}
