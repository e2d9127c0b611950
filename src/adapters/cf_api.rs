// Copyright (c) 2025 - Cowboy AI, Inc.

//! Cloud Controller HTTP Adapter
//!
//! Implements the three collaborator traits over the Cloud Controller v2 API
//! and the routing API:
//!
//! ```text
//! DomainApi       → /v2/shared_domains, /v2/private_domains
//! OrganizationApi → /v2/organizations/:guid
//! RouterGroupApi  → /routing/v1/router_groups
//! ```
//!
//! A 404 becomes `ApiError::NotFound`; every other failure becomes
//! `ApiError::Remote` carrying the HTTP status plus the platform
//! `error_code` and `description` when the body has them. No retries happen
//! here.
//!
//! Compiled only with the `cf-api` feature; run its tests with
//! `cargo test --features cf-api`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cim_cf_domain::adapters::{CloudControllerClient, CloudControllerConfig};
//! use cim_cf_domain::{LifecycleManager, ReconcilerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CloudControllerClient::new(CloudControllerConfig::from_env()?)?;
//!     let manager = LifecycleManager::from_control_plane(
//!         Arc::new(client),
//!         ReconcilerConfig::from_env()?,
//!     );
//!     let _ = manager;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{DomainApi, OrganizationApi, RouterGroupApi};
use crate::config::ConfigError;
use crate::domain::{
    DomainEntity, DomainKind, DomainScope, Guid, NewDomain, Organization, RouterBinding,
    RouterGroup, RouterType,
};
use crate::errors::{ApiError, ApiResult, RemoteError, RemoteResource};

/// Connection settings for the Cloud Controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudControllerConfig {
    /// Cloud Controller base URL (e.g., "https://api.sys.example.com")
    pub api_url: String,

    /// Routing API base URL; defaults to `api_url`
    #[serde(default)]
    pub routing_api_url: Option<String>,

    /// OAuth bearer token
    pub access_token: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for CloudControllerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.bosh-lite.com".to_string(),
            routing_api_url: None,
            access_token: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl CloudControllerConfig {
    /// Load from `CF_API_URL`, `CF_ROUTING_API_URL`, `CF_ACCESS_TOKEN` and
    /// `CF_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let required = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Missing(key.to_string()))
        };

        let timeout_secs = match std::env::var("CF_TIMEOUT_SECS") {
            Err(_) => default_timeout(),
            Ok(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "CF_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
        };

        Ok(Self {
            api_url: required("CF_API_URL")?.trim_end_matches('/').to_string(),
            routing_api_url: std::env::var("CF_ROUTING_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim_end_matches('/').to_string()),
            access_token: required("CF_ACCESS_TOKEN")?,
            timeout_secs,
        })
    }

    fn routing_base(&self) -> &str {
        self.routing_api_url.as_deref().unwrap_or(&self.api_url)
    }
}

/// v2 list envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Page<T> {
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default)]
    resources: Vec<Resource<T>>,
}

/// v2 resource envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Resource<T> {
    metadata: Metadata,
    entity: T,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct SharedDomainBody {
    name: String,
    #[serde(default)]
    router_group_guid: Option<String>,
    #[serde(default)]
    router_group_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrivateDomainBody {
    name: String,
    owning_organization_guid: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationBody {
    name: String,
}

#[derive(Debug, Serialize)]
struct CreateSharedDomain<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    router_group_guid: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreatePrivateDomain<'a> {
    name: &'a str,
    owning_organization_guid: &'a str,
}

/// Error body returned by the Cloud Controller
#[derive(Debug, Default, Deserialize)]
struct CfErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl Resource<SharedDomainBody> {
    /// A router group GUID without a known router type is a decode failure
    fn into_entity(self) -> ApiResult<DomainEntity> {
        let router = match (self.entity.router_group_guid, self.entity.router_group_type) {
            (Some(guid), router_type) if !guid.is_empty() => {
                let parsed = router_type.as_deref().and_then(|t| t.parse::<RouterType>().ok());
                let Some(router_type) = parsed else {
                    warn!(
                        "Shared domain {} has router group {} with unusable type {:?}",
                        self.metadata.guid, guid, router_type
                    );
                    return Err(RemoteError::new(format!(
                        "unexpected shared domain payload: router group {} has type {:?}",
                        guid, router_type
                    ))
                    .into());
                };
                Some(RouterBinding {
                    router_group_guid: Guid::new(guid),
                    router_type,
                })
            }
            _ => None,
        };
        Ok(DomainEntity {
            guid: Guid::new(self.metadata.guid),
            name: self.entity.name,
            scope: DomainScope::Shared { router },
        })
    }
}

impl Resource<PrivateDomainBody> {
    fn into_entity(self) -> DomainEntity {
        DomainEntity {
            guid: Guid::new(self.metadata.guid),
            name: self.entity.name,
            scope: DomainScope::Private {
                owning_organization_guid: Guid::new(self.entity.owning_organization_guid),
            },
        }
    }
}

fn collection(kind: DomainKind) -> &'static str {
    match kind {
        DomainKind::Shared => "shared_domains",
        DomainKind::Private => "private_domains",
    }
}

/// HTTP implementation of the domain, router-group and organization APIs
pub struct CloudControllerClient {
    config: CloudControllerConfig,
    client: Client,
}

impl CloudControllerClient {
    /// Build the HTTP client; no request is sent
    pub fn new(config: CloudControllerConfig) -> Result<Self, ConfigError> {
        info!("Using Cloud Controller at {}", config.api_url);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    "Authorization",
                    format!("bearer {}", config.access_token)
                        .parse()
                        .map_err(|e| ConfigError::InvalidValue {
                            key: "CF_ACCESS_TOKEN".to_string(),
                            value: "<redacted>".to_string(),
                            reason: format!("not a valid header value: {}", e),
                        })?,
                );
                headers.insert(
                    "Accept",
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CF_API_URL".to_string(),
                value: config.api_url.clone(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        resource: RemoteResource,
        key: &str,
    ) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::new(format!("{} request failed: {}", resource, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                resource,
                key: key.to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(decode_error(status, &body).into())
    }

    async fn json<T: DeserializeOwned>(response: Response, resource: RemoteResource) -> ApiResult<T> {
        let status = response.status();
        response.json::<T>().await.map_err(|e| {
            ApiError::from(RemoteError::with_status(
                status.as_u16(),
                None,
                format!("unexpected {} payload: {}", resource, e),
            ))
        })
    }

    async fn list_pages<T: DeserializeOwned>(
        &self,
        first: String,
        resource: RemoteResource,
        key: &str,
    ) -> ApiResult<Vec<Resource<T>>> {
        let mut url = Some(first);
        let mut all = Vec::new();

        while let Some(next) = url.take() {
            let response = self
                .send(self.request(Method::GET, &next), resource, key)
                .await?;
            let page: Page<T> = Self::json(response, resource).await?;
            all.extend(page.resources);
            url = page.next_url.map(|path| self.api(&path));
        }
        Ok(all)
    }
}

fn decode_error(status: StatusCode, body: &str) -> RemoteError {
    let parsed: CfErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.error_code.or(parsed.name);
    let message = parsed
        .description
        .or(parsed.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });
    RemoteError::with_status(status.as_u16(), code, message)
}

#[async_trait]
impl DomainApi for CloudControllerClient {
    async fn list_domains(&self, kind: DomainKind, name: &str) -> ApiResult<Vec<DomainEntity>> {
        let resource = RemoteResource::domain(kind);
        let url = self.api(&format!(
            "/v2/{}?q={}",
            collection(kind),
            urlencoding::encode(&format!("name:{}", name))
        ));

        let entities = match kind {
            DomainKind::Shared => self
                .list_pages::<SharedDomainBody>(url, resource, name)
                .await?
                .into_iter()
                .map(Resource::<SharedDomainBody>::into_entity)
                .collect::<ApiResult<Vec<_>>>()?,
            DomainKind::Private => self
                .list_pages::<PrivateDomainBody>(url, resource, name)
                .await?
                .into_iter()
                .map(Resource::<PrivateDomainBody>::into_entity)
                .collect(),
        };
        Ok(entities)
    }

    async fn create_domain(&self, request: &NewDomain) -> ApiResult<DomainEntity> {
        let kind = request.kind();
        let resource = RemoteResource::domain(kind);
        let builder = self.request(Method::POST, &self.api(&format!("/v2/{}", collection(kind))));

        match request {
            NewDomain::Shared {
                name,
                router_group_guid,
            } => {
                let body = CreateSharedDomain {
                    name,
                    router_group_guid: router_group_guid.as_ref().map(Guid::as_str),
                };
                let response = self.send(builder.json(&body), resource, name).await?;
                let created: Resource<SharedDomainBody> = Self::json(response, resource).await?;
                created.into_entity()
            }
            NewDomain::Private {
                name,
                organization_guid,
            } => {
                let body = CreatePrivateDomain {
                    name,
                    owning_organization_guid: organization_guid.as_str(),
                };
                let response = self.send(builder.json(&body), resource, name).await?;
                let created: Resource<PrivateDomainBody> = Self::json(response, resource).await?;
                Ok(created.into_entity())
            }
        }
    }

    async fn get_domain(&self, kind: DomainKind, guid: &Guid) -> ApiResult<DomainEntity> {
        let resource = RemoteResource::domain(kind);
        let url = self.api(&format!(
            "/v2/{}/{}",
            collection(kind),
            urlencoding::encode(guid.as_str())
        ));
        let response = self
            .send(self.request(Method::GET, &url), resource, guid.as_str())
            .await?;

        match kind {
            DomainKind::Shared => {
                let found: Resource<SharedDomainBody> = Self::json(response, resource).await?;
                found.into_entity()
            }
            DomainKind::Private => {
                let found: Resource<PrivateDomainBody> = Self::json(response, resource).await?;
                Ok(found.into_entity())
            }
        }
    }

    async fn delete_domain(&self, kind: DomainKind, guid: &Guid) -> ApiResult<()> {
        let url = self.api(&format!(
            "/v2/{}/{}?async=false",
            collection(kind),
            urlencoding::encode(guid.as_str())
        ));
        self.send(
            self.request(Method::DELETE, &url),
            RemoteResource::domain(kind),
            guid.as_str(),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RouterGroupApi for CloudControllerClient {
    async fn list_router_groups(&self, name: Option<&str>) -> ApiResult<Vec<RouterGroup>> {
        let mut url = format!("{}/routing/v1/router_groups", self.config.routing_base());
        if let Some(name) = name {
            url.push_str("?name=");
            url.push_str(&urlencoding::encode(name));
        }
        let response = self
            .send(
                self.request(Method::GET, &url),
                RemoteResource::RouterGroup,
                name.unwrap_or("*"),
            )
            .await;

        match response {
            Ok(response) => Self::json(response, RemoteResource::RouterGroup).await,
            // The routing API answers an unknown name filter with 404
            Err(ApiError::NotFound { .. }) if name.is_some() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn get_router_group(&self, guid: &Guid) -> ApiResult<RouterGroup> {
        let url = format!(
            "{}/routing/v1/router_groups/{}",
            self.config.routing_base(),
            urlencoding::encode(guid.as_str())
        );
        let response = self
            .send(
                self.request(Method::GET, &url),
                RemoteResource::RouterGroup,
                guid.as_str(),
            )
            .await?;
        Self::json(response, RemoteResource::RouterGroup).await
    }
}

#[async_trait]
impl OrganizationApi for CloudControllerClient {
    async fn get_organization(&self, guid: &Guid) -> ApiResult<Organization> {
        let url = self.api(&format!(
            "/v2/organizations/{}",
            urlencoding::encode(guid.as_str())
        ));
        let response = self
            .send(
                self.request(Method::GET, &url),
                RemoteResource::Organization,
                guid.as_str(),
            )
            .await?;
        let found: Resource<OrganizationBody> =
            Self::json(response, RemoteResource::Organization).await?;
        Ok(Organization {
            guid: Guid::new(found.metadata.guid),
            name: found.entity.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CloudControllerConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.routing_base(), config.api_url);
    }

    #[test]
    fn test_decode_cf_error_body() {
        let err = decode_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":130003,"description":"The domain name is taken: dev.example.com","error_code":"CF-DomainNameTaken"}"#,
        );
        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("CF-DomainNameTaken"));
        assert!(err.message.contains("dev.example.com"));
    }

    #[test]
    fn test_decode_non_json_error_body() {
        let err = decode_error(StatusCode::BAD_GATEWAY, "upstream gone");
        assert_eq!(err.status, Some(502));
        assert_eq!(err.code, None);
        assert_eq!(err.message, "upstream gone");
    }

    #[test]
    fn test_shared_domain_page_decoding() {
        let page: Page<SharedDomainBody> = serde_json::from_str(
            r#"{
                "total_results": 1,
                "next_url": null,
                "resources": [{
                    "metadata": {"guid": "d-1", "url": "/v2/shared_domains/d-1"},
                    "entity": {
                        "name": "tcp-test.example.com",
                        "router_group_guid": "rg-1",
                        "router_group_type": "tcp"
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(page.next_url, None);
        let entity = page
            .resources
            .into_iter()
            .next()
            .unwrap()
            .into_entity()
            .unwrap();
        assert_eq!(entity.name, "tcp-test.example.com");
        assert_eq!(entity.router_type(), Some(RouterType::Tcp));
        assert_eq!(entity.router_group_guid(), Some(&Guid::new("rg-1")));
    }

    #[test]
    fn test_page_with_next_url_decodes() {
        let page: Page<PrivateDomainBody> = serde_json::from_str(
            r#"{
                "total_results": 2,
                "total_pages": 2,
                "next_url": "/v2/private_domains?order-direction=asc&page=2&results-per-page=1",
                "resources": [{
                    "metadata": {"guid": "d-2"},
                    "entity": {"name": "pcfdev-org.io", "owning_organization_guid": "org-guid-123"}
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(
            page.next_url.as_deref(),
            Some("/v2/private_domains?order-direction=asc&page=2&results-per-page=1")
        );
        assert_eq!(page.resources.len(), 1);
        assert_eq!(page.resources[0].metadata.guid, "d-2");

        let empty: Page<SharedDomainBody> = serde_json::from_str(r#"{"next_url": null}"#).unwrap();
        assert!(empty.resources.is_empty());
    }

    #[test]
    fn test_unknown_router_type_is_decode_error() {
        let found: Resource<SharedDomainBody> = serde_json::from_str(
            r#"{
                "metadata": {"guid": "d-3"},
                "entity": {
                    "name": "odd.example.com",
                    "router_group_guid": "rg-9",
                    "router_group_type": "udp"
                }
            }"#,
        )
        .unwrap();

        let err = found.into_entity().unwrap_err();
        assert!(matches!(err, ApiError::Remote(ref e) if e.message.contains("rg-9")));
    }

    #[test]
    fn test_shared_domain_without_router_group() {
        let found: Resource<SharedDomainBody> = serde_json::from_str(
            r#"{
                "metadata": {"guid": "d-4"},
                "entity": {"name": "dev.example.com", "router_group_guid": null}
            }"#,
        )
        .unwrap();

        let entity = found.into_entity().unwrap();
        assert_eq!(entity.router_group_guid(), None);
        assert_eq!(entity.kind(), DomainKind::Shared);
    }

    #[test]
    fn test_private_domain_decoding() {
        let found: Resource<PrivateDomainBody> = serde_json::from_str(
            r#"{
                "metadata": {"guid": "d-2"},
                "entity": {"name": "pcfdev-org.io", "owning_organization_guid": "org-guid-123"}
            }"#,
        )
        .unwrap();

        let entity = found.into_entity();
        assert_eq!(entity.kind(), DomainKind::Private);
        assert_eq!(
            entity.owning_organization_guid(),
            Some(&Guid::new("org-guid-123"))
        );
    }

    #[test]
    fn test_create_body_omits_missing_router_group() {
        let body = serde_json::to_value(CreateSharedDomain {
            name: "dev.example.com",
            router_group_guid: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "dev.example.com"}));
    }
}
