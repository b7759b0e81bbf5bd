//! CloudFormation custom-resource lifecycle payloads, as delivered by the CDK provider framework.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PHYSICAL_RESOURCE_ID: &str = "telegram-webhook";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceRequest {
    pub request_type: RequestType,
    pub service_token: String,
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    /// Some stacks pass the URL at the top level instead of inside the properties
    pub webhook_url: Option<String>,
}

impl CustomResourceRequest {
    pub fn webhook_url(&self) -> Option<&str> {
        self.resource_properties
            .webhook_url
            .as_deref()
            .or(self.webhook_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn physical_resource_id(&self) -> String {
        self.physical_resource_id
            .clone()
            .unwrap_or_else(|| DEFAULT_PHYSICAL_RESOURCE_ID.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomResourceStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: CustomResourceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
}

impl CustomResourceResponse {
    pub fn success(physical_resource_id: String, data: BTreeMap<String, String>) -> Self {
        Self {
            status: CustomResourceStatus::Success,
            reason: None,
            physical_resource_id,
            data: Some(data),
        }
    }

    pub fn failed(physical_resource_id: String, reason: impl Into<String>) -> Self {
        Self {
            status: CustomResourceStatus::Failed,
            reason: Some(reason.into()),
            physical_resource_id,
            data: None,
        }
    }
}
