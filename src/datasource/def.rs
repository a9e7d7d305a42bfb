//! 数据源定义

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// 是否携带请求体
    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// 请求描述，`params` 收纳其余实现相关字段（data / headers / mock ...）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub params: Map<String, JsonValue>,
}

impl RequestOptions {
    pub fn get(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn param(&self, name: &str) -> Option<&JsonValue> {
        self.params.get(name)
    }
}

/// 期望的响应字段，只用于绑定提示与展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseField {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub options: RequestOptions,
    #[serde(default)]
    pub response_fields: Vec<ResponseField>,
}

impl DataSourceDef {
    pub fn new(id: &str, options: RequestOptions) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            options,
            response_fields: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_field(mut self, name: &str, field_type: &str) -> Self {
        self.response_fields.push(ResponseField {
            name: name.to_string(),
            field_type: field_type.to_string(),
        });
        self
    }

    /// 面板展示名，没有 label 时用 id
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// 可绑定路径，如 `ds1.name`
    pub fn binding_paths(&self) -> Vec<String> {
        self.response_fields
            .iter()
            .map(|f| format!("{}.{}", self.id, f.name))
            .collect()
    }
}
