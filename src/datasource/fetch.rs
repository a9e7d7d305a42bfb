//! 数据源加载 - 在渲染之外执行请求，结果写入 ResolutionStore

use super::{DataSourceCatalog, DataSourceDef, Resolution, ResolutionStore};
use crate::expr::json_to_string;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// HTTP 数据源加载器（阻塞）
///
/// `options` 中的约定字段：
/// - `data`: GET/DELETE 作为查询参数，POST/PUT 作为 JSON 请求体
/// - `headers`: 请求头
/// - `mock`: 存在时直接作为结果，不发请求
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn fetch(&self, def: &DataSourceDef) -> Resolution {
        let options = &def.options;
        if let Some(mock) = options.param("mock") {
            return Resolution::Value(mock.clone());
        }
        if options.url.is_empty() {
            return Resolution::Error(format!("data source `{}` has no url", def.id));
        }

        log::debug!("fetch {} {} {}", def.id, options.method.as_str(), options.url);
        let mut request = ureq::request(options.method.as_str(), &options.url).timeout(self.timeout);

        if let Some(JsonValue::Object(headers)) = options.param("headers") {
            for (name, value) in headers {
                request = request.set(name, &json_to_string(value));
            }
        }

        let data = options.param("data");
        let response = if options.method.has_body() {
            request.send_json(data.cloned().unwrap_or(JsonValue::Null))
        } else {
            if let Some(JsonValue::Object(query)) = data {
                for (name, value) in query {
                    request = request.query(name, &json_to_string(value));
                }
            }
            request.call()
        };

        match response {
            Ok(resp) => match resp.into_json::<JsonValue>() {
                Ok(value) => Resolution::Value(value),
                Err(e) => Resolution::Error(format!("invalid response body: {}", e)),
            },
            Err(ureq::Error::Status(code, _)) => Resolution::Error(format!("HTTP {}", code)),
            Err(e) => Resolution::Error(e.to_string()),
        }
    }

    /// 加载页面生效的全部数据源，返回失败个数
    pub fn refresh(&self, catalog: &DataSourceCatalog, page: &str, store: &mut ResolutionStore) -> usize {
        let mut failed = 0;
        for (scope, def) in catalog.scoped_sources(page) {
            let resolution = self.fetch(def);
            if let Resolution::Error(e) = &resolution {
                log::warn!("data source `{}` failed: {}", def.id, e);
                failed += 1;
            }
            store.apply(&scope, &def.id, resolution);
        }
        log::info!("refreshed data sources for page `{}` ({} failed)", page, failed);
        failed
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
