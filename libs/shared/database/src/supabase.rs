use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// Client that sends the service-role key as `apikey`, bypassing RLS for admin reads.
    pub fn for_service_role(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            api_key: config.read_key().to_string(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        let response = self.send(method, path, auth_token, body, None).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    async fn send(&self, method: Method, path: &str,
                  auth_token: Option<&str>, body: Option<Value>,
                  extra_headers: Option<HeaderMap>)
                  -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    /// Reads every row behind a PostgREST `GET` path by walking `limit`/`offset`
    /// pages. The path should carry an `order=` clause so pages are stable.
    ///
    /// The server may cap a page below `page_size` (`max-rows`), so the exact
    /// count from `Content-Range` decides when to stop. Without a count, a short
    /// page ends the walk.
    pub async fn fetch_all<T>(&self, path: &str, page_size: usize,
                              auth_token: Option<&str>) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let page_size = page_size.max(1);
        let separator = if path.contains('?') { '&' } else { '?' };

        let mut count_header = HeaderMap::new();
        count_header.insert("Prefer", HeaderValue::from_static("count=exact"));

        let mut rows = Vec::new();
        let mut offset = 0usize;

        loop {
            let page_path = format!("{}{}limit={}&offset={}", path, separator, page_size, offset);
            let response = self
                .send(Method::GET, &page_path, auth_token, None, Some(count_header.clone()))
                .await?;
            let total = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|value| value.to_str().ok())
                .and_then(total_from_content_range);

            let page: Vec<T> = response.json().await?;
            let fetched = page.len();
            rows.extend(page);
            offset += fetched;

            let done = match total {
                Some(total) => fetched == 0 || offset >= total,
                None => fetched < page_size,
            };
            if done {
                break;
            }
        }

        debug!("Fetched {} rows from {}", rows.len(), path);
        Ok(rows)
    }
}

/// `0-999/4210` -> 4210. `*` (count not requested) yields `None`.
fn total_from_content_range(range: &str) -> Option<usize> {
    range.rsplit_once('/')?.1.trim().parse().ok()
}
