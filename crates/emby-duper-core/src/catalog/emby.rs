use std::thread::sleep;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{detect_library_kind, Catalog};
use crate::config::AppConfig;
use crate::error::Error;
use crate::model::Library;

const TOKEN_HEADER: &str = "X-Emby-Token";
const ITEM_FIELDS: &str = "Path,MediaSources";

#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "ServerName", default)]
    pub server_name: String,
    #[serde(rename = "Version", default)]
    pub version: String,
}

#[derive(Debug, Deserialize)]
struct MediaFolders {
    #[serde(rename = "Items", default)]
    items: Vec<MediaFolder>,
}

#[derive(Debug, Deserialize)]
struct MediaFolder {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "CollectionType")]
    collection_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    #[serde(rename = "Items", default)]
    items: Vec<Value>,
    #[serde(rename = "TotalRecordCount")]
    total_record_count: Option<usize>,
}

/// Blocking client for the Emby REST API.
///
/// Every request is retried on transport errors and 5xx responses, up to
/// `max_attempts` in total, with exponential backoff. 4xx responses fail at once.
pub struct EmbyClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_size: u32,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl EmbyClient {
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            page_size: config.page_size.max(1),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    pub fn system_info(&self) -> Result<SystemInfo, Error> {
        self.get_json(&self.url("System/Info"), &[])
    }

    fn url(&self, path: &str) -> String {
        format!("{}/emby/{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, Error> {
        let response = self.send_with_retry(|| self.client.get(url).query(query))?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn send_with_retry<F>(&self, build: F) -> Result<Response, Error>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            let failure = match build().header(TOKEN_HEADER, &self.api_key).send() {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let failure = Error::Api {
                        url: response.url().to_string(),
                        status: response.status().as_u16(),
                    };
                    if !response.status().is_server_error() {
                        return Err(failure);
                    }
                    failure
                }
                Err(e) => Error::Http(e),
            };

            attempt += 1;
            if attempt >= self.max_attempts {
                return Err(failure);
            }
            let backoff = backoff_delay(self.retry_backoff, attempt);
            warn!(
                "Request failed (attempt {}/{}): {}; retrying in {:?}",
                attempt, self.max_attempts, failure, backoff
            );
            sleep(backoff);
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`, saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

impl Catalog for EmbyClient {
    fn libraries(&self) -> Result<Vec<Library>, Error> {
        let folders: MediaFolders = self.get_json(&self.url("Library/MediaFolders"), &[])?;
        Ok(folders
            .items
            .into_iter()
            .map(|folder| Library {
                kind: detect_library_kind(folder.collection_type.as_deref(), &folder.name),
                id: folder.id,
                name: folder.name,
            })
            .collect())
    }

    fn library_items(
        &self,
        library: &Library,
        on_page: &dyn Fn(usize, Option<usize>),
    ) -> Result<Vec<Value>, Error> {
        let url = self.url("Items");
        let limit = self.page_size.to_string();
        let mut records: Vec<Value> = Vec::new();

        loop {
            let start_index = records.len().to_string();
            let page: ItemsPage = self.get_json(
                &url,
                &[
                    ("ParentId", library.id.as_str()),
                    ("Recursive", "true"),
                    ("IncludeItemTypes", library.kind.include_item_types()),
                    ("Fields", ITEM_FIELDS),
                    ("StartIndex", start_index.as_str()),
                    ("Limit", limit.as_str()),
                ],
            )?;

            let fetched = page.items.len();
            records.extend(page.items);
            on_page(records.len(), page.total_record_count);
            debug!(
                "Fetched {} records from '{}' (start index {})",
                fetched, library.name, start_index
            );

            let reached_total = page
                .total_record_count
                .is_some_and(|total| records.len() >= total);
            if fetched == 0 || fetched < self.page_size as usize || reached_total {
                break;
            }
        }

        Ok(records)
    }

    fn delete_item(&self, item_id: &str) -> Result<(), Error> {
        let url = self.url(&format!("Items/{}", item_id));
        self.send_with_retry(|| self.client.delete(&url))?;
        Ok(())
    }
}
