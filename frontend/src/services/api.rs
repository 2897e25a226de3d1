use gloo::net::http::Request;
use serde::Serialize;
use shared::{CancelRequest, ChangeSet, TableData, TransactionRow};

use crate::services::page::PageConfig;

/// Client for the review page endpoint. Data requests and saves all go to
/// the page's own URL.
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    page_url: String,
    csrf_header: String,
    csrf_token: String,
    data_param: (String, String),
}

impl ApiClient {
    pub fn new(page: &PageConfig) -> Self {
        Self {
            page_url: page.editor.page_url.clone(),
            csrf_header: page.editor.csrf_header.clone(),
            csrf_token: page.csrf_token.clone(),
            data_param: page.editor.data_param.clone(),
        }
    }

    /// Get the rows of the review table
    pub async fn get_table_rows(&self) -> Result<Vec<TransactionRow>, String> {
        let (key, value) = &self.data_param;
        match Request::get(&self.page_url)
            .query([(key.as_str(), value.as_str())])
            .send()
            .await
        {
            Ok(response) => {
                if !response.ok() {
                    return Err(format!("Response status: {}", response.status()));
                }
                match response.text().await {
                    Ok(body) => TableData::from_json(&body)
                        .map(TableData::into_rows)
                        .map_err(|e| format!("Failed to parse transactions: {}", e)),
                    Err(e) => Err(format!("Failed to read transactions: {}", e)),
                }
            }
            Err(e) => Err(format!("Failed to fetch transactions: {}", e)),
        }
    }

    /// Submit edited categories and deleted rows. Returns the URL to go to.
    pub async fn confirm_changes(&self, changes: &ChangeSet) -> Result<String, String> {
        self.post(changes).await
    }

    /// Abandon the pending upload. Returns the URL to go to.
    pub async fn cancel_changes(&self) -> Result<String, String> {
        self.post(&CancelRequest::default()).await
    }

    async fn post<T: Serialize>(&self, body: &T) -> Result<String, String> {
        match Request::post(&self.page_url)
            .header(&self.csrf_header, &self.csrf_token)
            .json(body)
            .map_err(|e| format!("Failed to serialize request: {}", e))?
            .send()
            .await
        {
            Ok(response) => {
                if response.ok() {
                    Ok(response.url())
                } else {
                    Err(format!("Response status: {}", response.status()))
                }
            }
            Err(e) => Err(format!("Network error: {}", e)),
        }
    }
}
