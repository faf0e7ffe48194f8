//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{render_cell, Sheet, TokenProvider, Worksheet};
use crate::error::{Error, ErrorType};
use crate::{Config, Result};
use serde_json::Value;
use sheets::types::{
    DateTimeRenderOption, Dimension, InsertDataOption, Spreadsheet, ValueInputOption, ValueRange,
    ValueRenderOption,
};
use sheets::ClientError;
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// Implements the `Sheet` trait with a `sheets::Client`. A client is created for each call with a
/// token from the `TokenProvider`, which caches tokens until shortly before they expire.
pub(crate) struct GoogleSheet {
    spreadsheet_id: String,
    timeout: Duration,
    token_provider: TokenProvider,
}

impl GoogleSheet {
    pub(crate) fn new(config: &Config, token_provider: TokenProvider) -> Self {
        Self {
            spreadsheet_id: config.spreadsheet_id().to_string(),
            timeout: config.timeout(),
            token_provider,
        }
    }

    async fn client(&self) -> Result<sheets::Client> {
        let access_token = self.token_provider.token().await?;
        // Only the access token is used; the oauth fields of the client stay empty.
        Ok(sheets::Client::new(
            String::new(),
            String::new(),
            String::new(),
            access_token,
            String::new(),
        ))
    }

    /// Awaits one API call, bounded by the configured timeout.
    async fn call<T, F>(&self, what: &str, request: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ClientError>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(response) => response.map_err(|e| client_error(e, what, &self.spreadsheet_id)),
            Err(_) => Err(Error::msg(
                ErrorType::Service,
                format!(
                    "Timed out after {:?} trying to {what} (spreadsheet {})",
                    self.timeout, self.spreadsheet_id
                ),
            )),
        }
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn worksheet(&self) -> Result<Worksheet> {
        trace!("worksheet for {}", self.spreadsheet_id);
        let client = self.client().await?;
        let response = self
            .call(
                "open the spreadsheet",
                client.spreadsheets().get(&self.spreadsheet_id, false, &[]),
            )
            .await?;
        first_worksheet(response.body, &self.spreadsheet_id)
    }

    async fn get_values(&self) -> Result<Vec<Vec<String>>> {
        let range = self.worksheet().await?.all_cells();
        trace!("get_values for {range}");
        let client = self.client().await?;
        let response = self
            .call(
                "read the sheet",
                client.spreadsheets().values_get(
                    &self.spreadsheet_id,
                    &range,
                    DateTimeRenderOption::FormattedString,
                    Dimension::Rows,
                    ValueRenderOption::FormattedValue,
                ),
            )
            .await?;
        Ok(response.body.values)
    }

    async fn append_row(&self, row: Vec<Value>) -> Result<()> {
        let range = self.worksheet().await?.table_start();
        trace!("append_row to {range}");
        let body = ValueRange {
            major_dimension: Some(Dimension::Rows),
            range: range.clone(),
            values: vec![row.iter().map(render_cell).collect()],
        };
        let client = self.client().await?;
        let _ = self
            .call(
                "append the row",
                client.spreadsheets().values_append(
                    &self.spreadsheet_id,
                    &range,
                    false,
                    InsertDataOption::InsertRows,
                    DateTimeRenderOption::FormattedString,
                    ValueRenderOption::FormattedValue,
                    ValueInputOption::Raw,
                    &body,
                ),
            )
            .await?;
        Ok(())
    }
}

/// The worksheet with the lowest index is the first tab of the spreadsheet.
fn first_worksheet(spreadsheet: Spreadsheet, spreadsheet_id: &str) -> Result<Worksheet> {
    let spreadsheet_title = spreadsheet
        .properties
        .map(|properties| properties.title)
        .unwrap_or_default();
    let tabs = spreadsheet
        .sheets
        .into_iter()
        .filter_map(|sheet| sheet.properties)
        .map(|properties| (properties.index, properties.title));
    pick_first(spreadsheet_title, tabs, spreadsheet_id)
}

fn pick_first(
    spreadsheet_title: String,
    tabs: impl IntoIterator<Item = (i64, String)>,
    spreadsheet_id: &str,
) -> Result<Worksheet> {
    tabs.into_iter()
        .min_by_key(|(index, _)| *index)
        .map(|(_, title)| Worksheet {
            spreadsheet_title,
            title,
        })
        .ok_or_else(|| {
            Error::msg(
                ErrorType::NotFound,
                format!("The spreadsheet {spreadsheet_id} has no worksheets"),
            )
        })
}

/// Maps a failed call to an `Error`. Google answers 403 or 404 when the spreadsheet does not
/// exist or is not shared with the service account.
fn client_error(e: ClientError, what: &str, spreadsheet_id: &str) -> Error {
    let error_type = match &e {
        ClientError::HttpError { status, .. } => status_error_type(status.as_u16()),
        _ => ErrorType::Service,
    };
    let inner =
        anyhow::Error::new(e).context(format!("Failed to {what} (spreadsheet {spreadsheet_id})"));
    Error::new(error_type, inner)
}

fn status_error_type(status: u16) -> ErrorType {
    match status {
        401 => ErrorType::Auth,
        403 | 404 => ErrorType::NotFound,
        _ => ErrorType::Service,
    }
}
