use crate::error::AppError;
use crate::profile::column_summary;
use crate::table::SpreadsheetTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// Rows expanded in full inside the prompt document
const SAMPLE_ROWS: usize = 5;

/// Ceiling on one collaborator round trip, connection included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Where an insight's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    /// Produced by the external AI collaborator
    Ai,
    /// Locally synthesized after the collaborator failed
    Fallback,
}

/// One question/answer pair in the session's insight list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    #[serde(rename = "queryText")]
    pub query_text: String,
    #[serde(rename = "responseText")]
    pub response_text: String,
    pub timestamp: DateTime<Utc>,
    pub source: InsightSource,
}

/// Analysis category, chosen explicitly by the caller
///
/// The presets carry fixed prompt texts; free-form questions use `Custom`.
/// Selecting the category up front replaces the substring sniffing the
/// fallback generator would otherwise need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum PromptKind {
    Summary,
    Trend,
    Recommendation,
    Insight,
    Custom(String),
}

impl PromptKind {
    /// The prompt text sent to the collaborator
    pub fn prompt_text(&self) -> String {
        match self {
            PromptKind::Summary => "Provide a comprehensive summary of this dataset including \
                 key statistics, data types, and overall structure."
                .to_string(),
            PromptKind::Trend => "Identify trends, patterns, and correlations in this data. \
                 What insights can you derive?"
                .to_string(),
            PromptKind::Recommendation => {
                "Based on this data, what actionable recommendations would you provide?"
                    .to_string()
            }
            PromptKind::Insight => {
                "What are the most interesting and valuable insights from this dataset?"
                    .to_string()
            }
            PromptKind::Custom(text) => text.clone(),
        }
    }
}

/// Build the bounded text document that is the collaborator's entire context
///
/// Dataset name, row/column counts, the header list, up to five fully
/// expanded sample rows, and a per-column sample profile (shared verbatim
/// with the sidebar stats). There is no chunking or retrieval beyond this.
pub fn prompt_document(table: &SpreadsheetTable, dataset_name: &str) -> String {
    let mut doc = format!(
        "Dataset: {}\nColumns: {}\nRows: {}\n\nHeaders: {}\n\nSample Data:\n",
        dataset_name,
        table.column_count(),
        table.row_count(),
        table.headers.join(", ")
    );

    for (index, row) in table.rows.iter().take(SAMPLE_ROWS).enumerate() {
        doc.push_str(&format!("Row {}: ", index + 1));
        for header in &table.headers {
            let shown = row.get(header).map(|v| v.display()).unwrap_or_default();
            doc.push_str(&format!("{}: {}, ", header, shown));
        }
        doc.push('\n');
    }

    doc.push_str("\nData Types:\n");
    for header in &table.headers {
        doc.push_str(&format!("{}: {}\n", header, column_summary(table, header)));
    }

    doc
}

/// Deterministic offline response used when the collaborator fails
///
/// The wording varies by category and interpolates real dataset statistics,
/// hedged so it never claims more than the bounded sample supports.
pub fn fallback_response(kind: &PromptKind, table: &SpreadsheetTable) -> String {
    let rows = table.row_count();
    let cols = table.column_count();
    let header = |i: usize| -> &str {
        table
            .headers
            .get(i)
            .map(String::as_str)
            .unwrap_or("the first column")
    };
    let key_columns = table
        .headers
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    match kind {
        PromptKind::Summary => format!(
            "**Data Summary (offline)**\n\nThe dataset contains {} rows with {} columns. \
             Key columns: {}. Sampled values in \"{}\": {}. These figures come from a \
             bounded sample of the data and may not reflect the full dataset.",
            rows,
            cols,
            key_columns,
            header(0),
            column_summary(table, header(0)),
        ),
        PromptKind::Trend => format!(
            "**Trend Analysis (offline)**\n\nAcross the sampled rows, column \"{}\" may show \
             recurring patterns; charting it against \"{}\" could make any trend visible. \
             A complete pass over all {} rows is needed before drawing conclusions.",
            header(0),
            header(1),
            rows,
        ),
        PromptKind::Recommendation => format!(
            "**Recommendations (offline)**\n\n1. Clean missing values before further analysis\n\
             2. Explore the relationship between \"{}\" and \"{}\"\n\
             3. Segment the {} rows by key categorical columns",
            header(1),
            header(2),
            rows,
        ),
        PromptKind::Insight => format!(
            "**Key Insights (offline)**\n\nThe dataset spans {} rows and {} columns. Sampled \
             values in \"{}\" include: {}. Only the leading rows were inspected, so treat \
             these as starting points rather than findings.",
            rows,
            cols,
            header(0),
            column_summary(table, header(0)),
        ),
        PromptKind::Custom(_) => format!(
            "**Offline response**\n\nThe AI collaborator was unreachable, so this note was \
             generated locally: the dataset has {} rows and {} columns ({}). Re-run the \
             question once the service is available.",
            rows, cols, key_columns,
        ),
    }
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct InferenceResponse {
    generated_text: String,
}

#[derive(Deserialize)]
struct InferenceError {
    error: String,
}

/// HTTP client for the external AI collaborator
///
/// The collaborator is an opaque endpoint that takes a prompt and returns a
/// text blob; generation length and temperature are bounded on every call.
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl InsightClient {
    /// Build a client with a bounded per-request timeout
    ///
    /// A hung collaborator must fail the request (and release any caller
    /// state tied to it) rather than wait for the connection's lifetime.
    pub fn new(api_url: String, api_key: String) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal("insight client construction", e))?;
        Ok(InsightClient {
            http,
            api_url,
            api_key,
        })
    }

    /// Ask the collaborator to analyze `document` under `kind`'s prompt
    ///
    /// Returns the generated text, or an `ExternalService` error on any
    /// network failure or non-success response. The caller is responsible
    /// for recovering with [`fallback_response`].
    pub async fn analyze(
        &self,
        document: &str,
        kind: &PromptKind,
    ) -> Result<String, AppError> {
        let inputs = format!(
            "<|system|>You are a helpful data analyst.</s>\n\
             <|user|>Analyze this dataset and {}:\n\n{}\n\n\
             Provide response with:\n1. Key findings\n2. Trends\n3. Recommendations</s>\n\
             <|assistant|>",
            kind.prompt_text(),
            document
        );

        let request = InferenceRequest {
            inputs,
            parameters: InferenceParameters {
                max_new_tokens: 1000,
                temperature: 0.7,
            },
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::warn!("AI collaborator unreachable: {}", e);
                AppError::ExternalService("AI service is unreachable".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<InferenceError>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| "API request failed".to_string());
            log::warn!("AI collaborator returned {}: {}", status, detail);
            return Err(AppError::ExternalService(detail));
        }

        let body: Vec<InferenceResponse> = response.json().await.map_err(|e| {
            log::warn!("AI collaborator sent an unreadable body: {}", e);
            AppError::ExternalService("AI service returned an invalid response".to_string())
        })?;

        Ok(body
            .into_iter()
            .next()
            .map(|r| r.generated_text)
            .unwrap_or_else(|| "No response generated.".to_string()))
    }
}

/// One client session's insight list with an in-flight flag
///
/// Insights are kept most-recent-first and never persisted server-side.
/// Each client session gets its own instance (see [`SessionRegistry`]), so
/// the flag only guards duplicate submissions from that client's control,
/// not the service as a whole. Prefer [`InFlightGuard`] over calling
/// `begin`/`finish` directly; the guard clears the flag even when the
/// request future is dropped mid-await.
#[derive(Debug, Default)]
pub struct InsightSession {
    insights: Vec<Insight>,
    in_flight: bool,
}

impl InsightSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a request as in flight; refuses concurrent duplicates
    pub fn begin(&mut self) -> Result<(), AppError> {
        if self.in_flight {
            return Err(AppError::Validation(
                "An analysis is already running".to_string(),
            ));
        }
        self.in_flight = true;
        Ok(())
    }

    /// Clear the in-flight flag once the request settles
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Prepend a new insight and return a reference to it
    pub fn record(
        &mut self,
        query_text: String,
        response_text: String,
        source: InsightSource,
    ) -> &Insight {
        self.insights.insert(
            0,
            Insight {
                id: Uuid::new_v4(),
                query_text,
                response_text,
                timestamp: Utc::now(),
                source,
            },
        );
        &self.insights[0]
    }

    /// Most-recent-first view of the session's insights
    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    /// Plain-text transcript of every insight, for download
    pub fn transcript(&self) -> String {
        self.insights
            .iter()
            .map(|i| format!("Query: {}\nResponse: {}\n\n", i.query_text, i.response_text))
            .collect()
    }
}

/// Get-or-create map of client session keys to their insight sessions
///
/// Keys come from the client (a per-tab session id); two clients never see
/// each other's insight lists or block on each other's in-flight requests.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<InsightSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `key`, created on first use
    pub fn session(&self, key: &str) -> Arc<Mutex<InsightSession>> {
        if let Some(session) = self.sessions.read().unwrap().get(key) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write().unwrap();
        Arc::clone(sessions.entry(key.to_string()).or_default())
    }
}

/// Holds a session's in-flight flag for the lifetime of one request
///
/// Clearing on `Drop` is the point: an HTTP handler future can be dropped
/// at any await when the requester disconnects, and the flag must not stay
/// set when that happens.
pub struct InFlightGuard {
    session: Arc<Mutex<InsightSession>>,
}

impl InFlightGuard {
    /// Take the in-flight flag, refusing a concurrent duplicate
    pub fn begin(session: &Arc<Mutex<InsightSession>>) -> Result<Self, AppError> {
        session.lock().unwrap().begin()?;
        Ok(InFlightGuard {
            session: Arc::clone(session),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.lock() {
            session.finish();
        }
    }
}
