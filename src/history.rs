use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

const RECORDS_FILE: &str = "analyses.json";

/// Chart type recorded with a saved analysis
///
/// The persisted enum is wider than the render enum: history entries may
/// describe charts this service never rendered itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Other,
}

impl RecordChartType {
    /// Parse the request-body string; anything outside the enum is a validation error
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "Bar" => Ok(RecordChartType::Bar),
            "Line" => Ok(RecordChartType::Line),
            "Pie" => Ok(RecordChartType::Pie),
            "Scatter" => Ok(RecordChartType::Scatter),
            "Area" => Ok(RecordChartType::Area),
            "Other" => Ok(RecordChartType::Other),
            other => Err(AppError::Validation(format!(
                "Invalid chart type: {}",
                other
            ))),
        }
    }
}

/// A persisted analysis: who saved what, when, and a snapshot of the rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub filename: String,
    #[serde(rename = "chartType")]
    pub chart_type: RecordChartType,
    #[serde(rename = "excelData")]
    pub excel_data: serde_json::Value,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// JSON-file-backed store of analysis records
///
/// Records are owner-scoped: listing and deletion only ever see the caller's
/// own rows. Deletion deliberately answers a uniform "not found" whether the
/// id is absent or belongs to someone else.
pub struct RecordStore {
    path: PathBuf,
    records: RwLock<Vec<AnalysisRecord>>,
}

impl RecordStore {
    /// Open (or initialize) the store under `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(data_dir)
            .map_err(|e| AppError::internal("create data directory", e))?;
        let path = data_dir.join(RECORDS_FILE);

        let records = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|e| AppError::internal("read records file", e))?;
            serde_json::from_str(&contents)
                .map_err(|e| AppError::internal("parse records file", e))?
        } else {
            Vec::new()
        };

        Ok(RecordStore {
            path,
            records: RwLock::new(records),
        })
    }

    fn persist(&self, records: &[AnalysisRecord]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| AppError::internal("serialize records", e))?;
        fs::write(&self.path, json).map_err(|e| AppError::internal("write records file", e))
    }

    /// Persist a new analysis for `owner_id`
    ///
    /// `chart_type` is validated against the fixed enum; filenames are not
    /// deduplicated, so saving the same file twice makes two records.
    pub fn create(
        &self,
        owner_id: &str,
        filename: &str,
        chart_type: &str,
        excel_data: serde_json::Value,
    ) -> Result<AnalysisRecord, AppError> {
        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            filename: filename.to_string(),
            chart_type: RecordChartType::parse(chart_type)?,
            excel_data,
            created_at: Utc::now(),
        };

        let mut records = self.records.write().unwrap();
        records.push(record.clone());
        self.persist(&records)?;
        Ok(record)
    }

    /// All records owned by `owner_id`, newest first
    pub fn list(&self, owner_id: &str) -> Vec<AnalysisRecord> {
        let records = self.records.read().unwrap();
        records
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .rev()
            .cloned()
            .collect()
    }

    /// Delete one of `owner_id`'s records
    ///
    /// Uniform 404 for "absent" and "owned by someone else": the response
    /// must not reveal whether the id exists under a different owner.
    pub fn delete(&self, owner_id: &str, id: Uuid) -> Result<(), AppError> {
        let mut records = self.records.write().unwrap();
        let position = records
            .iter()
            .position(|r| r.id == id && r.owner_id == owner_id);

        match position {
            Some(index) => {
                records.remove(index);
                self.persist(&records)
            }
            None => Err(AppError::NotFound(
                "Analysis not found or you do not have permission to delete it".to_string(),
            )),
        }
    }
}
