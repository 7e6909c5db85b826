use log::info;
use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value as JsonValue };
use std::fs;
use std::path::{ Path, PathBuf };

use crate::error::PlannerError;
use crate::models::plan::{ DateRange, DayPlan, Idea };

pub const SAVED_PLAN_KEY: &str = "riff_saved_plan";

/// Snapshot written by "save plan". Overwritten wholesale on every save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlan {
    pub query: String,
    #[serde(default)]
    pub date: Option<DateRange>,
    #[serde(default)]
    pub plans: Vec<Idea>,
    #[serde(default)]
    pub timeline: Vec<DayPlan>,
}

/// Client-local key-value store backed by a single JSON object on disk.
/// Values are kept as JSON text, the way browser local storage keeps them.
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, plan: &SavedPlan) -> Result<(), PlannerError> {
        let text = serde_json::to_string(plan).map_err(|e| PlannerError::Storage(e.to_string()))?;
        let mut entries = self.read_entries()?;
        entries.insert(SAVED_PLAN_KEY.to_string(), JsonValue::String(text));

        let raw = serde_json::to_string_pretty(&entries)
            .map_err(|e| PlannerError::Storage(e.to_string()))?;
        fs::write(&self.path, raw)
            .map_err(|e| PlannerError::Storage(format!("{}: {}", self.path.display(), e)))?;
        info!("Saved plan for '{}' to {}", plan.query, self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Option<SavedPlan>, PlannerError> {
        let entries = self.read_entries()?;
        match entries.get(SAVED_PLAN_KEY) {
            Some(JsonValue::String(text)) =>
                serde_json::from_str(text)
                    .map(Some)
                    .map_err(|e| PlannerError::Storage(e.to_string())),
            Some(_) => Err(PlannerError::Storage(format!("'{}' is not a JSON string", SAVED_PLAN_KEY))),
            None => Ok(None),
        }
    }

    fn read_entries(&self) -> Result<Map<String, JsonValue>, PlannerError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| PlannerError::Storage(format!("{}: {}", self.path.display(), e)))?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|e| PlannerError::Storage(e.to_string()))
    }
}
