use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Active,
    Inactive,
    Maintenance,
}

impl PanelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelStatus::Active => "active",
            PanelStatus::Inactive => "inactive",
            PanelStatus::Maintenance => "maintenance",
        }
    }
}

impl Default for PanelStatus {
    fn default() -> Self {
        PanelStatus::Active
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PanelStatus::Active),
            "inactive" => Ok(PanelStatus::Inactive),
            "maintenance" => Ok(PanelStatus::Maintenance),
            other => Err(format!("unknown panel status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: Uuid,
    pub model: String,
    pub location: String,
    /// Rated capacity in kWh, always > 0.
    pub capacity: f64,
    pub status: PanelStatus,
    /// Weak reference to the assigned user; `None` means unassigned.
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Panel {
    /// A freshly created panel is active and unassigned.
    pub fn new(fields: NewPanel) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: fields.model,
            location: fields.location,
            capacity: fields.capacity,
            status: PanelStatus::Active,
            owner_id: None,
            // Postgres TIMESTAMPTZ keeps microseconds
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// Fields accepted when creating a panel.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPanel {
    pub model: String,
    pub location: String,
    pub capacity: f64,
}

/// Partial update. Absent and `null` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PanelPatch {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub status: Option<PanelStatus>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

impl PanelPatch {
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.status.is_none()
            && self.owner_id.is_none()
    }

    pub fn apply(&self, panel: &mut Panel) {
        if let Some(model) = &self.model {
            panel.model = model.clone();
        }
        if let Some(location) = &self.location {
            panel.location = location.clone();
        }
        if let Some(capacity) = self.capacity {
            panel.capacity = capacity;
        }
        if let Some(status) = self.status {
            panel.status = status;
        }
        if let Some(owner_id) = self.owner_id {
            panel.owner_id = Some(owner_id);
        }
    }
}

/// Panel enriched with the owner's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    #[serde(flatten)]
    pub panel: Panel,
    pub owner_name: Option<String>,
}
