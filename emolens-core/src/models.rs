//! Model catalog: the model identifiers clients can request and their display names.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    pub id: String,
    pub name: String,
}

const CATALOG: &[(&str, &str)] = &[
    ("baseline", "Baseline Model"),
    ("advanced", "Advanced Model"),
    ("ensemble", "Ensemble Model"),
];

pub fn model_catalog() -> Vec<ModelProfile> {
    CATALOG
        .iter()
        .map(|(id, name)| ModelProfile {
            id: (*id).into(),
            name: (*name).into(),
        })
        .collect()
}

/// Display name for `model_id`. Unknown ids are their own name.
pub fn model_name(model_id: &str) -> String {
    CATALOG
        .iter()
        .find(|(id, _)| *id == model_id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| model_id.to_string())
}
