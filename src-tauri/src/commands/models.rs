use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generator::{MODEL_FAST, MODEL_QUALITY};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    /// True for the high-quality variant.
    pub high_quality: bool,
}

/// The two model variants the quality toggle selects between.
#[tauri::command]
pub fn list_models() -> Result<Vec<ModelInfo>, String> {
    info!("Listing generation models");
    Ok(vec![
        ModelInfo {
            id: MODEL_FAST.to_string(),
            name: "Fast (default)".to_string(),
            high_quality: false,
        },
        ModelInfo {
            id: MODEL_QUALITY.to_string(),
            name: "High quality".to_string(),
            high_quality: true,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_models_has_both_variants() {
        let models = list_models().unwrap();
        assert_eq!(models.len(), 2);
        assert!(!models[0].high_quality);
        assert!(models[1].high_quality);
        assert_ne!(models[0].id, models[1].id);
    }
}
