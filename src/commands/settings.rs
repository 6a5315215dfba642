use crate::analysis::hotspots::HotspotThresholds;
use crate::commands::db::DATA_DIR_NAME;
use crate::commands::run_blocking;
use crate::error::EngineError;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_SCHEMA_VERSION: i64 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveEngineSettings {
    pub hotspots: HotspotThresholds,
    pub overview_cache_ttl: Duration,
    pub trend_limit: usize,
}

impl Default for EffectiveEngineSettings {
    fn default() -> Self {
        Self {
            hotspots: HotspotThresholds::default(),
            overview_cache_ttl: Duration::from_secs(300),
            trend_limit: 30,
        }
    }
}

pub async fn get_settings(data_dir: String) -> Result<Value, EngineError> {
    run_blocking(move || load_settings_from_disk(&data_dir)).await
}

pub async fn save_settings(data_dir: String, settings: Value) -> Result<Value, EngineError> {
    run_blocking(move || save_settings_to_disk(&data_dir, settings)).await
}

pub fn load_effective_settings(data_dir: &str) -> Result<EffectiveEngineSettings, EngineError> {
    let settings = load_settings_from_disk(data_dir)?;
    Ok(effective_from_value(&settings))
}

fn effective_from_value(settings: &Value) -> EffectiveEngineSettings {
    let defaults = EffectiveEngineSettings::default();
    let number = |key: &str| settings.get(key).and_then(Value::as_u64);

    EffectiveEngineSettings {
        hotspots: HotspotThresholds {
            min_change_frequency: number("hotspotMinChangeFrequency")
                .map(|v| v as f64)
                .unwrap_or(defaults.hotspots.min_change_frequency),
            min_complexity: number("hotspotMinComplexity")
                .map(|v| v as f64)
                .unwrap_or(defaults.hotspots.min_complexity),
        },
        overview_cache_ttl: number("overviewCacheTtlSecs")
            .map(Duration::from_secs)
            .unwrap_or(defaults.overview_cache_ttl),
        trend_limit: number("trendLimit")
            .map(|v| v as usize)
            .unwrap_or(defaults.trend_limit),
    }
}

pub fn load_settings_from_disk(data_dir: &str) -> Result<Value, EngineError> {
    let path = settings_path(data_dir);
    ensure_data_dir(data_dir)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(e) => {
                // Leave the broken file for the user to fix.
                log::warn!("settings.json is not valid JSON ({e}); using defaults without rewriting it");
                return Ok(migrate_settings(json!({})));
            }
        }
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(data_dir: &str, settings: Value) -> Result<Value, EngineError> {
    let path = settings_path(data_dir);
    ensure_data_dir(data_dir)?;

    let mut merged = load_settings_from_disk(data_dir).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

fn settings_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(DATA_DIR_NAME).join("settings.json")
}

fn ensure_data_dir(data_dir: &str) -> Result<(), EngineError> {
    fs::create_dir_all(Path::new(data_dir).join(DATA_DIR_NAME))?;
    Ok(())
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<(), EngineError> {
    let raw = serde_json::to_string_pretty(settings)?;
    fs::write(path, raw)?;
    Ok(())
}

fn migrate_settings(input: Value) -> Value {
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    if version < 2 {
        // V1 used one threshold for both hotspot dimensions.
        split_legacy_hotspot_threshold(&mut out);
    }

    deep_merge_defaults(&mut out, &default_settings());
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "hotspotMinChangeFrequency": 10,
        "hotspotMinComplexity": 20,
        "overviewCacheTtlSecs": 300,
        "trendLimit": 30
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn split_legacy_hotspot_threshold(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };
    let Some(legacy) = obj.remove("hotspotThreshold") else {
        return;
    };
    obj.entry("hotspotMinChangeFrequency".to_string())
        .or_insert_with(|| legacy.clone());
    obj.entry("hotspotMinComplexity".to_string())
        .or_insert(legacy);
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(obj, "hotspotMinChangeFrequency", 1, 500, 10);
    clamp_u64(obj, "hotspotMinComplexity", 1, 500, 20);
    clamp_u64(obj, "overviewCacheTtlSecs", 0, 86_400, 300);
    clamp_u64(obj, "trendLimit", 1, 365, 30);
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_migrates_to_defaults() {
        let migrated = migrate_settings(json!({}));
        assert_eq!(migrated, default_settings());
        assert_eq!(effective_from_value(&migrated), EffectiveEngineSettings::default());
    }

    #[test]
    fn splits_legacy_hotspot_threshold() {
        let migrated = migrate_settings(json!({ "schema_version": 1, "hotspotThreshold": 15 }));
        assert_eq!(migrated["hotspotMinChangeFrequency"], json!(15));
        assert_eq!(migrated["hotspotMinComplexity"], json!(15));
        assert!(migrated.get("hotspotThreshold").is_none());
        assert_eq!(migrated["schema_version"], json!(SETTINGS_SCHEMA_VERSION));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let migrated = migrate_settings(json!({
            "schema_version": 2,
            "trendLimit": 10_000,
            "hotspotMinComplexity": 0,
            "overviewCacheTtlSecs": "soon"
        }));
        assert_eq!(migrated["trendLimit"], json!(365));
        assert_eq!(migrated["hotspotMinComplexity"], json!(1));
        assert_eq!(migrated["overviewCacheTtlSecs"], json!(300));
    }

    #[test]
    fn merges_partial_settings_without_losing_existing_values() {
        let mut existing = default_settings();
        merge_settings(&mut existing, &json!({ "trendLimit": 7 }));
        let migrated = migrate_settings(existing);

        assert_eq!(migrated["trendLimit"], json!(7));
        assert_eq!(migrated["hotspotMinComplexity"], json!(20));
        assert_eq!(effective_from_value(&migrated).trend_limit, 7);
    }

    #[test]
    fn invalid_json_is_not_overwritten_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        ensure_data_dir(&data_dir).unwrap();
        let path = settings_path(&data_dir);
        let broken = "{ \"trendLimit\": 12, }";
        fs::write(&path, broken).unwrap();

        let loaded = load_settings_from_disk(&data_dir).unwrap();
        assert_eq!(loaded, default_settings());
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    }

    #[tokio::test]
    async fn async_wrappers_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();

        let saved = save_settings(data_dir.clone(), json!({ "overviewCacheTtlSecs": 0 }))
            .await
            .unwrap();
        assert_eq!(saved["overviewCacheTtlSecs"], json!(0));
        assert_eq!(get_settings(data_dir.clone()).await.unwrap(), saved);
        assert_eq!(
            load_effective_settings(&data_dir).unwrap().overview_cache_ttl,
            Duration::ZERO
        );
    }

    #[test]
    fn non_object_input_is_replaced() {
        let migrated = migrate_settings(json!([1, 2, 3]));
        assert_eq!(migrated, default_settings());
    }
}
