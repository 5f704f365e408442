//! Flattens the nested `appearance` object of profile change events into
//! top-level columns for the downstream sink.

use sift_api::error::ProcessorError;
use sift_api::processor::RecordProcessor;
use sift_api::record::Record;
use sift_api::value::StructuredData;

pub const PROCESSOR_NAME: &str = "appearance";

/// Reshapes `{id, appearance: {mode, colorway, theme, deleted, deleted_at}}`
/// into a flat `{mode, colorway, theme, deleted, deleted_at, profile_id}`
/// after-image. Records without a structured after-image or without an
/// `appearance` object pass through unchanged.
#[derive(Debug, Default)]
pub struct AppearanceProcessor;

impl RecordProcessor for AppearanceProcessor {
    fn name(&self) -> &'static str {
        PROCESSOR_NAME
    }

    fn process(&self, mut record: Record) -> Result<Record, ProcessorError> {
        let Some(after) = record.structured_after() else {
            tracing::warn!(
                processor = PROCESSOR_NAME,
                "after-image is not structured data, skipping record"
            );
            return Ok(record);
        };

        tracing::info!(processor = PROCESSOR_NAME, payload = %after, "raw after-image");

        let Some(appearance) = after.get_map("appearance") else {
            tracing::warn!(
                processor = PROCESSOR_NAME,
                "no 'appearance' object found, skipping record"
            );
            return Ok(record);
        };

        let mode = appearance.get_str("mode").unwrap_or_default();
        let colorway = appearance.get_str("colorway").unwrap_or_default();
        let theme = appearance.get_str("theme").unwrap_or_default();
        let deleted = appearance.get_bool("deleted").unwrap_or_default();
        // Only carried over when it holds a non-empty timestamp
        let deleted_at = appearance.get_str("deleted_at").filter(|v| !v.is_empty());

        let profile_id = after
            .get_str("id")
            .ok_or_else(|| ProcessorError::missing_field("id"))?;

        let mut flat = StructuredData::new();
        flat.insert("mode", mode);
        flat.insert("colorway", colorway);
        flat.insert("theme", theme);
        flat.insert("deleted", deleted);
        if let Some(at) = deleted_at {
            flat.insert("deleted_at", at);
        }
        flat.insert("profile_id", profile_id);

        tracing::info!(processor = PROCESSOR_NAME, payload = %flat, "transformed after-image");

        record.replace_after(flat);
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// FFI exports for dynamic (.so) loading
// ---------------------------------------------------------------------------

sift_api::sf_abi_version_fn!();
sift_api::sf_config_params_fn!([]);
sift_api::sf_destroy_fn!(sf_destroy_processor, sift_api::processor::RecordProcessor);

/// # Safety
///
/// `_config_ptr` must point to a valid `ConfigValues` owned by the engine.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sf_create_processor(
    _config_ptr: *const (),
) -> sift_api::ffi::PluginCreateResult {
    sift_api::ffi::plugin_ok(Box::new(
        Box::new(AppearanceProcessor) as Box<dyn RecordProcessor>,
    ))
}
