//! Expands the `notifications` channel list of profile change events into
//! per-channel boolean columns for the downstream sink.

use sift_api::error::ProcessorError;
use sift_api::processor::RecordProcessor;
use sift_api::record::Record;
use sift_api::value::{StructuredData, Value};

pub const PROCESSOR_NAME: &str = "notifications";

/// Channel table: source channel name → (push flag field, in-app flag field).
/// Both flags are driven by the same membership test. Channels outside the
/// table are ignored.
const CHANNELS: &[(&str, &str, &str)] = &[
    ("Follows", "push_follows", "app_follows"),
    ("Comments", "push_comments", "app_comments"),
    ("Quotes", "push_quotes", "app_quotes"),
    ("Likes", "push_likes", "app_likes"),
    ("Mentions", "push_mentions", "app_mentions"),
    ("TeaPartyInvites", "push_tp_invites", "app_tp_invites"),
    ("TeaPartyReply", "push_tp_replies", "app_tp_replies"),
];

/// Zero instant the downstream sink expects in `deleted_at` for live rows.
const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Maps `{id, notifications: [...]}` into fourteen boolean flag fields plus
/// `deleted`/`deleted_at` defaults and a verbatim `profile_id` passthrough.
/// Records without a structured after-image or without a `notifications`
/// list pass through unchanged; this processor has no failure path.
#[derive(Debug, Default)]
pub struct NotificationsProcessor;

impl RecordProcessor for NotificationsProcessor {
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

        let Some(notifications) = after.get_list("notifications") else {
            tracing::warn!(
                processor = PROCESSOR_NAME,
                "no 'notifications' list found, skipping record"
            );
            return Ok(record);
        };

        // Case-insensitive membership; non-string elements are ignored
        let enabled = |channel: &str| {
            notifications
                .iter()
                .any(|v| v.as_str().is_some_and(|s| s.eq_ignore_ascii_case(channel)))
        };

        let mut flags = StructuredData::new();
        for &(channel, push_field, app_field) in CHANNELS {
            let on = enabled(channel);
            flags.insert(push_field, on);
            flags.insert(app_field, on);
        }
        flags.insert("deleted", false);
        flags.insert("deleted_at", ZERO_TIMESTAMP);
        // Verbatim passthrough, null when absent — the sink tolerates both
        flags.insert("profile_id", after.get("id").cloned().unwrap_or(Value::Null));

        tracing::info!(processor = PROCESSOR_NAME, payload = %flags, "transformed after-image");

        record.replace_after(flags);
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
        Box::new(NotificationsProcessor) as Box<dyn RecordProcessor>,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_api::record::{Data, Operation, Payload};

    const FLAG_FIELDS: [&str; 14] = [
        "push_follows",
        "push_comments",
        "push_quotes",
        "push_likes",
        "push_mentions",
        "push_tp_invites",
        "push_tp_replies",
        "app_follows",
        "app_comments",
        "app_quotes",
        "app_likes",
        "app_mentions",
        "app_tp_invites",
        "app_tp_replies",
    ];

    fn record_with_after(after: serde_json::Value) -> Record {
        Record {
            ts_ms: 1_712_345_678_901,
            operation: Operation::Update,
            key: "6f9619ff-8b86-d011-b42d-00c04fc964ff".into(),
            metadata: Default::default(),
            payload: Payload {
                before: None,
                after: Some(Data::Structured(serde_json::from_value(after).unwrap())),
            },
        }
    }

    fn mapped(record: &Record) -> &StructuredData {
        record.structured_after().expect("structured after-image")
    }

    #[test]
    fn listed_channels_set_both_flag_variants() {
        let input = record_with_after(serde_json::json!({
            "id": "abc",
            "notifications": ["Follows", "Likes"],
        }));

        let out = NotificationsProcessor.process(input).unwrap();
        let after = mapped(&out);

        for field in FLAG_FIELDS {
            let expected = matches!(
                field,
                "push_follows" | "app_follows" | "push_likes" | "app_likes"
            );
            assert_eq!(after.get_bool(field), Some(expected), "field {field}");
        }
    }

    #[test]
    fn membership_is_case_insensitive() {
        let input = record_with_after(serde_json::json!({
            "id": "abc",
            "notifications": ["FOLLOWS", "teapartyreply"],
        }));

        let out = NotificationsProcessor.process(input).unwrap();
        let after = mapped(&out);

        assert_eq!(after.get_bool("push_follows"), Some(true));
        assert_eq!(after.get_bool("app_follows"), Some(true));
        assert_eq!(after.get_bool("push_tp_replies"), Some(true));
        assert_eq!(after.get_bool("app_tp_replies"), Some(true));
        assert_eq!(after.get_bool("push_likes"), Some(false));
    }

    #[test]
    fn empty_list_clears_all_flags() {
        let input = record_with_after(serde_json::json!({
            "id": "abc",
            "notifications": [],
        }));

        let out = NotificationsProcessor.process(input).unwrap();
        let after = mapped(&out);

        for field in FLAG_FIELDS {
            assert_eq!(after.get_bool(field), Some(false), "field {field}");
        }
        assert_eq!(after.get_bool("deleted"), Some(false));
        assert_eq!(after.get_str("deleted_at"), Some(ZERO_TIMESTAMP));
        assert_eq!(after.get_str("profile_id"), Some("abc"));
        // 14 flags + deleted + deleted_at + profile_id
        assert_eq!(after.len(), 17);
    }

    #[test]
    fn unmapped_channels_and_non_strings_are_ignored() {
        let input = record_with_after(serde_json::json!({
            "id": "abc",
            "notifications": ["SpadeGameInvites", "GameReply", 7, null, ["Follows"]],
        }));

        let out = NotificationsProcessor.process(input).unwrap();
        let after = mapped(&out);

        for field in FLAG_FIELDS {
            assert_eq!(after.get_bool(field), Some(false), "field {field}");
        }
    }

    #[test]
    fn missing_id_passes_through_as_null() {
        let input = record_with_after(serde_json::json!({
            "notifications": ["Follows"],
        }));

        let out = NotificationsProcessor.process(input).unwrap();
        assert_eq!(mapped(&out).get("profile_id"), Some(&Value::Null));
    }

    #[test]
    fn non_string_id_passes_through_verbatim() {
        let input = record_with_after(serde_json::json!({
            "id": 42,
            "notifications": ["Follows"],
        }));

        let out = NotificationsProcessor.process(input).unwrap();
        assert_eq!(mapped(&out).get("profile_id"), Some(&Value::Int(42)));
    }

    #[test]
    fn raw_after_image_is_skipped_unchanged() {
        let input = Record {
            ts_ms: 0,
            operation: Operation::Create,
            key: "k".into(),
            metadata: Default::default(),
            payload: Payload {
                before: None,
                after: Some(Data::Raw(b"not structured".to_vec())),
            },
        };

        let out = NotificationsProcessor.process(input.clone()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn missing_notifications_list_is_skipped_unchanged() {
        let input = record_with_after(serde_json::json!({
            "id": "abc",
            "handle": "teadrinker",
        }));

        let out = NotificationsProcessor.process(input.clone()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn non_list_notifications_is_skipped_unchanged() {
        let input = record_with_after(serde_json::json!({
            "id": "abc",
            "notifications": "Follows",
        }));

        let out = NotificationsProcessor.process(input.clone()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn reapplying_to_own_output_skips() {
        let input = record_with_after(serde_json::json!({
            "id": "abc",
            "notifications": ["Comments"],
        }));

        let once = NotificationsProcessor.process(input).unwrap();
        let twice = NotificationsProcessor.process(once.clone()).unwrap();
        assert_eq!(twice, once);
    }
}
