//! Sidecar descriptor contents
//!
//! Descriptors are JSON documents; the only field read is
//! `photoTakenTime.timestamp`, epoch seconds that exports write either as a
//! decimal string or as a number.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::config::TimeZoneSetting;
use crate::error::{DescriptorError, DescriptorResult};

/// Output format of recovered capture times, as expected by exiftool
pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const TIMESTAMP_FIELD: &str = "photoTakenTime.timestamp";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorDocument {
	photo_taken_time: Option<TakenTime>,
}

#[derive(Debug, Deserialize)]
struct TakenTime {
	timestamp: Option<Value>,
}

/// Extract the capture time in epoch seconds from descriptor bytes.
///
/// `path` is only used to label errors.
pub fn parse_taken_time(path: &str, bytes: &[u8]) -> DescriptorResult<i64> {
	let doc: DescriptorDocument =
		serde_json::from_slice(bytes).map_err(|source| DescriptorError::Json {
			path: path.to_string(),
			source,
		})?;
	let value = doc
		.photo_taken_time
		.and_then(|t| t.timestamp)
		.ok_or_else(|| DescriptorError::MissingField {
			path: path.to_string(),
			field: TIMESTAMP_FIELD,
		})?;

	let invalid = |value: &Value| DescriptorError::InvalidTimestamp {
		path: path.to_string(),
		value: value.to_string(),
	};
	match &value {
		Value::Number(n) => n.as_i64().ok_or_else(|| invalid(&value)),
		Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid(&value)),
		_ => Err(invalid(&value)),
	}
}

/// Format epoch seconds as `YYYY:MM:DD HH:MM:SS` in the configured zone.
pub fn format_capture_time(
	path: &str,
	epoch_seconds: i64,
	zone: TimeZoneSetting,
) -> DescriptorResult<String> {
	let utc: DateTime<Utc> =
		DateTime::from_timestamp(epoch_seconds, 0).ok_or_else(|| DescriptorError::InvalidTimestamp {
			path: path.to_string(),
			value: epoch_seconds.to_string(),
		})?;
	Ok(match zone {
		TimeZoneSetting::Utc => utc.format(CAPTURE_TIME_FORMAT).to_string(),
		TimeZoneSetting::Local => Local
			.from_utc_datetime(&utc.naive_utc())
			.format(CAPTURE_TIME_FORMAT)
			.to_string(),
	})
}

/// Read, parse and format one descriptor.
///
/// The file handle lives only for the duration of the read.
pub async fn read_capture_time(path: &str, zone: TimeZoneSetting) -> DescriptorResult<String> {
	let bytes = smol::fs::read(path)
		.await
		.map_err(|source| DescriptorError::Io {
			path: path.to_string(),
			source,
		})?;
	let epoch = parse_taken_time(path, &bytes)?;
	format_capture_time(path, epoch, zone)
}
