use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// EventBridge / CloudWatch event wrapper. `detail` is kept as raw json so the
/// health event decoder sees exactly the bytes the provider sent.
#[derive(Debug, Serialize, Deserialize)]
pub struct CloudWatchEvent {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub id: String,
    #[serde(rename = "detail-type")]
    #[serde(default)]
    pub detail_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "account")]
    #[serde(default)]
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub resources: Vec<String>,
    pub detail: Box<RawValue>,
}

pub fn parse_event(bytes: &[u8]) -> Result<CloudWatchEvent, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_envelope_keeps_detail_raw() {
        let raw = include_str!("healthevent/testdata/specific-ec2-event.json");
        let event = parse_event(raw.as_bytes()).unwrap();
        assert_eq!(event.detail_type, "AWS Health Event");
        assert_eq!(event.source, "aws.health");
        assert_eq!(event.account_id, "123456789012");
        assert_eq!(event.region, "us-west-2");
        assert_eq!(event.resources, vec!["i-abcd1111".to_owned()]);
        assert_eq!(event.time, Some(Utc.with_ymd_and_hms(2022, 6, 3, 6, 27, 57).unwrap()));
        assert!(event.detail.get().starts_with('{'));
        assert!(event.detail.get().contains("i-abcd1111"));
    }

    #[test]
    fn test_envelope_requires_detail() {
        let err = parse_event(br#"{"id":"1","source":"aws.health"}"#).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_envelope_fields_default() {
        let event = parse_event(br#"{"detail":{"service":"EC2"}}"#).unwrap();
        assert_eq!(event.id, "");
        assert_eq!(event.time, None);
        assert!(event.resources.is_empty());
        assert_eq!(event.detail.get(), r#"{"service":"EC2"}"#);
    }
}
