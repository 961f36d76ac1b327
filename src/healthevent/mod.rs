//! Typed decoding of the `detail` payload of AWS Health events.
//!
//! https://docs.aws.amazon.com/health/latest/ug/cloudwatch-events-health.html#aws-health-event-schema

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::envelope::CloudWatchEvent;

pub use error::{DecodeError, DecodeErrorKind};

pub mod error;
pub mod time;

macro_rules! open_code {
    ($(#[$meta:meta])* $name:ident { $($(#[$cmeta:meta])* $konst:ident = $value:expr,)+ }) => {
        $(#[$meta])*
        #[derive(Default, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            $($(#[$cmeta])* pub const $konst: &'static str = $value;)+

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the value is one the provider documents. Unknown values
            /// still decode.
            pub fn is_known(&self) -> bool {
                [$(Self::$konst),+].contains(&self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_owned())
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

open_code!(
    EventTypeCategory {
        ISSUE = "issue",
        ACCOUNT_NOTIFICATION = "accountNotification",
        INVESTIGATION = "investigation",
        SCHEDULED_CHANGE = "scheduledChange",
    }
);

open_code!(
    EventScopeCode {
        ACCOUNT_SPECIFIC = "ACCOUNT_SPECIFIC",
        PUBLIC = "PUBLIC",
    }
);

open_code!(
    /// Issues use lowercase codes, scheduled changes use capitalised ones.
    StatusCode {
        ISSUE_OPEN = "open",
        ISSUE_CLOSED = "closed",
        ISSUE_UPCOMING = "upcoming",
        SCHEDULED_CHANGE_UPCOMING = "Upcoming",
        SCHEDULED_CHANGE_ONGOING = "Ongoing",
        SCHEDULED_CHANGE_COMPLETED = "Completed",
        /// `-` is sent when the provider has no status for the event.
        UNDEFINED = "-",
    }
);

#[derive(Default, Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    pub event_arn: String,
    pub service: String,
    pub event_type_code: String,
    pub event_type_category: EventTypeCategory,
    pub event_scope_code: EventScopeCode,
    pub communication_id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated_time: Option<DateTime<Utc>>,
    pub status_code: StatusCode,
    pub event_region: String,
    pub event_description: Vec<EventDescriptionRow>,
    pub event_metadata: HashMap<String, String>,
    pub affected_entities: Vec<AffectedEntity>,
    /// Page numbers arrive as text, e.g. `"1"`.
    pub page: String,
    pub total_pages: String,
    pub affected_account: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDescriptionRow {
    #[serde(deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(deserialize_with = "null_as_default")]
    pub latest_description: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedEntity {
    pub entity_value: String,
    pub last_updated_time: Option<DateTime<Utc>>,
    pub status: String,
}

/// Decodes the raw `detail` payload of a health event.
///
/// Unknown keys are ignored and missing or `null` fields take their empty value,
/// but a value of the wrong shape or a malformed timestamp fails the whole
/// decode. A key repeated within one object keeps its last value.
pub fn decode_detail(bytes: &[u8]) -> Result<Detail, DecodeError> {
    // going through `Value` collapses repeated keys before the typed pass
    let value: Value = serde_json::from_slice(bytes)?;
    let wire: WireDetail = serde_json::from_value(value)?;
    Detail::try_from_wire(wire)
}

pub fn parse_detail(event: &CloudWatchEvent) -> Result<Detail, DecodeError> {
    decode_detail(event.detail.get().as_bytes())
}

impl Detail {
    fn try_from_wire(wire: WireDetail) -> Result<Detail, DecodeError> {
        let affected_entities = wire
            .affected_entities
            .into_iter()
            .enumerate()
            .map(|(ix, entity)| AffectedEntity::try_from_wire(ix, entity))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Detail {
            event_arn: wire.event_arn,
            service: wire.service,
            event_type_code: wire.event_type_code,
            event_type_category: EventTypeCategory(wire.event_type_category),
            event_scope_code: EventScopeCode(wire.event_scope_code),
            communication_id: wire.communication_id,
            start_time: timestamp("startTime", wire.start_time)?,
            end_time: timestamp("endTime", wire.end_time)?,
            last_updated_time: timestamp("lastUpdatedTime", wire.last_updated_time)?,
            status_code: StatusCode(wire.status_code),
            event_region: wire.event_region,
            event_description: wire.event_description,
            event_metadata: wire
                .event_metadata
                .into_iter()
                .map(|(key, value)| (key, value.unwrap_or_default()))
                .collect(),
            affected_entities,
            page: wire.page,
            total_pages: wire.total_pages,
            affected_account: wire.affected_account,
        })
    }
}

impl AffectedEntity {
    fn try_from_wire(ix: usize, wire: WireAffectedEntity) -> Result<AffectedEntity, DecodeError> {
        let field = format!("affectedEntities[{}].lastUpdatedtime", ix);
        Ok(AffectedEntity {
            entity_value: wire.entity_value,
            last_updated_time: timestamp(&field, wire.last_updated_time)?,
            status: wire.status,
        })
    }
}

fn timestamp(field: &str, raw: Option<String>) -> Result<Option<DateTime<Utc>>, DecodeError> {
    match raw {
        Some(raw) => time::parse_timestamp(field, &raw),
        None => Ok(None),
    }
}

/// Shape of the payload as the provider sends it. Timestamps stay raw here so
/// that a bad one can be reported with its field name.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireDetail {
    #[serde(deserialize_with = "null_as_default")]
    event_arn: String,
    #[serde(deserialize_with = "null_as_default")]
    service: String,
    #[serde(deserialize_with = "null_as_default")]
    event_type_code: String,
    #[serde(deserialize_with = "null_as_default")]
    event_type_category: String,
    #[serde(deserialize_with = "null_as_default")]
    event_scope_code: String,
    #[serde(deserialize_with = "null_as_default")]
    communication_id: String,
    start_time: Option<String>,
    end_time: Option<String>,
    last_updated_time: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    status_code: String,
    #[serde(deserialize_with = "null_as_default")]
    event_region: String,
    #[serde(deserialize_with = "null_as_default")]
    event_description: Vec<EventDescriptionRow>,
    #[serde(deserialize_with = "null_as_default")]
    event_metadata: HashMap<String, Option<String>>,
    #[serde(deserialize_with = "null_as_default")]
    affected_entities: Vec<WireAffectedEntity>,
    #[serde(deserialize_with = "null_as_default")]
    page: String,
    #[serde(deserialize_with = "null_as_default")]
    total_pages: String,
    #[serde(deserialize_with = "null_as_default")]
    affected_account: String,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireAffectedEntity {
    #[serde(deserialize_with = "null_as_default")]
    entity_value: String,
    // lowercase `t`, unlike the top level `lastUpdatedTime`
    #[serde(rename = "lastUpdatedtime")]
    last_updated_time: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    status: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
