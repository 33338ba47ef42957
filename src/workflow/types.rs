//! Core data model for automation steps, edges and submission records.
//!
//! These types are the serde surface shared with the remote Automation API:
//! nodes and edges round-trip through saved automation records, and every
//! per-kind parameter shape is a typed variant rather than an open mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::BlockKind;

/// Canvas coordinates. Layout only; execution never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One automation step.
///
/// The step kind is carried by the [`StepParams`] variant, so a node's kind
/// and its parameter shape cannot drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique id, assigned at creation, immutable afterwards
    pub id: Uuid,
    /// Display name, copied from the catalog entry at creation time
    pub label: String,
    pub position: Position,
    pub params: StepParams,
}

impl Node {
    pub fn kind(&self) -> BlockKind {
        self.params.kind()
    }
}

/// Directed execution-order relationship: `target` runs after `source`
/// and may consume its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: Uuid,
    pub target: Uuid,
}

/// Per-kind step parameters, tagged with the step's wire kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StepParams {
    #[serde(rename = "form-trigger")]
    FormTrigger(FormTriggerParams),
    #[serde(rename = "sale-trigger")]
    SaleTrigger(SaleTriggerParams),
    #[serde(rename = "content-generation-text")]
    TextGenerator(TextGeneratorParams),
    #[serde(rename = "content-generation-image")]
    ImageGenerator(ImageGeneratorParams),
    #[serde(rename = "wait")]
    Wait(WaitParams),
    #[serde(rename = "email")]
    Email(EmailParams),
    #[serde(rename = "twitter")]
    Twitter(SocialParams),
    #[serde(rename = "facebook")]
    Facebook(SocialParams),
    #[serde(rename = "whatsapp")]
    Whatsapp(SocialParams),
    #[serde(rename = "linkedin")]
    Linkedin(SocialParams),
    #[serde(rename = "youtube")]
    Youtube(SocialParams),
    #[serde(rename = "instagram")]
    Instagram(SocialParams),
}

impl StepParams {
    pub fn kind(&self) -> BlockKind {
        match self {
            StepParams::FormTrigger(_) => BlockKind::FormTrigger,
            StepParams::SaleTrigger(_) => BlockKind::SaleTrigger,
            StepParams::TextGenerator(_) => BlockKind::TextGenerator,
            StepParams::ImageGenerator(_) => BlockKind::ImageGenerator,
            StepParams::Wait(_) => BlockKind::Wait,
            StepParams::Email(_) => BlockKind::Email,
            StepParams::Twitter(_) => BlockKind::Twitter,
            StepParams::Facebook(_) => BlockKind::Facebook,
            StepParams::Whatsapp(_) => BlockKind::Whatsapp,
            StepParams::Linkedin(_) => BlockKind::Linkedin,
            StepParams::Youtube(_) => BlockKind::Youtube,
            StepParams::Instagram(_) => BlockKind::Instagram,
        }
    }

    /// Default parameters for a freshly created node of `kind`.
    pub fn default_for(kind: BlockKind) -> StepParams {
        match kind {
            BlockKind::FormTrigger => StepParams::FormTrigger(FormTriggerParams::default()),
            BlockKind::SaleTrigger => StepParams::SaleTrigger(SaleTriggerParams::default()),
            BlockKind::TextGenerator => StepParams::TextGenerator(TextGeneratorParams::default()),
            BlockKind::ImageGenerator => {
                StepParams::ImageGenerator(ImageGeneratorParams::default())
            }
            BlockKind::Wait => StepParams::Wait(WaitParams { duration_secs: 3600 }),
            BlockKind::Email => StepParams::Email(EmailParams::default()),
            BlockKind::Twitter => StepParams::Twitter(SocialParams::default()),
            BlockKind::Facebook => StepParams::Facebook(SocialParams::default()),
            BlockKind::Whatsapp => StepParams::Whatsapp(SocialParams::default()),
            BlockKind::Linkedin => StepParams::Linkedin(SocialParams::default()),
            BlockKind::Youtube => StepParams::Youtube(SocialParams::default()),
            BlockKind::Instagram => StepParams::Instagram(SocialParams::default()),
        }
    }
}

/// Form-submission trigger configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTriggerParams {
    /// Capture page the form lives on
    pub page: Option<String>,
    /// Whether captured fields are exposed as message variables downstream
    pub capture_enabled: bool,
    /// Captured fields, in the order the user selected them
    pub capture_fields: Vec<String>,
}

/// Sale-event trigger configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTriggerParams {
    /// Sales page or product the trigger listens on
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGeneratorParams {
    /// Instructions handed to the backend content generator
    pub instructions: String,
    /// Optional template the generated text is poured into
    pub template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGeneratorParams {
    pub instructions: String,
    /// Uploaded asset references the generator may use
    pub assets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitParams {
    pub duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailParams {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Social-post step configuration.
///
/// `message` may reference form variables (`{{email}}`); `extra` carries the
/// platform-specific payload, which the core treats opaquely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialParams {
    pub message: String,
    #[serde(default)]
    pub extra: Value,
}

/// How a saved automation starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "startType", rename_all = "camelCase")]
pub enum StartTrigger {
    /// Runs at a fixed time, optionally repeating
    #[serde(rename_all = "camelCase")]
    Schedule {
        next_execution_time: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repeat_interval: Option<RepeatInterval>,
    },
    /// Runs when the selected event fires
    Event { event: EventSelector },
}

impl StartTrigger {
    pub fn is_schedule(&self) -> bool {
        matches!(self, StartTrigger::Schedule { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSelector {
    FormSubmission,
    Sale,
}

/// The record submitted to the Automation API on save or test run.
///
/// `nodes` must already be in execution order; the backend does not re-sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRecord {
    /// Present when updating a previously saved automation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(flatten)]
    pub start: StartTrigger,
    /// Execute once immediately instead of scheduling
    #[serde(default)]
    pub testing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn params_tag_matches_block_kind() {
        for kind in BlockKind::ALL {
            let params = StepParams::default_for(kind);
            assert_eq!(params.kind(), kind);
            let json = serde_json::to_value(&params).unwrap();
            assert_eq!(json["kind"], kind.as_str());
            let back: StepParams = serde_json::from_value(json).unwrap();
            assert_eq!(back, params);
        }
    }

    #[test]
    fn schedule_start_serializes_camel_case() {
        let start = StartTrigger::Schedule {
            next_execution_time: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            repeat_interval: Some(RepeatInterval::Daily),
        };
        let json = serde_json::to_value(&start).unwrap();
        assert_eq!(json["startType"], "schedule");
        assert_eq!(json["repeatInterval"], "daily");
        assert!(json["nextExecutionTime"].is_string());
    }

    #[test]
    fn event_start_serializes_selector() {
        let start = StartTrigger::Event {
            event: EventSelector::FormSubmission,
        };
        let json = serde_json::to_value(&start).unwrap();
        assert_eq!(json["startType"], "event");
        assert_eq!(json["event"], "form-submission");
    }

    #[test]
    fn record_flattens_start_and_omits_missing_id() {
        let record = AutomationRecord {
            id: None,
            name: "Welcome flow".to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
            start: StartTrigger::Event {
                event: EventSelector::Sale,
            },
            testing: true,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["startType"], "event");
        assert_eq!(json["testing"], true);
    }
}
