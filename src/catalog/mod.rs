//! Block Catalog: the static registry of automation step kinds.
//!
//! Every step a user can drop onto the canvas is described here: its wire
//! tag, display label, default parameters, and how the rest of the core
//! classifies it (trigger, pass-through, social platform).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::workflow::types::StepParams;

/// Kind tag for one automation step.
///
/// Serializes to the wire tags the backend expects (`"form-trigger"`,
/// `"content-generation-text"`, ...). Exactly one trigger kind is allowed
/// per graph; see [`crate::workflow::graph::FlowGraph::add_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Starts the automation when a capture form is submitted
    #[serde(rename = "form-trigger")]
    FormTrigger,
    /// Starts the automation when a sale completes
    #[serde(rename = "sale-trigger")]
    SaleTrigger,
    /// AI text generation feeding downstream message fields
    #[serde(rename = "content-generation-text")]
    TextGenerator,
    /// AI image generation; passes upstream text content through
    #[serde(rename = "content-generation-image")]
    ImageGenerator,
    /// Delays execution for a configured duration
    #[serde(rename = "wait")]
    Wait,
    /// Sends an email to a recipient list
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "twitter")]
    Twitter,
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "whatsapp")]
    Whatsapp,
    #[serde(rename = "linkedin")]
    Linkedin,
    #[serde(rename = "youtube")]
    Youtube,
    #[serde(rename = "instagram")]
    Instagram,
}

impl BlockKind {
    /// Every kind, in catalog display order.
    pub const ALL: [BlockKind; 12] = [
        BlockKind::FormTrigger,
        BlockKind::SaleTrigger,
        BlockKind::TextGenerator,
        BlockKind::ImageGenerator,
        BlockKind::Wait,
        BlockKind::Email,
        BlockKind::Twitter,
        BlockKind::Facebook,
        BlockKind::Whatsapp,
        BlockKind::Linkedin,
        BlockKind::Youtube,
        BlockKind::Instagram,
    ];

    /// Wire tag, also used to build progress keys (`"email[0]"`).
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::FormTrigger => "form-trigger",
            BlockKind::SaleTrigger => "sale-trigger",
            BlockKind::TextGenerator => "content-generation-text",
            BlockKind::ImageGenerator => "content-generation-image",
            BlockKind::Wait => "wait",
            BlockKind::Email => "email",
            BlockKind::Twitter => "twitter",
            BlockKind::Facebook => "facebook",
            BlockKind::Whatsapp => "whatsapp",
            BlockKind::Linkedin => "linkedin",
            BlockKind::Youtube => "youtube",
            BlockKind::Instagram => "instagram",
        }
    }

    /// Trigger kinds start an automation; a graph holds at most one.
    pub fn is_trigger(self) -> bool {
        matches!(self, BlockKind::FormTrigger | BlockKind::SaleTrigger)
    }

    /// Pass-through kinds do not break the producer chain when the
    /// dependency resolver walks backward from a consuming step.
    pub fn is_pass_through(self) -> bool {
        matches!(self, BlockKind::Wait | BlockKind::ImageGenerator)
    }

    /// The social platform behind this kind, if it is a social-post step.
    pub fn platform(self) -> Option<Platform> {
        match self {
            BlockKind::Twitter => Some(Platform::Twitter),
            BlockKind::Facebook => Some(Platform::Facebook),
            BlockKind::Whatsapp => Some(Platform::Whatsapp),
            BlockKind::Linkedin => Some(Platform::Linkedin),
            BlockKind::Youtube => Some(Platform::Youtube),
            BlockKind::Instagram => Some(Platform::Instagram),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social platform whose account connection gates node insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Facebook,
    Whatsapp,
    Linkedin,
    Youtube,
    Instagram,
}

impl Platform {
    /// Path segment used by the connection-status API.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Whatsapp => "whatsapp",
            Platform::Linkedin => "linkedin",
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
        }
    }

    /// The step kind that posts to this platform.
    pub fn block_kind(self) -> BlockKind {
        match self {
            Platform::Twitter => BlockKind::Twitter,
            Platform::Facebook => BlockKind::Facebook,
            Platform::Whatsapp => BlockKind::Whatsapp,
            Platform::Linkedin => BlockKind::Linkedin,
            Platform::Youtube => BlockKind::Youtube,
            Platform::Instagram => BlockKind::Instagram,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry: the display label and default params for a kind.
#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    pub kind: BlockKind,
    pub label: &'static str,
}

impl BlockSpec {
    /// Fresh default parameters for a node of this kind.
    pub fn default_params(&self) -> StepParams {
        StepParams::default_for(self.kind)
    }
}

/// Catalog lookup for a step kind.
pub fn spec(kind: BlockKind) -> BlockSpec {
    let label = match kind {
        BlockKind::FormTrigger => "Form submitted",
        BlockKind::SaleTrigger => "Sale completed",
        BlockKind::TextGenerator => "Generate text",
        BlockKind::ImageGenerator => "Generate image",
        BlockKind::Wait => "Wait",
        BlockKind::Email => "Send email",
        BlockKind::Twitter => "Post to Twitter",
        BlockKind::Facebook => "Post to Facebook",
        BlockKind::Whatsapp => "Send WhatsApp message",
        BlockKind::Linkedin => "Post to LinkedIn",
        BlockKind::Youtube => "Publish to YouTube",
        BlockKind::Instagram => "Post to Instagram",
    };
    BlockSpec { kind, label }
}
