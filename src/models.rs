//! Data models and structures
//!
//! Defines the detection modes offered by the console, the uploaded images
//! that flow through an analysis run, and the typed results interpreted from
//! the detection service's responses.

use crate::codec::DecodedImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed set of analysis endpoints exposed by the detection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    Text,
    Screw,
    Jewels,
    Incabloc,
    Notches,
    AllScrews,
    AllScrewsExp,
    AxisSystem,
    WatchModel,
    WatchRolexCaseback,
    Authenticate,
    CartierTool,
}

impl DetectionMode {
    /// Sidebar order.
    pub const ALL: [DetectionMode; 12] = [
        DetectionMode::Text,
        DetectionMode::Screw,
        DetectionMode::Jewels,
        DetectionMode::Incabloc,
        DetectionMode::Notches,
        DetectionMode::AllScrews,
        DetectionMode::AllScrewsExp,
        DetectionMode::AxisSystem,
        DetectionMode::WatchModel,
        DetectionMode::WatchRolexCaseback,
        DetectionMode::Authenticate,
        DetectionMode::CartierTool,
    ];

    /// Endpoint path appended to the service base URL.
    pub fn path(self) -> &'static str {
        match self {
            DetectionMode::Text => "/detect/text",
            DetectionMode::Screw => "/detect/screw",
            DetectionMode::Jewels => "/detect/jewels",
            DetectionMode::Incabloc => "/detect/incabloc",
            DetectionMode::Notches => "/detect/notches",
            DetectionMode::AllScrews => "/detect/all_screws",
            DetectionMode::AllScrewsExp => "/detect/all_screws_exp",
            DetectionMode::AxisSystem => "/detect/axis_system",
            DetectionMode::WatchModel => "/detect/watch_model",
            DetectionMode::WatchRolexCaseback => "/detect/watch_rolex_caseback",
            DetectionMode::Authenticate => "/authenticate/watch",
            DetectionMode::CartierTool => "/cartier-tool",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetectionMode::Text => "Text detection",
            DetectionMode::Screw => "Screw detection",
            DetectionMode::Jewels => "Jewel detection",
            DetectionMode::Incabloc => "Incabloc detection",
            DetectionMode::Notches => "Notch detection",
            DetectionMode::AllScrews => "All screws",
            DetectionMode::AllScrewsExp => "All screws (experimental)",
            DetectionMode::AxisSystem => "Axis system",
            DetectionMode::WatchModel => "Watch model",
            DetectionMode::WatchRolexCaseback => "Rolex caseback",
            DetectionMode::Authenticate => "Authentication",
            DetectionMode::CartierTool => "Cartier tool",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.path() == path)
    }

    /// Only the all-screws endpoint emits a second visualization (`image_em`).
    pub fn is_dual_image(self) -> bool {
        matches!(self, DetectionMode::AllScrews)
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A file received from the browser, kept in upload order for one run.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: String, content_type: String, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name,
            content_type,
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrewDetection {
    pub angle: String,
    pub id: String,
}

/// Identity metadata reported by the model, caseback, authentication and
/// cartier endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchIdentity {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub model_number: Option<String>,
    pub serial_number: Option<String>,
    pub axis: Option<String>,
    pub authentication: Option<String>,
}

impl WatchIdentity {
    /// Label/value rows in display order; absent values are left out.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        [
            ("Brand", &self.brand),
            ("Model", &self.model),
            ("Model Number", &self.model_number),
            ("Serial Number", &self.serial_number),
            ("Axis", &self.axis),
            ("Authentication", &self.authentication),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

/// Mode-specific part of a detection result. Each variant declares exactly
/// the fields its endpoint reports.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultDetails {
    Text {
        texts: Vec<String>,
    },
    Screws {
        screws: Vec<ScrewDetection>,
    },
    Visual,
    DualImage {
        secondary_image: Option<DecodedImage>,
    },
    Axis {
        axis: Option<String>,
    },
    Identity {
        identity: WatchIdentity,
    },
    Caseback {
        identity: WatchIdentity,
        texts: Vec<String>,
    },
    Authentication {
        verdict: Option<String>,
    },
    CartierTool {
        identity: WatchIdentity,
        texts: Vec<String>,
        screws: Vec<ScrewDetection>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub mode: DetectionMode,
    pub primary_image: Option<DecodedImage>,
    pub details: ResultDetails,
    pub raw: serde_json::Value,
}

impl DetectionResult {
    pub fn secondary_image(&self) -> Option<&DecodedImage> {
        match &self.details {
            ResultDetails::DualImage { secondary_image } if self.mode.is_dual_image() => {
                secondary_image.as_ref()
            }
            _ => None,
        }
    }

    /// Label/value rows shown above the tables.
    pub fn identity_rows(&self) -> Vec<(&'static str, &str)> {
        match &self.details {
            ResultDetails::Axis { axis } => axis
                .as_deref()
                .map(|a| vec![("Axis", a)])
                .unwrap_or_default(),
            ResultDetails::Authentication { verdict } => verdict
                .as_deref()
                .map(|v| vec![("Authentication", v)])
                .unwrap_or_default(),
            ResultDetails::Identity { identity }
            | ResultDetails::Caseback { identity, .. }
            | ResultDetails::CartierTool { identity, .. } => identity.rows(),
            _ => Vec::new(),
        }
    }

    pub fn texts(&self) -> &[String] {
        match &self.details {
            ResultDetails::Text { texts }
            | ResultDetails::Caseback { texts, .. }
            | ResultDetails::CartierTool { texts, .. } => texts.as_slice(),
            _ => &[],
        }
    }

    pub fn screws(&self) -> &[ScrewDetection] {
        match &self.details {
            ResultDetails::Screws { screws } | ResultDetails::CartierTool { screws, .. } => {
                screws.as_slice()
            }
            _ => &[],
        }
    }
}

/// Outcome of one image in an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelOutcome {
    Ready(DetectionResult),
    Failed(String),
}

/// One rendered region: an uploaded image and what the service said about it.
#[derive(Debug, Clone)]
pub struct Panel {
    pub index: usize,
    pub upload: UploadedImage,
    pub outcome: PanelOutcome,
}
