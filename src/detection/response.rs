//! Interpretation of detection service replies.
//!
//! Every key is optional. A key that is missing, has the wrong type or holds
//! an undecodable image simply leaves its field empty; only a body that is not
//! JSON at all is rejected.

use crate::codec::{self, DecodedImage};
use crate::models::{
    DetectionMode, DetectionResult, ResultDetails, ScrewDetection, WatchIdentity,
};
use crate::{Error, Result};
use serde_json::{Map, Value};

pub fn parse(body: &str, mode: DetectionMode) -> Result<DetectionResult> {
    let raw: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Detection response for {} is not JSON: {}", mode, e);
        Error::MalformedResponse(e.to_string())
    })?;

    let empty = Map::new();
    let fields = match raw.as_object() {
        Some(fields) => fields,
        None => {
            tracing::warn!("Detection response for {} is not a JSON object", mode);
            &empty
        }
    };

    let details = match mode {
        DetectionMode::Text => ResultDetails::Text {
            texts: string_list(fields, "text"),
        },
        DetectionMode::Screw | DetectionMode::AllScrewsExp => ResultDetails::Screws {
            screws: screw_list(fields),
        },
        DetectionMode::Jewels | DetectionMode::Incabloc | DetectionMode::Notches => {
            ResultDetails::Visual
        }
        DetectionMode::AllScrews => ResultDetails::DualImage {
            secondary_image: image_field(fields, "image_em"),
        },
        DetectionMode::AxisSystem => ResultDetails::Axis {
            axis: string_field(fields, "axis"),
        },
        DetectionMode::WatchModel => ResultDetails::Identity {
            identity: WatchIdentity {
                brand: string_field(fields, "brand"),
                model: string_field(fields, "model"),
                model_number: string_field(fields, "model_number"),
                ..Default::default()
            },
        },
        DetectionMode::WatchRolexCaseback => ResultDetails::Caseback {
            identity: WatchIdentity {
                model_number: string_field(fields, "model_number"),
                serial_number: string_field(fields, "serial_number"),
                ..Default::default()
            },
            texts: string_list(fields, "text"),
        },
        DetectionMode::Authenticate => ResultDetails::Authentication {
            verdict: string_field(fields, "authentication_verdict"),
        },
        DetectionMode::CartierTool => ResultDetails::CartierTool {
            identity: full_identity(fields),
            texts: string_list(fields, "text"),
            screws: screw_list(fields),
        },
    };

    let primary_image = image_field(fields, "image");

    Ok(DetectionResult {
        mode,
        primary_image,
        details,
        raw,
    })
}

fn full_identity(fields: &Map<String, Value>) -> WatchIdentity {
    WatchIdentity {
        brand: string_field(fields, "brand"),
        model: string_field(fields, "model"),
        model_number: string_field(fields, "model_number"),
        serial_number: string_field(fields, "serial_number"),
        axis: string_field(fields, "axis"),
        authentication: string_field(fields, "authentication_verdict"),
    }
}

fn image_field(fields: &Map<String, Value>, key: &str) -> Option<DecodedImage> {
    let payload = fields.get(key)?.as_str()?;
    match codec::decode(payload) {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!("Dropping '{}' image from response: {}", key, e);
            None
        }
    }
}

/// Strings are taken as-is; numbers and booleans in their JSON form.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(scalar_text)
}

fn string_list(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => scalar_text(other).into_iter().collect(),
    }
}

fn screw_list(fields: &Map<String, Value>) -> Vec<ScrewDetection> {
    let Some(Value::Array(items)) = fields.get("screws") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let angle = item.get("angle").and_then(scalar_text)?;
            let id = item.get("id").and_then(scalar_text)?;
            Some(ScrewDetection { angle, id })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use image::ImageFormat;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn png_b64() -> String {
        let img = image::RgbImage::from_pixel(3, 3, image::Rgb([0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = parse("<html>502 Bad Gateway</html>", DetectionMode::Text).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_object_yields_absent_fields_for_every_mode() {
        for mode in DetectionMode::ALL {
            let result = parse("{}", mode).unwrap();
            assert!(result.primary_image.is_none());
            assert!(result.secondary_image().is_none());
            assert!(result.texts().is_empty());
            assert!(result.screws().is_empty());
            assert!(result.identity_rows().is_empty());
        }
    }

    #[test]
    fn test_non_object_json_yields_absent_fields() {
        let result = parse("[1, 2, 3]", DetectionMode::CartierTool).unwrap();
        assert!(result.primary_image.is_none());
        assert!(result.identity_rows().is_empty());
    }

    #[test]
    fn test_dual_image_mode_decodes_both_images() {
        let body = json!({ "image": png_b64(), "image_em": png_b64() }).to_string();
        let result = parse(&body, DetectionMode::AllScrews).unwrap();

        assert!(result.primary_image.is_some());
        assert!(result.secondary_image().is_some());
    }

    #[test]
    fn test_dual_image_mode_without_secondary() {
        let body = json!({ "image": png_b64() }).to_string();
        let result = parse(&body, DetectionMode::AllScrews).unwrap();

        assert!(result.primary_image.is_some());
        assert!(result.secondary_image().is_none());
    }

    #[test]
    fn test_secondary_image_ignored_outside_dual_mode() {
        let body = json!({ "image": png_b64(), "image_em": png_b64() }).to_string();
        let result = parse(&body, DetectionMode::AllScrewsExp).unwrap();

        assert!(result.primary_image.is_some());
        assert!(result.secondary_image().is_none());
    }

    #[test]
    fn test_undecodable_image_is_dropped_not_fatal() {
        let body = json!({ "image": "%%%garbage%%%", "text": ["OMEGA"] }).to_string();
        let result = parse(&body, DetectionMode::Text).unwrap();

        assert!(result.primary_image.is_none());
        assert_eq!(result.texts(), ["OMEGA".to_string()]);
    }

    #[test]
    fn test_text_list_is_lenient() {
        let body = json!({ "text": ["Swiss", 1968, null, {"nested": true}, "Made"] }).to_string();
        let result = parse(&body, DetectionMode::Text).unwrap();
        assert_eq!(
            result.texts(),
            ["Swiss".to_string(), "1968".to_string(), "Made".to_string()]
        );

        let body = json!({ "text": 42 }).to_string();
        let result = parse(&body, DetectionMode::Text).unwrap();
        assert_eq!(result.texts(), ["42".to_string()]);
    }

    #[test]
    fn test_screws_skip_incomplete_entries() {
        let body = json!({
            "screws": [
                { "angle": 30, "id": "S0" },
                { "angle": "40" },
                "S9",
                { "angle": 65.5, "id": "S1" }
            ]
        })
        .to_string();
        let result = parse(&body, DetectionMode::Screw).unwrap();

        assert_eq!(
            result.screws(),
            [
                ScrewDetection {
                    angle: "30".to_string(),
                    id: "S0".to_string()
                },
                ScrewDetection {
                    angle: "65.5".to_string(),
                    id: "S1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_field_set_follows_mode_not_payload() {
        let body = json!({
            "brand": "Rolex",
            "model": "Submariner",
            "model_number": "116610",
            "serial_number": "Z123",
            "text": ["ROLEX"],
            "screws": [{ "angle": "10", "id": "S0" }]
        })
        .to_string();

        let model = parse(&body, DetectionMode::WatchModel).unwrap();
        assert_eq!(
            model.identity_rows(),
            vec![
                ("Brand", "Rolex"),
                ("Model", "Submariner"),
                ("Model Number", "116610")
            ]
        );
        assert!(model.texts().is_empty());
        assert!(model.screws().is_empty());

        let caseback = parse(&body, DetectionMode::WatchRolexCaseback).unwrap();
        assert_eq!(
            caseback.identity_rows(),
            vec![("Model Number", "116610"), ("Serial Number", "Z123")]
        );
        assert_eq!(caseback.texts(), ["ROLEX".to_string()]);

        let jewels = parse(&body, DetectionMode::Jewels).unwrap();
        assert_eq!(jewels.details, ResultDetails::Visual);
        assert!(jewels.identity_rows().is_empty());
    }

    #[test]
    fn test_cartier_tool_reads_everything() {
        let body = json!({
            "brand": "Cartier",
            "model": "Ballon Bleu",
            "model_number": "4377",
            "serial_number": "47108BX",
            "axis": "Founded",
            "authentication_verdict": "same watch",
            "text": ["Cartier", "Automatic"],
            "screws": [{ "angle": "30", "id": "S0" }]
        })
        .to_string();

        let result = parse(&body, DetectionMode::CartierTool).unwrap();
        assert_eq!(result.identity_rows().len(), 6);
        assert_eq!(result.identity_rows()[5], ("Authentication", "same watch"));
        assert_eq!(result.texts().len(), 2);
        assert_eq!(result.screws().len(), 1);
    }

    #[test]
    fn test_axis_and_authentication_rows() {
        let axis = parse(r#"{"axis": "Founded"}"#, DetectionMode::AxisSystem).unwrap();
        assert_eq!(axis.identity_rows(), vec![("Axis", "Founded")]);

        let auth = parse(
            r#"{"authentication_verdict": "genuine"}"#,
            DetectionMode::Authenticate,
        )
        .unwrap();
        assert_eq!(auth.identity_rows(), vec![("Authentication", "genuine")]);
    }

    #[test]
    fn test_raw_body_is_kept() {
        let result = parse(r#"{"unexpected": 1}"#, DetectionMode::Notches).unwrap();
        assert_eq!(result.raw, json!({ "unexpected": 1 }));
    }
}
