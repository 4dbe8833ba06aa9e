use super::{OcrEngine, OcrError, TextAnnotation};
use crate::objects::ObjectStore;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::ocr::Vertex;
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f32,
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

/// Google Cloud Vision `TEXT_DETECTION` over the REST API. The image is read
/// from the object store and sent inline.
pub struct VisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    objects: Arc<dyn ObjectStore>,
}

impl VisionClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        objects: Arc<dyn ObjectStore>,
    ) -> Result<Self, OcrError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key,
            objects,
        })
    }
}

fn into_annotations(response: AnnotateResponse) -> Result<Vec<TextAnnotation>, OcrError> {
    let Some(first) = response.responses.into_iter().next() else {
        return Ok(Vec::new());
    };
    if let Some(status) = first.error {
        return Err(OcrError::Engine(status.message));
    }
    Ok(first
        .text_annotations
        .into_iter()
        .map(|a| TextAnnotation {
            description: a.description,
            score: a.score,
            bounding_poly: a.bounding_poly.map(|p| p.vertices).unwrap_or_default(),
        })
        .collect())
}

#[async_trait]
impl OcrEngine for VisionClient {
    async fn detect_text(&self, image_path: &str) -> Result<Vec<TextAnnotation>, OcrError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| OcrError::NotConfigured("IDCARD_VISION_API_KEY is not set".to_string()))?;

        let bytes = self.objects.get(image_path).await?;
        info!("Sending {} ({} bytes) to Vision text detection", image_path, bytes.len());

        let body = json!({
            "requests": [{
                "image": { "content": BASE64.encode(&bytes) },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });
        let response: AnnotateResponse = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        into_annotations(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_annotations_in_order() {
        let raw = r#"{"responses":[{"textAnnotations":[
            {"locale":"en","description":"ACME\nName: Jane","boundingPoly":{"vertices":[{"x":1,"y":2}]}},
            {"description":"ACME","boundingPoly":{"vertices":[{"x":1},{"x":5,"y":2}]}},
            {"description":"Name:"}
        ]}]}"#;
        let response: AnnotateResponse = serde_json::from_str(raw).unwrap();
        let annotations = into_annotations(response).unwrap();
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[1].description, "ACME");
        assert_eq!(annotations[1].bounding_poly[0], Vertex { x: 1, y: 0 });
        assert!(annotations[2].bounding_poly.is_empty());
    }

    #[test]
    fn empty_response_means_no_text() {
        let response: AnnotateResponse = serde_json::from_str(r#"{"responses":[{}]}"#).unwrap();
        assert!(into_annotations(response).unwrap().is_empty());
    }

    #[test]
    fn engine_error_is_surfaced() {
        let response: AnnotateResponse =
            serde_json::from_str(r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#)
                .unwrap();
        assert!(matches!(into_annotations(response), Err(OcrError::Engine(m)) if m == "Bad image data."));
    }

    #[tokio::test]
    async fn client_without_key_reports_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        let objects = Arc::new(crate::objects::LocalObjectStore::new(dir.path(), "http://localhost"));
        let client = VisionClient::new("http://localhost/v1/images:annotate", None, objects).unwrap();
        assert!(matches!(
            client.detect_text("templates/t1/card.png").await,
            Err(OcrError::NotConfigured(_))
        ));
    }
}
