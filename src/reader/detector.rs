use std::cell::Cell;

use async_trait::async_trait;
use image::DynamicImage;
use rqrr::PreparedImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::geometry::Point;
use crate::QrioResult;

// Detection
//------------------------------------------------------------------------------

/// One decoded code: its four corners, clockwise from top-left in
/// source-image pixels, and the decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub corner_points: [Point; 4],
    pub raw_value: String,
}

impl Detection {
    pub fn new(corner_points: [Point; 4], raw_value: impl Into<String>) -> Self {
        Self { corner_points, raw_value: raw_value.into() }
    }

    pub fn text(&self) -> &str {
        &self.raw_value
    }
}

// Detection capability
//------------------------------------------------------------------------------

/// Turns an image into a list of raw detections.
///
/// An empty `supported_formats` result means the capability is not real and
/// must not be used.
#[async_trait(?Send)]
pub trait Detector {
    async fn supported_formats(&self) -> Vec<String>;

    async fn detect(&self, img: &DynamicImage) -> QrioResult<Vec<Detection>>;
}

// QR detector
//------------------------------------------------------------------------------

/// Pure Rust QR capability: finds every QR grid in the image and decodes it.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDetector;

#[async_trait(?Send)]
impl Detector for QrDetector {
    async fn supported_formats(&self) -> Vec<String> {
        vec!["qr_code".to_string()]
    }

    async fn detect(&self, img: &DynamicImage) -> QrioResult<Vec<Detection>> {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        let mut prepared = PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
            gray.get_pixel(x as u32, y as u32)[0]
        });

        let mut res = Vec::new();
        for grid in prepared.detect_grids() {
            let corners = grid.bounds.map(|p| Point::new(p.x as f64, p.y as f64));
            match grid.decode() {
                Ok((_meta, text)) => res.push(Detection::new(corners, text)),
                Err(e) => warn!("Skipping undecodable grid at {:?}: {e:?}", corners[0]),
            }
        }
        Ok(res)
    }
}

// Canned detector
//------------------------------------------------------------------------------

/// Returns a fixed list of detections for every image, for hosts without a
/// real capability and for exercising the reader.
#[derive(Debug, Clone)]
pub struct CannedDetector {
    detections: Vec<Detection>,
    tag_runs: bool,
    runs: Cell<usize>,
}

impl CannedDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections, tag_runs: false, runs: Cell::new(0) }
    }

    /// Appends `__<pass>` to the first payload so each pass yields a new message.
    pub fn tag_runs(mut self) -> Self {
        self.tag_runs = true;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.get()
    }
}

#[async_trait(?Send)]
impl Detector for CannedDetector {
    async fn supported_formats(&self) -> Vec<String> {
        vec!["qr_code".to_string()]
    }

    async fn detect(&self, _img: &DynamicImage) -> QrioResult<Vec<Detection>> {
        let run = self.runs.get() + 1;
        self.runs.set(run);

        let mut res = self.detections.clone();
        if self.tag_runs {
            if let Some(first) = res.first_mut() {
                first.raw_value = format!("{}__{run}", first.raw_value);
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
mod detector_tests {
    use image::{DynamicImage, GrayImage, Luma};

    use super::{CannedDetector, Detection, Detector, QrDetector};
    use crate::reader::geometry::Point;

    fn square() -> [Point; 4] {
        [Point::new(10.0, 10.0), Point::new(150.0, 10.0), Point::new(150.0, 150.0), Point::new(10.0, 150.0)]
    }

    #[tokio::test]
    async fn test_canned_tagging() {
        let det = CannedDetector::new(vec![Detection::new(square(), "test")]).tag_runs();
        let img = DynamicImage::new_luma8(4, 4);
        assert_eq!(det.detect(&img).await.unwrap()[0].raw_value, "test__1");
        assert_eq!(det.detect(&img).await.unwrap()[0].raw_value, "test__2");
        assert_eq!(det.runs(), 2);
    }

    #[tokio::test]
    async fn test_canned_empty() {
        let det = CannedDetector::new(vec![]).tag_runs();
        let img = DynamicImage::new_luma8(4, 4);
        assert!(det.detect(&img).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_image_has_no_codes() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([255])));
        assert!(QrDetector.detect(&img).await.unwrap().is_empty());
        assert_eq!(QrDetector.supported_formats().await, vec!["qr_code".to_string()]);
    }

    #[test]
    fn test_detection_json() {
        let d = Detection::new(square(), "x");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.starts_with("{\"cornerPoints\":[{\"x\":10.0,\"y\":10.0}"));
        assert!(json.ends_with("\"rawValue\":\"x\"}"));
    }
}
