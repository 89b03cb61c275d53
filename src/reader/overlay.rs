use image::{Rgba, RgbaImage};
use imageproc::{drawing::draw_line_segment_mut, drawing::draw_filled_rect_mut, rect::Rect};
use tracing::debug;

use super::{
    catalog::SLOT_COUNT,
    detector::Detection,
    geometry::{min_point, project_polygon, OriginTransform, Point},
};
use crate::{common::markup::escape, Config};

// Slot colors used when rasterizing
//------------------------------------------------------------------------------

const SLOT_COLORS: [Rgba<u8>; SLOT_COUNT] = [
    Rgba([230, 25, 75, 255]),
    Rgba([60, 180, 75, 255]),
    Rgba([0, 130, 200, 255]),
    Rgba([245, 130, 48, 255]),
    Rgba([145, 30, 180, 255]),
];

const LABEL_MARK_SZ: u32 = 6;

// Overlay shape
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayShape {
    pub polygon: [Point; 4],
    pub label_at: Point,
    pub label: String,
    pub slot: usize,
}

impl OverlayShape {
    pub fn points(&self) -> String {
        self.polygon.iter().map(Point::to_string).collect::<Vec<_>>().join(" ")
    }
}

// Overlay
//------------------------------------------------------------------------------

/// Detected regions drawn in view-box space over the source image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlay {
    pub width: u32,
    pub height: u32,
    pub shapes: Vec<OverlayShape>,
}

impl Overlay {
    pub fn new(width: u32, height: u32) -> Self {
        debug!("Overlay view box: 0 0 {width} {height}");
        Self { width, height, shapes: Vec::new() }
    }

    pub fn draw(&mut self, detections: &[Detection], transform: Option<&OriginTransform>) {
        self.shapes.clear();
        for (i, det) in detections.iter().enumerate() {
            let shape = OverlayShape {
                polygon: project_polygon(&det.corner_points, transform),
                label_at: min_point(&det.corner_points, transform),
                label: det.raw_value.clone(),
                slot: i % SLOT_COUNT,
            };
            debug!("Polygon points: {}, label at: {}", shape.points(), shape.label_at);
            self.shapes.push(shape);
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn view_box(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }

    pub fn to_svg(&self, cfg: &Config) -> String {
        let extracted = cfg.class_name("extracted");
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{}\" class=\"{} {}\">",
            self.view_box(),
            cfg.class_name("overlay"),
            cfg.class_name("img")
        );
        for shape in self.shapes.iter() {
            let cn = cfg.class_name(&format!("c{}", shape.slot));
            svg.push_str(&format!(
                "<polygon points=\"{}\" class=\"{extracted} {cn}\"/>",
                shape.points()
            ));
            svg.push_str(&format!(
                "<text x=\"{}\" y=\"{}\" class=\"{} {cn}\">{}</text>",
                shape.label_at.x,
                shape.label_at.y,
                cfg.class_name("label"),
                escape(&shape.label)
            ));
        }
        svg.push_str("</svg>");
        svg
    }

    /// Draws the polygon outlines and a label marker onto `canvas`, which is
    /// expected to have the view-box size. Out of bounds pixels are dropped.
    pub fn annotate(&self, canvas: &mut RgbaImage) {
        for shape in self.shapes.iter() {
            let clr = SLOT_COLORS[shape.slot % SLOT_COUNT];
            for (i, a) in shape.polygon.iter().enumerate() {
                let b = shape.polygon[(i + 1) % 4];
                draw_line_segment_mut(
                    canvas,
                    (a.x as f32, a.y as f32),
                    (b.x as f32, b.y as f32),
                    clr,
                );
            }
            let mark = Rect::at(shape.label_at.x as i32, shape.label_at.y as i32)
                .of_size(LABEL_MARK_SZ, LABEL_MARK_SZ);
            draw_filled_rect_mut(canvas, mark, clr);
        }
    }
}
