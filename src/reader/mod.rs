pub mod catalog;
pub mod detector;
pub mod geometry;
pub mod messages;
pub mod overlay;
pub mod selection;

use std::{fs, path::Path, rc::Rc};

use image::{DynamicImage, RgbaImage};
use tracing::{debug, info, warn, Level};

pub use catalog::{Catalog, CatalogEntry, SLOT_COUNT};
pub use detector::{CannedDetector, Detection, Detector, QrDetector};
pub use geometry::{min_point, polygon_points, project, project_polygon, OriginTransform, Point};
pub use messages::render_messages;
pub use overlay::{Overlay, OverlayShape};
pub use selection::Selection;

use crate::{Config, QrioError, QrioResult, Receiver};

pub const STATUS_INITIALIZING: &str = "Initializing...";

/// Host callback receiving the selected messages on close. Returning true
/// means the result was handled and the receiver is left untouched.
pub type Callback<'r> = Box<dyn FnMut(&[String]) -> bool + 'r>;

// Reader state
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Idle,
    AwaitingCapability,
    Ready,
    Detecting,
    Showing,
}

// Reader
//------------------------------------------------------------------------------

/// Scanner widget. Owns the message catalog and selection for its sessions.
///
/// A session runs `open` -> `init_capability` -> any number of `scan`s ->
/// `close`. Scans take `&mut self`, so a later image load can only start once
/// the previous detection has been applied.
pub struct Reader<'r> {
    cfg: Rc<Config>,
    state: ReaderState,
    platform: Option<Box<dyn Detector>>,
    detector: Option<Box<dyn Detector>>,

    catalog: Catalog,
    selection: Selection,
    transform: Option<OriginTransform>,
    overlay: Overlay,
    image: Option<DynamicImage>,
    image_visible: bool,
    list_visible: bool,
    status: String,
    alert: Option<String>,

    receiver: Option<&'r mut dyn Receiver>,
    callback: Option<Callback<'r>>,
}

impl<'r> Reader<'r> {
    pub fn new(cfg: Rc<Config>) -> Self {
        let multi = cfg.multi_select;
        Self {
            cfg,
            state: ReaderState::Idle,
            platform: None,
            detector: None,
            catalog: Catalog::new(),
            selection: Selection::new(multi),
            transform: None,
            overlay: Overlay::default(),
            image: None,
            image_visible: false,
            list_visible: false,
            status: String::new(),
            alert: None,
            receiver: None,
            callback: None,
        }
    }

    /// Registers the capability the platform provides, if any.
    pub fn with_platform_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.platform = Some(detector);
        self
    }

    pub fn open(&mut self, receiver: Option<&'r mut dyn Receiver>, callback: Option<Callback<'r>>) {
        info!("Opening reader");
        self.receiver = receiver;
        self.callback = callback;
        self.alert = None;
        if self.detector.is_some() {
            self.state = ReaderState::Ready;
            self.set_advisory(self.cfg.alerts.ready.clone());
        } else {
            self.state = ReaderState::AwaitingCapability;
            self.set_advisory(STATUS_INITIALIZING.to_string());
        }
    }

    /// Resolves the detection capability. Returns whether one is available;
    /// without one the reader stays usable for the cached messages only.
    pub async fn init_capability(&mut self) -> bool {
        if self.state != ReaderState::AwaitingCapability {
            return self.detector.is_some();
        }

        let mut detector = None;
        if let Some(platform) = self.platform.take() {
            let formats = platform.supported_formats().await;
            debug!("Platform formats: {formats:?}");
            if !formats.is_empty() {
                detector = Some(platform);
            }
        }
        if detector.is_none() {
            detector = self.cfg.fallback_detector.as_ref().map(|f| f.create());
        }

        self.state = ReaderState::Ready;
        match detector {
            Some(d) => {
                info!("Detection capability acquired");
                self.detector = Some(d);
                self.set_advisory(self.cfg.alerts.ready.clone());
                true
            }
            None => {
                info!("No detection capability");
                self.set_advisory(self.cfg.alerts.no_capability.clone());
                false
            }
        }
    }

    fn ensure_ready(&self) -> QrioResult<()> {
        match self.state {
            ReaderState::Idle => Err(QrioError::NotOpen),
            ReaderState::AwaitingCapability => Err(QrioError::CapabilityPending),
            _ => Ok(()),
        }
    }

    pub async fn scan_file(&mut self, path: impl AsRef<Path>) -> QrioResult<usize> {
        self.ensure_ready()?;
        let bytes = match fs::read(path.as_ref()) {
            Ok(b) => b,
            Err(e) => {
                self.alert = Some(self.cfg.alerts.no_file.clone());
                self.set_advisory(String::new());
                return Err(QrioError::FileReadFailure(e));
            }
        };
        self.scan(&bytes).await
    }

    /// Runs one scan pass over an encoded image. Returns the number of
    /// detections found in it.
    pub async fn scan(&mut self, bytes: &[u8]) -> QrioResult<usize> {
        self.ensure_ready()?;
        self.state = ReaderState::Detecting;

        let img = match image::load_from_memory(bytes) {
            Ok(img) => img,
            Err(e) => {
                self.state = ReaderState::Ready;
                self.show_detect(false);
                self.set_advisory(self.cfg.alerts.not_an_image.clone());
                return Err(QrioError::ImageLoadFailure(e));
            }
        };
        self.scan_image(img).await
    }

    /// Runs one scan pass over an already decoded image.
    pub async fn scan_image(&mut self, img: DynamicImage) -> QrioResult<usize> {
        self.ensure_ready()?;
        self.state = ReaderState::Detecting;

        let (w, h) = (img.width(), img.height());
        self.overlay = Overlay::new(w, h);
        self.show_detect(true);

        let Some(detector) = self.detector.as_ref() else {
            self.state = ReaderState::Ready;
            self.image = Some(img);
            self.set_advisory(self.cfg.alerts.no_capability_short.clone());
            return Err(QrioError::NoDetectionCapability);
        };
        let res = detector.detect(&img).await;
        let detections = match res {
            Ok(d) => d,
            Err(e) => {
                let e = match e {
                    QrioError::Detection(_) => e,
                    e => QrioError::Detection(e.to_string()),
                };
                warn!("{e}");
                self.state = ReaderState::Ready;
                self.show_detect(false);
                self.set_advisory(e.to_string());
                return Err(e);
            }
        };
        if tracing::enabled!(Level::DEBUG) {
            debug!("Detected codes: {}", serde_json::to_string_pretty(&detections)?);
        }

        self.state = ReaderState::Showing;
        self.transform = OriginTransform::for_image(w, h);
        self.catalog.reconcile(&detections);
        self.overlay.draw(&detections, self.transform.as_ref());
        self.selection.reset(self.catalog.len(), self.catalog.first_fresh());
        self.list_visible = true;
        self.render();

        self.image = Some(img);
        self.state = ReaderState::Ready;
        Ok(detections.len())
    }

    /// Flips the entry at `index`. Out of range indices are ignored.
    pub fn toggle(&mut self, index: usize) -> bool {
        let res = self.selection.toggle(index);
        self.render();
        res
    }

    pub fn set_multi_select(&mut self, enabled: bool) {
        self.selection.set_multi_select(enabled);
        self.render();
    }

    pub fn collect_selected(&self) -> Vec<String> {
        let entries = self.catalog.entries();
        self.selection.selected().filter_map(|i| entries.get(i)).map(|e| e.text.clone()).collect()
    }

    /// Ends the session and hands the selected messages to the host.
    ///
    /// The callback runs first; returning true skips the receiver. Otherwise
    /// the receiver gets [`fallback_text`] of the selection, except that an
    /// empty selection leaves its current value alone.
    pub fn close(&mut self) -> QrioResult<Vec<String>> {
        let msgs = self.collect_selected();
        info!("Closing reader with {} selected", msgs.len());
        self.state = ReaderState::Idle;
        let receiver = self.receiver.take();

        if let Some(mut cb) = self.callback.take() {
            if cb(&msgs) {
                return Ok(msgs);
            }
        }

        let res = fallback_text(&msgs)?;
        match receiver {
            Some(r) if !res.is_empty() => r.set_value(&res),
            _ => {}
        }
        Ok(msgs)
    }

    /// Forgets every cached message, starting an independent session.
    pub fn clear_catalog(&mut self) {
        self.catalog.clear();
        self.selection.reset(0, None);
        self.render();
    }

    fn show_detect(&mut self, show: bool) {
        self.image_visible = show;
        self.overlay.clear();
    }

    fn set_advisory(&mut self, msg: String) {
        self.list_visible = false;
        self.status = msg;
    }

    fn render(&mut self) {
        if self.list_visible {
            self.status = render_messages(&self.cfg, &self.catalog, &self.selection);
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn has_capability(&self) -> bool {
        self.detector.is_some()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Blocking alert raised by the last operation, if any.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn transform(&self) -> Option<&OriginTransform> {
        self.transform.as_ref()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn is_image_visible(&self) -> bool {
        self.image_visible
    }

    pub fn overlay_svg(&self) -> String {
        self.overlay.to_svg(&self.cfg)
    }

    /// The last scanned image with the overlay drawn on it.
    pub fn annotated_image(&self) -> Option<RgbaImage> {
        let mut canvas = self.image.as_ref()?.to_rgba8();
        self.overlay.annotate(&mut canvas);
        Some(canvas)
    }
}

/// Receiver content for a selection: nothing, the bare message, or a pretty
/// printed JSON array.
pub fn fallback_text(msgs: &[String]) -> QrioResult<String> {
    Ok(match msgs {
        [] => String::new(),
        [m] => m.clone(),
        _ => serde_json::to_string_pretty(msgs)?,
    })
}

#[cfg(test)]
mod reader_tests {
    use std::rc::Rc;

    use super::{fallback_text, CannedDetector, Detection, Point, Reader, ReaderState};
    use crate::{Config, DetectorFactory, QrioError};

    fn png(w: u32, h: u32) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(w, h).write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn canned(texts: &[&str]) -> CannedDetector {
        let corners = [Point::new(1.0, 1.0), Point::new(5.0, 1.0), Point::new(5.0, 5.0), Point::new(1.0, 5.0)];
        CannedDetector::new(texts.iter().map(|t| Detection::new(corners, *t)).collect())
    }

    #[test]
    fn test_fallback_text() {
        assert_eq!(fallback_text(&[]).unwrap(), "");
        assert_eq!(fallback_text(&["a".to_string()]).unwrap(), "a");
        assert_eq!(
            fallback_text(&["a".to_string(), "b".to_string()]).unwrap(),
            "[\n  \"a\",\n  \"b\"\n]"
        );
    }

    #[tokio::test]
    async fn test_scan_before_capability() {
        let mut reader = Reader::new(Rc::new(Config::default()));
        assert!(matches!(reader.scan(&png(4, 4)).await, Err(QrioError::NotOpen)));

        reader.open(None, None);
        assert_eq!(reader.state(), ReaderState::AwaitingCapability);
        assert_eq!(reader.status(), super::STATUS_INITIALIZING);
        assert!(matches!(reader.scan(&png(4, 4)).await, Err(QrioError::CapabilityPending)));
    }

    #[tokio::test]
    async fn test_no_capability() {
        let cfg = Rc::new(Config::default());
        let mut reader = Reader::new(cfg.clone()).with_platform_detector(Box::new(EmptyFormats));
        reader.open(None, None);
        assert!(!reader.has_capability());
        assert!(!reader.init_capability().await);
        assert!(!reader.has_capability());
        assert_eq!(reader.state(), ReaderState::Ready);
        assert_eq!(reader.status(), cfg.alerts.no_capability);

        assert!(matches!(reader.scan(&png(4, 4)).await, Err(QrioError::NoDetectionCapability)));
        assert_eq!(reader.status(), cfg.alerts.no_capability_short);
        assert!(reader.is_image_visible());
    }

    #[tokio::test]
    async fn test_fallback_capability() {
        let cfg = Config::default()
            .with_fallback_detector(DetectorFactory::new(|| Box::new(canned(&["x"]))));
        let mut reader = Reader::new(Rc::new(cfg)).with_platform_detector(Box::new(EmptyFormats));
        reader.open(None, None);
        assert!(reader.init_capability().await);
        assert!(reader.has_capability());
        assert_eq!(reader.scan(&png(8, 4)).await.unwrap(), 1);
        assert!(reader.transform().is_none());
    }

    #[tokio::test]
    async fn test_detection_failure_is_reported() {
        let cfg = Rc::new(Config::default());
        let mut reader = Reader::new(cfg.clone()).with_platform_detector(Box::new(Failing));
        reader.open(None, None);
        assert!(reader.init_capability().await);
        assert_eq!(reader.status(), cfg.alerts.ready);

        let res = reader.scan(&png(8, 4)).await;
        assert!(matches!(res, Err(QrioError::Detection(ref m)) if m == "camera unplugged"));
        assert_eq!(reader.state(), ReaderState::Ready);
        assert_eq!(reader.status(), "Detection failed: camera unplugged");
        assert!(!reader.is_image_visible());
        assert!(reader.overlay().shapes.is_empty());
        assert!(reader.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_not_an_image() {
        let cfg = Rc::new(Config::default());
        let mut reader = Reader::new(cfg.clone()).with_platform_detector(Box::new(canned(&["x"])));
        reader.open(None, None);
        reader.init_capability().await;
        reader.scan(&png(4, 4)).await.unwrap();
        assert!(!reader.overlay().shapes.is_empty());

        assert!(matches!(reader.scan(b"not an image").await, Err(QrioError::ImageLoadFailure(_))));
        assert_eq!(reader.state(), ReaderState::Ready);
        assert_eq!(reader.status(), cfg.alerts.not_an_image);
        assert!(!reader.is_image_visible());
        assert!(reader.overlay().shapes.is_empty());
        assert_eq!(reader.catalog().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let cfg = Rc::new(Config::default());
        let mut reader = Reader::new(cfg.clone()).with_platform_detector(Box::new(canned(&["x"])));
        reader.open(None, None);
        reader.init_capability().await;
        let res = reader.scan_file("/nonexistent/qrio/image.png").await;
        assert!(matches!(res, Err(QrioError::FileReadFailure(_))));
        assert_eq!(reader.take_alert(), Some(cfg.alerts.no_file.clone()));
        assert_eq!(reader.status(), "");
    }

    #[tokio::test]
    async fn test_callback_handles_result() {
        let mut out = "untouched".to_string();
        let mut seen = Vec::new();
        {
            let mut reader =
                Reader::new(Rc::new(Config::default())).with_platform_detector(Box::new(canned(&["a", "b"])));
            reader.open(Some(&mut out), Some(Box::new(|m: &[String]| {
                seen = m.to_vec();
                true
            })));
            reader.init_capability().await;
            reader.scan(&png(8, 4)).await.unwrap();
            assert_eq!(reader.close().unwrap(), vec!["a".to_string()]);
        }
        assert_eq!(seen, vec!["a".to_string()]);
        assert_eq!(out, "untouched");
    }

    #[tokio::test]
    async fn test_callback_declines() {
        let mut out = String::new();
        {
            let cfg = Config::default().with_multi_select(true);
            let mut reader = Reader::new(Rc::new(cfg)).with_platform_detector(Box::new(canned(&["a", "b"])));
            reader.open(Some(&mut out), Some(Box::new(|_: &[String]| false)));
            reader.init_capability().await;
            reader.scan(&png(8, 4)).await.unwrap();
            reader.toggle(1);
            reader.close().unwrap();
        }
        assert_eq!(out, "[\n  \"a\",\n  \"b\"\n]");
    }

    #[tokio::test]
    async fn test_reopen_keeps_capability_and_catalog() {
        let cfg = Rc::new(Config::default());
        let mut reader = Reader::new(cfg.clone()).with_platform_detector(Box::new(canned(&["a"]).tag_runs()));
        reader.open(None, None);
        reader.init_capability().await;
        reader.scan(&png(4, 4)).await.unwrap();
        reader.close().unwrap();
        assert_eq!(reader.state(), ReaderState::Idle);

        reader.open(None, None);
        assert_eq!(reader.state(), ReaderState::Ready);
        assert_eq!(reader.status(), cfg.alerts.ready);
        reader.scan(&png(4, 4)).await.unwrap();
        let texts = reader.catalog().entries().iter().map(|e| (e.text.as_str(), e.stale)).collect::<Vec<_>>();
        assert_eq!(texts, vec![("a__1", true), ("a__2", false)]);

        reader.clear_catalog();
        assert!(reader.catalog().is_empty());
        assert!(reader.close().unwrap().is_empty());
    }

    struct EmptyFormats;

    struct Failing;

    #[async_trait::async_trait(?Send)]
    impl super::Detector for Failing {
        async fn supported_formats(&self) -> Vec<String> {
            vec!["qr_code".to_string()]
        }

        async fn detect(&self, _img: &image::DynamicImage) -> crate::QrioResult<Vec<Detection>> {
            Err(QrioError::Detection("camera unplugged".to_string()))
        }
    }

    #[async_trait::async_trait(?Send)]
    impl super::Detector for EmptyFormats {
        async fn supported_formats(&self) -> Vec<String> {
            Vec::new()
        }

        async fn detect(&self, _img: &image::DynamicImage) -> crate::QrioResult<Vec<Detection>> {
            Ok(Vec::new())
        }
    }
}
