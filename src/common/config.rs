use std::{fmt, fs, path::Path, rc::Rc};

use serde::Deserialize;

use crate::{reader::Detector, QrioError, QrioResult};

// Widget families
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Generator,
    Reader,
}

// Id prefixes
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FunIds {
    pub generator: String,
    pub reader: String,
}

impl Default for FunIds {
    fn default() -> Self {
        Self { generator: "generator-".to_string(), reader: "reader-".to_string() }
    }
}

// Alerts
//------------------------------------------------------------------------------

/// Advisory texts shown in the reader status area.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Alerts {
    pub no_capability: String,
    pub no_capability_short: String,
    pub no_file: String,
    pub ready: String,
    pub not_an_image: String,
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            no_capability: "Browser lacks support for QR and bar code scanning. \
                Try Chrome on Android (most recent version), or use a native app \
                that can scan codes to clipboard."
                .to_string(),
            no_capability_short: "No detection capability in browser".to_string(),
            no_file: "Failed to open file or camera".to_string(),
            ready: "Use camera to snap photo to be scanned for QR and bar codes \
                (camera capture is generally only available on mobile devices). \
                Photos can also be opened from files."
                .to_string(),
            not_an_image: "Image not recognized".to_string(),
        }
    }
}

// Detector factory
//------------------------------------------------------------------------------

/// Constructs the fallback detection capability used when the platform has none.
#[derive(Clone)]
pub struct DetectorFactory(Rc<dyn Fn() -> Box<dyn Detector>>);

impl DetectorFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Box<dyn Detector> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn create(&self) -> Box<dyn Detector> {
        (self.0)()
    }
}

impl fmt::Debug for DetectorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DetectorFactory(..)")
    }
}

// Config
//------------------------------------------------------------------------------

/// Immutable widget configuration, fixed at setup time and shared by every
/// widget instance built from it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_id: String,
    pub fun_ids: FunIds,
    pub alerts: Alerts,
    pub multi_select: bool,
    #[serde(skip)]
    pub fallback_detector: Option<DetectorFactory>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: "qrio-".to_string(),
            fun_ids: FunIds::default(),
            alerts: Alerts::default(),
            multi_select: false,
            fallback_detector: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> QrioResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> QrioResult<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .map_err(|source| QrioError::ConfigRead { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&s)
    }

    pub fn with_fallback_detector(mut self, factory: DetectorFactory) -> Self {
        self.fallback_detector = Some(factory);
        self
    }

    pub fn with_multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }

    pub fn fun_id(&self, widget: Widget) -> &str {
        match widget {
            Widget::Generator => &self.fun_ids.generator,
            Widget::Reader => &self.fun_ids.reader,
        }
    }

    pub fn full_id(&self, widget: Widget, suffix: &str) -> String {
        format!("{}{}{}", self.app_id, self.fun_id(widget), suffix)
    }

    pub fn class_name(&self, suffix: &str) -> String {
        format!("{}{}", self.app_id, suffix)
    }
}
