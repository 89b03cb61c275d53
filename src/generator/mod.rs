mod encode;
mod render;
mod types;

use std::rc::Rc;

use tracing::info;

pub use encode::{EncodeOptions, DEFAULT_CELL_SZ, MAX_VERSION};
pub use render::Symbol;
pub use types::{ECLevel, Mode};

use crate::{Config, QrioError, QrioResult, Receiver, Widget};

/// Encodes `text` and returns a PNG data URL, without any widget state.
pub fn gen(text: &str, opts: &EncodeOptions) -> QrioResult<String> {
    let sym = opts.build(text)?;
    let cell = opts.resolve_cell_size(sym.module_count());
    sym.to_data_url(cell, cell)
}

// Message source
//------------------------------------------------------------------------------

pub enum MessageSource<'a> {
    Text(&'a str),
    Element(&'a dyn Receiver),
}

impl MessageSource<'_> {
    fn text(&self) -> String {
        match self {
            Self::Text(t) => t.to_string(),
            Self::Element(e) => e.value(),
        }
    }
}

impl<'a> From<&'a str> for MessageSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

// Generator
//------------------------------------------------------------------------------

/// Generator widget: encodes a message and shows it with its text.
pub struct Generator {
    cfg: Rc<Config>,
    is_open: bool,
    image_url: Option<String>,
    status: String,
    alert: Option<String>,
}

impl Generator {
    pub fn new(cfg: Rc<Config>) -> Self {
        Self { cfg, is_open: false, image_url: None, status: String::new(), alert: None }
    }

    pub fn open(&mut self, source: MessageSource, opts: &EncodeOptions) -> QrioResult<String> {
        let text = source.text();
        if text.is_empty() {
            self.alert = Some("Provide message to encode".to_string());
            return Err(QrioError::EmptyMessage);
        }

        let url = match gen(&text, opts) {
            Ok(url) => url,
            Err(e) => {
                let mut msg = format!("QRcode generation failed (response was: \"{e}\")");
                if matches!(e, QrioError::EncodingOverflow) {
                    msg.push_str(". The message may be too large to fit into a QR code.");
                }
                self.alert = Some(msg);
                return Err(e);
            }
        };

        info!("Opening generator {}", self.cfg.full_id(Widget::Generator, "home"));
        self.image_url = Some(url.clone());
        self.status = match opts.get_max_text_view_len() {
            Some(max) => shorten(&text, max),
            None => text,
        };
        self.is_open = true;
        Ok(url)
    }

    pub fn gen(&self, text: &str, opts: &EncodeOptions) -> QrioResult<String> {
        gen(text, opts)
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}

/// Keeps the first `floor(max / 3)` and the last `ceil(max / 3)` characters
/// of long texts.
fn shorten(text: &str, max: usize) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    if chars.len() <= max {
        return text.to_string();
    }
    let head = chars[..max / 3].iter().collect::<String>();
    let tail = chars[chars.len() - max.div_ceil(3)..].iter().collect::<String>();
    format!("{head}..{tail}")
}
