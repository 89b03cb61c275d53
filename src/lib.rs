//! # qrio
//!
//! Embeddable QR code generator and QR/bar code scanner widgets.
//!
//! ## Features
//!
//! - **Generator**: Encode a message into a QR code image with configurable version, error
//!   correction level, mode, text encoding and cell size
//! - **Reader**: Run an image through a detection capability and reconcile repeated scan passes
//!   into a stable catalog of decoded messages
//! - **Overlay**: Outline every detected code over the source image, for portrait or landscape
//!   images alike
//! - **Selection**: Single or multi selection over the catalog, handed back to the host on close
//!
//! ## Quick Start
//!
//! ### Generating a QR code
//!
//! ```rust
//! use qrio::{gen, ECLevel, EncodeOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let url = gen("Hello, World!", EncodeOptions::new().ec_level(ECLevel::H).cell_size(4))?;
//! assert!(url.starts_with("data:image/png;base64,"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Scanning an image
//!
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use qrio::{Config, QrDetector, Reader};
//!
//! # async fn scan() -> Result<(), Box<dyn std::error::Error>> {
//! let mut out = String::new();
//! {
//!     let mut reader = Reader::new(Rc::new(Config::default()))
//!         .with_platform_detector(Box::new(QrDetector));
//!     reader.open(Some(&mut out), None);
//!     reader.init_capability().await;
//!
//!     reader.scan_file("qr_code.png").await?;
//!     println!("{}", reader.status());
//!     reader.close()?;
//! }
//! println!("Selected: {out}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Scan passes
//!
//! Every scan marks the cached messages stale, then refreshes those found again. New messages
//! get a slot `0..5` by their position in the pass; stale messages stay listed and selectable.
//! The first freshly detected message is checked automatically.

pub mod common;
pub mod generator;
pub mod reader;

pub use common::{Alerts, Config, DetectorFactory, FunIds, QrioError, QrioResult, Receiver, Widget};
pub use generator::{gen, ECLevel, EncodeOptions, Generator, MessageSource, Mode, Symbol};
pub use reader::{
    fallback_text, CannedDetector, Catalog, CatalogEntry, Detection, Detector, OriginTransform,
    Point, QrDetector, Reader, ReaderState, Selection,
};
