//! Turn URLs, WiFi credentials, contact cards, OTP secrets, locations and
//! free text into QR payloads, and draw them to a terminal, PNG or base64.
//!
//! ```
//! use mkqr::encoder::{Encode, Wifi, WifiEncryption};
//!
//! let wifi = Wifi {
//!     ssid: "Home".into(),
//!     password: "secret".into(),
//!     encryption: Some(WifiEncryption::Wpa),
//!     hidden: false,
//! };
//! assert_eq!(wifi.encode(), "WIFI:T:WPA;S:Home;P:secret;;");
//! ```

pub mod batch;
pub mod config;
pub mod content;
pub mod encoder;
pub mod error;
pub mod qr;
pub mod render;

pub use content::{describe, detect, detect_and_describe, ContentKind};
pub use encoder::{validate_secret, Encode};
pub use error::{Error, Result};
pub use qr::{EcLevel, Generator, Options, Symbol};
pub use render::render;
