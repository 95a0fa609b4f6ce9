use std::fmt;
use std::str::FromStr;

use super::Encode;
use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WifiEncryption {
    Wpa,
    Wep,
    NoPass,
}

impl WifiEncryption {
    pub fn as_str(self) -> &'static str {
        match self {
            WifiEncryption::Wpa => "WPA",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::NoPass => "nopass",
        }
    }
}

impl fmt::Display for WifiEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiEncryption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WPA" | "WPA2" | "WPA3" | "WPA2/WPA3" => Ok(WifiEncryption::Wpa),
            "WEP" => Ok(WifiEncryption::Wep),
            "NOPASS" | "NONE" | "OPEN" | "" => Ok(WifiEncryption::NoPass),
            _ => Err(Error::InvalidEncryption(s.to_string())),
        }
    }
}

/// WiFi join payload (`WIFI:T:..;S:..;P:..;;`).
#[derive(Debug, Clone, Default)]
pub struct Wifi {
    pub ssid: String,
    pub password: String,
    /// `None` picks WPA when a password is set, open otherwise.
    pub encryption: Option<WifiEncryption>,
    pub hidden: bool,
}

impl Wifi {
    pub fn resolved_encryption(&self) -> WifiEncryption {
        match self.encryption {
            Some(enc) => enc,
            None if self.password.is_empty() => WifiEncryption::NoPass,
            None => WifiEncryption::Wpa,
        }
    }
}

impl Encode for Wifi {
    fn encode(&self) -> String {
        let hidden = if self.hidden { "H:true;" } else { "" };
        format!(
            "WIFI:T:{};S:{};P:{};{};",
            self.resolved_encryption(),
            escape(&self.ssid),
            escape(&self.password),
            hidden
        )
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | ';' | ',' | '"' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
