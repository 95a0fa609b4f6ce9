use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;
use totp_rs::{Algorithm, Secret, TOTP};

use super::{path_escape, query_escape, Encode};
use crate::error::{Error, Result};

const DEFAULT_DIGITS: u8 = 6;
const DEFAULT_PERIOD: u32 = 30;

static BASE32_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z2-7]+=*$").unwrap());

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OtpKind {
    /// Time-based.
    #[default]
    Totp,
    /// Counter-based.
    Hotp,
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OtpKind::Totp => "totp",
            OtpKind::Hotp => "hotp",
        })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OtpAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl OtpAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            OtpAlgorithm::Sha1 => "SHA1",
            OtpAlgorithm::Sha256 => "SHA256",
            OtpAlgorithm::Sha512 => "SHA512",
        }
    }

    fn to_totp(self) -> Algorithm {
        match self {
            OtpAlgorithm::Sha1 => Algorithm::SHA1,
            OtpAlgorithm::Sha256 => Algorithm::SHA256,
            OtpAlgorithm::Sha512 => Algorithm::SHA512,
        }
    }
}

impl fmt::Display for OtpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "SHA1" => Ok(OtpAlgorithm::Sha1),
            "SHA256" => Ok(OtpAlgorithm::Sha256),
            "SHA512" => Ok(OtpAlgorithm::Sha512),
            _ => Err(Error::InvalidAlgorithm(s.to_string())),
        }
    }
}

/// Strip the separators people paste secrets with. Store this form in
/// [`Otp::secret`]: the URI carries the secret verbatim.
pub fn clean_secret(secret: &str) -> String {
    secret.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Check that `secret` is base32 once spaces and hyphens are removed.
pub fn validate_secret(secret: &str) -> Result<()> {
    let cleaned = clean_secret(secret);
    if cleaned.is_empty() {
        return Err(Error::EmptySecret);
    }
    if !BASE32_RE.is_match(&cleaned) {
        return Err(Error::InvalidSecret);
    }
    Ok(())
}

/// Authenticator enrolment payload (`otpauth://`).
///
/// `None` fields fall back to the authenticator defaults and are left out of
/// the URI: SHA1, 6 digits, 30 second period, counter 0.
#[derive(Debug, Clone, Default)]
pub struct Otp {
    pub kind: OtpKind,
    pub secret: String,
    pub issuer: String,
    pub account: String,
    pub algorithm: Option<OtpAlgorithm>,
    pub digits: Option<u8>,
    pub period: Option<u32>,
    pub counter: Option<u64>,
}

impl Otp {
    /// Reject values an authenticator app would refuse. Run before [`Encode::encode`].
    pub fn validate(&self) -> Result<()> {
        validate_secret(&self.secret)?;
        if let Some(d) = self.digits {
            if d != 6 && d != 8 {
                return Err(Error::InvalidDigits(d));
            }
        }
        if self.period == Some(0) {
            return Err(Error::InvalidPeriod(0));
        }
        Ok(())
    }

    fn label(&self) -> String {
        if self.issuer.is_empty() {
            path_escape(&self.account)
        } else {
            format!("{}:{}", path_escape(&self.issuer), path_escape(&self.account))
        }
    }
}

impl Encode for Otp {
    fn encode(&self) -> String {
        let mut params = vec![format!("secret={}", self.secret.to_uppercase())];

        if !self.issuer.is_empty() {
            params.push(format!("issuer={}", query_escape(&self.issuer)));
        }
        if let Some(algo) = self.algorithm.filter(|a| *a != OtpAlgorithm::Sha1) {
            params.push(format!("algorithm={algo}"));
        }
        if let Some(digits) = self.digits.filter(|d| *d != 0 && *d != DEFAULT_DIGITS) {
            params.push(format!("digits={digits}"));
        }
        match self.kind {
            OtpKind::Totp => {
                if let Some(period) = self.period.filter(|p| *p != 0 && *p != DEFAULT_PERIOD) {
                    params.push(format!("period={period}"));
                }
            }
            OtpKind::Hotp => params.push(format!("counter={}", self.counter.unwrap_or(0))),
        }

        format!("otpauth://{}/{}?{}", self.kind, self.label(), params.join("&"))
    }
}

/// The code an authenticator should display for `otp` right now (TOTP) or at
/// its counter (HOTP).
pub fn current_code(otp: &Otp) -> Result<String> {
    validate_secret(&otp.secret)?;

    let encoded = clean_secret(&otp.secret)
        .trim_end_matches('=')
        .to_uppercase();
    let secret_bytes = Secret::Encoded(encoded)
        .to_bytes()
        .map_err(|e| Error::Totp(format!("invalid secret (base32): {e:?}")))?;
    if secret_bytes.is_empty() {
        return Err(Error::Totp("secret decoded to empty byte string".into()));
    }

    let digits = otp.digits.unwrap_or(DEFAULT_DIGITS) as usize;
    let algorithm = otp.algorithm.unwrap_or_default().to_totp();

    // HOTP is TOTP with a one-second step evaluated at t = counter.
    let (step, time) = match otp.kind {
        OtpKind::Totp => {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| Error::Totp(format!("system time error: {e}")))?
                .as_secs();
            (otp.period.unwrap_or(DEFAULT_PERIOD) as u64, now)
        }
        OtpKind::Hotp => (1, otp.counter.unwrap_or(0)),
    };

    // Unchecked: services such as GitHub hand out 80-bit secrets.
    let totp = TOTP::new_unchecked(algorithm, digits, 1, step, secret_bytes);
    Ok(totp.generate(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use url::Url;

    fn github() -> Otp {
        Otp {
            secret: "JBSWY3DPEHPK3PXP".into(),
            issuer: "GitHub".into(),
            account: "user@example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_omitted() {
        let otp = Otp {
            algorithm: Some(OtpAlgorithm::Sha1),
            digits: Some(6),
            period: Some(30),
            ..github()
        };
        let uri = otp.encode();
        assert_eq!(
            uri,
            "otpauth://totp/GitHub:user@example.com?secret=JBSWY3DPEHPK3PXP&issuer=GitHub"
        );
        assert!(!uri.contains("algorithm="));
        assert!(!uri.contains("digits="));
        assert!(!uri.contains("period="));
    }

    #[test]
    fn non_default_params_in_order() {
        let otp = Otp {
            algorithm: Some(OtpAlgorithm::Sha256),
            digits: Some(8),
            period: Some(60),
            ..github()
        };
        assert_eq!(
            otp.encode(),
            "otpauth://totp/GitHub:user@example.com?secret=JBSWY3DPEHPK3PXP&issuer=GitHub\
             &algorithm=SHA256&digits=8&period=60"
        );
    }

    #[test]
    fn hotp_always_has_counter_and_never_period() {
        let otp = Otp {
            kind: OtpKind::Hotp,
            period: Some(60),
            ..github()
        };
        let uri = otp.encode();
        assert!(uri.starts_with("otpauth://hotp/"));
        assert!(uri.ends_with("&counter=0"));
        assert!(!uri.contains("period="));

        let otp = Otp {
            kind: OtpKind::Hotp,
            counter: Some(42),
            ..github()
        };
        assert!(otp.encode().ends_with("&counter=42"));
    }

    #[test]
    fn label_without_issuer_is_account_only() {
        let otp = Otp {
            secret: "abcd".into(),
            account: "John Doe".into(),
            ..Default::default()
        };
        assert_eq!(otp.encode(), "otpauth://totp/John%20Doe?secret=ABCD");
    }

    #[test]
    fn issuer_is_path_escaped_in_label_and_query_escaped_in_params() {
        let otp = Otp {
            issuer: "Acme Corp".into(),
            ..github()
        };
        let uri = otp.encode();
        assert!(uri.starts_with("otpauth://totp/Acme%20Corp:user@example.com?"));
        assert!(uri.contains("&issuer=Acme+Corp"));

        let parsed = Url::parse(&uri).unwrap();
        let issuer = parsed
            .query_pairs()
            .find(|(k, _)| k == "issuer")
            .map(|(_, v)| v.into_owned());
        assert_eq!(issuer.as_deref(), Some("Acme Corp"));
    }

    #[test_case("JBSWY3DPEHPK3PXP")]
    #[test_case("jbsw y3dp-ehpk 3pxp")]
    #[test_case("JBSWY3DPEHPK3PXP====")]
    #[test_case("MFRGG-ZDF")]
    fn accepts_secret(secret: &str) {
        assert!(validate_secret(secret).is_ok());
    }

    #[test]
    fn spaced_secret_is_cleaned_before_encoding() {
        let raw = "jbsw y3dp-ehpk 3pxp";
        assert!(validate_secret(raw).is_ok());
        assert_eq!(clean_secret(raw), "jbswy3dpehpk3pxp");

        let otp = Otp {
            secret: clean_secret(raw),
            issuer: "GitHub".into(),
            account: "me".into(),
            ..Default::default()
        };
        assert_eq!(
            otp.encode(),
            "otpauth://totp/GitHub:me?secret=JBSWY3DPEHPK3PXP&issuer=GitHub"
        );
    }

    #[test]
    fn shown_code_matches_encoded_secret() {
        let spaced = Otp {
            kind: OtpKind::Hotp,
            secret: clean_secret("GEZD GNBV-GY3T QOJQ GEZD GNBV GY3T QOJQ"),
            counter: Some(1),
            ..Default::default()
        };
        assert!(spaced.encode().contains("secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ&"));
        assert_eq!(current_code(&spaced).unwrap(), "287082");
    }

    #[test]
    fn rejects_bad_secrets() {
        assert!(matches!(validate_secret(""), Err(Error::EmptySecret)));
        assert!(matches!(validate_secret(" - -"), Err(Error::EmptySecret)));
        assert!(matches!(validate_secret("ABC1"), Err(Error::InvalidSecret)));
        assert!(matches!(validate_secret("ABC8"), Err(Error::InvalidSecret)));
        assert!(matches!(validate_secret("AB=C"), Err(Error::InvalidSecret)));
        assert!(matches!(validate_secret("AB_C"), Err(Error::InvalidSecret)));
    }

    #[test]
    fn validate_checks_digits_and_period() {
        assert!(github().validate().is_ok());
        let otp = Otp {
            digits: Some(7),
            ..github()
        };
        assert!(matches!(otp.validate(), Err(Error::InvalidDigits(7))));
        let otp = Otp {
            period: Some(0),
            ..github()
        };
        assert!(matches!(otp.validate(), Err(Error::InvalidPeriod(0))));
        let otp = Otp {
            secret: "not base32!".into(),
            ..github()
        };
        assert!(matches!(otp.validate(), Err(Error::InvalidSecret)));
    }

    #[test]
    fn parses_algorithm() {
        assert_eq!("sha256".parse::<OtpAlgorithm>().unwrap(), OtpAlgorithm::Sha256);
        assert_eq!("SHA512".parse::<OtpAlgorithm>().unwrap(), OtpAlgorithm::Sha512);
        assert!(matches!("MD5".parse::<OtpAlgorithm>(), Err(Error::InvalidAlgorithm(_))));
    }

    #[test]
    fn hotp_code_matches_rfc4226() {
        // RFC 4226 appendix D: secret "12345678901234567890".
        let otp = Otp {
            kind: OtpKind::Hotp,
            secret: "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ".into(),
            counter: Some(1),
            ..Default::default()
        };
        assert_eq!(current_code(&otp).unwrap(), "287082");

        let otp = Otp {
            counter: Some(9),
            ..otp
        };
        assert_eq!(current_code(&otp).unwrap(), "520489");
    }

    #[test]
    fn totp_code_has_requested_digits() {
        let otp = Otp {
            digits: Some(8),
            ..github()
        };
        let code = current_code(&otp).unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
