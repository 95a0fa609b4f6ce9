use super::{query_escape, Encode};

/// `mailto:` intent.
#[derive(Debug, Clone, Default)]
pub struct Email {
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub body: String,
}

impl Encode for Email {
    fn encode(&self) -> String {
        let params: Vec<String> = [
            ("cc", &self.cc),
            ("bcc", &self.bcc),
            ("subject", &self.subject),
            ("body", &self.body),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={}", query_escape(v)))
        .collect();

        let mut out = format!("mailto:{}", self.to);
        if !params.is_empty() {
            out.push('?');
            out.push_str(&params.join("&"));
        }
        out
    }
}

fn strip_spaces(number: &str) -> String {
    number.replace(' ', "")
}

/// `tel:` intent.
#[derive(Debug, Clone, Default)]
pub struct Phone {
    pub number: String,
}

impl Encode for Phone {
    fn encode(&self) -> String {
        format!("tel:{}", strip_spaces(&self.number))
    }
}

/// `sms:` intent with optional prefilled body.
#[derive(Debug, Clone, Default)]
pub struct Sms {
    pub number: String,
    pub body: String,
}

impl Encode for Sms {
    fn encode(&self) -> String {
        let mut out = format!("sms:{}", strip_spaces(&self.number));
        if !self.body.is_empty() {
            out.push_str("?body=");
            out.push_str(&query_escape(&self.body));
        }
        out
    }
}

/// `geo:` location; coordinates always carry six decimals.
#[derive(Debug, Clone, Default)]
pub struct Geo {
    pub latitude: f64,
    pub longitude: f64,
    pub query: String,
}

impl Encode for Geo {
    fn encode(&self) -> String {
        let mut out = format!("geo:{:.6},{:.6}", self.latitude, self.longitude);
        if !self.query.is_empty() {
            out.push_str("?q=");
            out.push_str(&query_escape(&self.query));
        }
        out
    }
}
