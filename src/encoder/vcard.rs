use std::fmt::Write as _;

use super::Encode;

/// Contact card, vCard 3.0. Empty fields are left out.
#[derive(Debug, Clone, Default)]
pub struct VCard {
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub title: String,
    pub phone: String,
    pub phone_work: String,
    pub phone_mobile: String,
    pub email: String,
    pub email_work: String,
    pub website: String,
    pub address: String,
    pub note: String,
}

impl VCard {
    /// Formatted name: first and last joined by one space, skipping empty sides.
    pub fn full_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Encode for VCard {
    fn encode(&self) -> String {
        let mut b = String::from("BEGIN:VCARD\nVERSION:3.0\n");

        if !self.first_name.is_empty() || !self.last_name.is_empty() {
            let _ = writeln!(b, "N:{};{};;;", escape(&self.last_name), escape(&self.first_name));
            let _ = writeln!(b, "FN:{}", escape(&self.full_name()));
        }

        // (prefix, value, free text, suffix)
        let fields: [(&str, &str, bool, &str); 10] = [
            ("ORG:", &self.organization, true, ""),
            ("TITLE:", &self.title, true, ""),
            ("TEL;TYPE=HOME:", &self.phone, false, ""),
            ("TEL;TYPE=WORK:", &self.phone_work, false, ""),
            ("TEL;TYPE=CELL:", &self.phone_mobile, false, ""),
            ("EMAIL;TYPE=HOME:", &self.email, false, ""),
            ("EMAIL;TYPE=WORK:", &self.email_work, false, ""),
            ("URL:", &self.website, false, ""),
            ("ADR:;;", &self.address, true, ";;;;"),
            ("NOTE:", &self.note, true, ""),
        ];

        for (prefix, value, free_text, suffix) in fields {
            if value.is_empty() {
                continue;
            }
            let value = if free_text { escape(value) } else { value.to_string() };
            let _ = writeln!(b, "{prefix}{value}{suffix}");
        }

        b.push_str("END:VCARD");
        b
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}
