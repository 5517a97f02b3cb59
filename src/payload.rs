use std::fmt::{Display, Error, Formatter};
use std::sync::OnceLock;

use regex::Regex;

use crate::common::error::{QRError, QRResult};

// Wi-Fi
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Encryption {
    None,
    Wep,
    Wpa,
}

impl Display for Encryption {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let enc = match self {
            Self::None => "",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
        };
        write!(f, "{enc}")
    }
}

/// Network join string understood by phone camera apps.
pub fn wifi(ssid: &str, password: &str, encryption: Encryption, hidden: bool) -> String {
    let hidden = if hidden { "H:true;" } else { "" };
    format!("WIFI:T:{encryption};S:{};P:{};{hidden};", escape(ssid), escape(password))
}

// SMS
//------------------------------------------------------------------------------

pub fn sms(tel: &str, message: &str) -> QRResult<String> {
    if !is_phone_number(tel) {
        return Err(QRError::InvalidPhoneNumber);
    }
    Ok(format!("SMSTO:{tel}:{}", escape(message)))
}

// Optional '+', a 3 digit area code optionally in brackets, then 3 digits and 4 to 6 digits, each
// group optionally preceded by one of '-', '.' or whitespace
fn is_phone_number(tel: &str) -> bool {
    static PHONE_NUMBER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PHONE_NUMBER
        .get_or_init(|| Regex::new(PHONE_NUMBER_PATTERN))
        .as_ref()
        .is_ok_and(|re| re.is_match(tel))
}

fn escape(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | ';' | ',' | ':') {
            res.push('\\');
        }
        res.push(ch);
    }
    res
}


// Global constants
//------------------------------------------------------------------------------

static PHONE_NUMBER_PATTERN: &str = r"^[\+]?[(]?[0-9]{3}[)]?[-\s\.]?[0-9]{3}[-\s\.]?[0-9]{4,6}$";
