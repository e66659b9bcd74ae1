// src/currency.rs

use crate::error::{DashboardError, Result};

/// Number layout conventions. The currency itself is configured separately.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locale {
    #[value(name = "en_US")]
    EnUs,
    #[value(name = "es_CO")]
    EsCo,
    #[value(name = "pt_BR")]
    PtBr,
    #[value(name = "id_ID")]
    IdId,
    #[value(name = "de_DE")]
    DeDe,
    #[value(name = "fr_FR")]
    FrFr,
}

impl Locale {
    fn group_separator(self) -> &'static str {
        match self {
            Locale::EnUs => ",",
            Locale::EsCo | Locale::PtBr | Locale::IdId | Locale::DeDe => ".",
            Locale::FrFr => " ",
        }
    }

    fn decimal_separator(self) -> &'static str {
        match self {
            Locale::EnUs => ".",
            _ => ",",
        }
    }

    fn code_first(self) -> bool {
        !matches!(self, Locale::DeDe | Locale::FrFr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    code: String,
    locale: Locale,
}

impl CurrencyFormat {
    /// `code` must be a three letter ISO 4217 code; case is normalized.
    pub fn new(code: &str, locale: Locale) -> Result<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DashboardError::InvalidCurrency(code.to_string()));
        }
        Ok(Self {
            code: code.to_ascii_uppercase(),
            locale,
        })
    }

    /// Two decimals, grouped thousands
    pub fn format(&self, amount: f64) -> String {
        let fixed = format!("{:.2}", amount.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push_str(self.locale.group_separator());
            }
            grouped.push(digit);
        }

        let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
        let number = format!(
            "{sign}{grouped}{}{cents}",
            self.locale.decimal_separator()
        );
        if self.locale.code_first() {
            format!("{} {number}", self.code)
        } else {
            format!("{number} {}", self.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_per_locale() {
        let amount = 1234567.891;
        let cases = [
            (Locale::EnUs, "AUD 1,234,567.89"),
            (Locale::EsCo, "AUD 1.234.567,89"),
            (Locale::PtBr, "AUD 1.234.567,89"),
            (Locale::IdId, "AUD 1.234.567,89"),
            (Locale::DeDe, "1.234.567,89 AUD"),
            (Locale::FrFr, "1 234 567,89 AUD"),
        ];
        for (locale, expected) in cases {
            let format = CurrencyFormat::new("AUD", locale).unwrap();
            assert_eq!(format.format(amount), expected, "{locale:?}");
        }
    }

    #[test]
    fn test_format_small_and_negative_amounts() {
        let format = CurrencyFormat::new("brl", Locale::PtBr).unwrap();
        assert_eq!(format.format(0.0), "BRL 0,00");
        assert_eq!(format.format(999.999), "BRL 1.000,00");
        assert_eq!(format.format(-42.5), "BRL -42,50");
        assert_eq!(format.format(-0.001), "BRL 0,00");
    }

    #[test]
    fn test_code_and_locale_are_independent() {
        let usd_in_brazil = CurrencyFormat::new("USD", Locale::PtBr).unwrap();
        let brl_in_us = CurrencyFormat::new("BRL", Locale::EnUs).unwrap();
        assert_eq!(usd_in_brazil.format(1500.0), "USD 1.500,00");
        assert_eq!(brl_in_us.format(1500.0), "BRL 1,500.00");
    }

    #[test]
    fn test_rejects_malformed_codes() {
        for code in ["", "EU", "EURO", "U$D"] {
            assert!(matches!(
                CurrencyFormat::new(code, Locale::EnUs),
                Err(DashboardError::InvalidCurrency(_))
            ));
        }
    }
}
