//! Brazilian locale formatting for dates and currency.

use chrono::Datelike;

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// `01/01/2025`
pub fn format_date_br<D: Datelike>(date: &D) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

/// `01 de janeiro de 2025`
pub fn format_date_long<D: Datelike>(date: &D) -> String {
    let month = MONTHS[(date.month0() as usize).min(MONTHS.len() - 1)];
    format!("{:02} de {} de {}", date.day(), month, date.year())
}

/// `R$ 1.500,00`
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let reais = cents / 100;
    let rest = cents % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{rest:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_date_br(&date), "07/03/2025");
        assert_eq!(format_date_long(&date), "07 de março de 2025");
    }

    #[test]
    fn test_brl() {
        assert_eq!(format_brl(1500.0), "R$ 1.500,00");
        assert_eq!(format_brl(0.5), "R$ 0,50");
        assert_eq!(format_brl(1234567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(-10.0), "-R$ 10,00");
    }
}
