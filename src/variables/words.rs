//! Portuguese (pt-BR) spelled-out amounts, as written on receipts and
//! contracts: `1500.00` -> `mil e quinhentos reais`.

const UNITS: [&str; 20] = [
    "zero",
    "um",
    "dois",
    "três",
    "quatro",
    "cinco",
    "seis",
    "sete",
    "oito",
    "nove",
    "dez",
    "onze",
    "doze",
    "treze",
    "quatorze",
    "quinze",
    "dezesseis",
    "dezessete",
    "dezoito",
    "dezenove",
];

const TENS: [&str; 10] = [
    "", "", "vinte", "trinta", "quarenta", "cinquenta", "sessenta", "setenta", "oitenta",
    "noventa",
];

const HUNDREDS: [&str; 10] = [
    "",
    "cento",
    "duzentos",
    "trezentos",
    "quatrocentos",
    "quinhentos",
    "seiscentos",
    "setecentos",
    "oitocentos",
    "novecentos",
];

const SCALES: [(u64, &str, &str); 3] = [
    (1_000_000_000, "bilhão", "bilhões"),
    (1_000_000, "milhão", "milhões"),
    (1_000, "mil", "mil"),
];

/// 1..=999
fn below_thousand(n: u64) -> String {
    if n == 100 {
        return "cem".to_string();
    }

    let mut parts: Vec<&str> = Vec::new();
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;

    if hundreds > 0 {
        parts.push(HUNDREDS[hundreds]);
    }
    if rest > 0 {
        if rest < 20 {
            parts.push(UNITS[rest]);
        } else {
            parts.push(TENS[rest / 10]);
            if rest % 10 > 0 {
                parts.push(UNITS[rest % 10]);
            }
        }
    }
    parts.join(" e ")
}

/// Spells out a non-negative integer.
pub fn integer_in_words(n: u64) -> String {
    if n == 0 {
        return UNITS[0].to_string();
    }

    // (group value, words)
    let mut chunks: Vec<(u64, String)> = Vec::new();
    let mut rem = n;

    for (scale, singular, plural) in SCALES {
        let group = rem / scale;
        rem %= scale;
        if group == 0 {
            continue;
        }
        let words = if scale == 1_000 {
            if group == 1 {
                singular.to_string()
            } else {
                format!("{} {}", integer_in_words(group), singular)
            }
        } else {
            let noun = if group == 1 { singular } else { plural };
            format!("{} {}", integer_in_words(group), noun)
        };
        chunks.push((group, words));
    }
    if rem > 0 {
        chunks.push((rem, below_thousand(rem)));
    }

    let mut out = String::new();
    let last = chunks.len() - 1;
    for (i, (value, words)) in chunks.iter().enumerate() {
        if i > 0 {
            // "mil e quinhentos", "dois mil e um", but "mil duzentos e cinquenta"
            if i == last && (*value < 100 || value % 100 == 0) {
                out.push_str(" e ");
            } else {
                out.push(' ');
            }
        }
        out.push_str(words);
    }
    out
}

/// Spells out a currency amount in reais and centavos.
pub fn amount_in_words(value: f64) -> String {
    let total_cents = (value.abs() * 100.0).round() as u64;
    let reais = total_cents / 100;
    let cents = total_cents % 100;

    let reais_text = if reais == 0 {
        None
    } else {
        let noun = if reais == 1 {
            "real"
        } else if reais % 1_000_000 == 0 {
            "de reais"
        } else {
            "reais"
        };
        Some(format!("{} {}", integer_in_words(reais), noun))
    };

    let cents_text = if cents == 0 {
        None
    } else {
        let noun = if cents == 1 { "centavo" } else { "centavos" };
        Some(format!("{} {}", integer_in_words(cents), noun))
    };

    let text = match (reais_text, cents_text) {
        (Some(r), Some(c)) => format!("{r} e {c}"),
        (Some(r), None) => r,
        (None, Some(c)) => c,
        (None, None) => "zero reais".to_string(),
    };

    if value < 0.0 && total_cents > 0 {
        format!("menos {text}")
    } else {
        text
    }
}
