//! Text and number canonicalization for scraped markup.

/// Canonical number of primary odds columns after padding.
pub const CANONICAL_ODDS_LEN: usize = 11;

/// Parse an odds cell into a float. Decimal commas are accepted,
/// empty or unparsable text degrades to the 0.0 sentinel.
pub fn to_float(text: &str) -> f64 {
    let cleaned = text.trim().replace(',', ".");
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse().unwrap_or(0.0)
}

/// Transliterate an outcome name into Latin script and strip apostrophes.
///
/// Latin input passes through untouched, so the function is idempotent.
pub fn canonical_name(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\'' {
            continue;
        }
        match transliterate_char(ch) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(ch),
        }
    }
    out
}

fn transliterate_char(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "ju",
        'я' => "ja",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' => "E",
        'Ё' => "E",
        'Ж' => "Zh",
        'З' => "Z",
        'И' => "I",
        'Й' => "J",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "C",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Щ' => "Sch",
        'Ъ' => "",
        'Ы' => "Y",
        'Ь' => "",
        'Э' => "E",
        'Ю' => "Ju",
        'Я' => "Ja",
        _ => return None,
    };
    Some(mapped)
}

/// Pad a raw primary-odds list into the canonical 11-column schema.
///
/// The listing renders two shortened variants: a 10-value row missing the
/// draw-handicap slot at index 1, and an 8-value row missing the three
/// leading match-result columns. Any other length is passed through as is.
pub fn canonicalize_primary_odds(mut odds: Vec<f64>) -> Vec<f64> {
    match odds.len() {
        10 => {
            odds.insert(1, 0.0);
            odds
        }
        8 => {
            let mut padded = vec![0.0; 3];
            padded.extend(odds);
            padded
        }
        _ => odds,
    }
}
