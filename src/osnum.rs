//! Masque de saisie du numéro d'OS : `NN.NNNN` (année sur 2 chiffres +
//! séquence jusqu'à 4 chiffres).

const YEAR_DIGITS: usize = 2;
const MAX_DIGITS: usize = 6;

/// Reformate progressivement une saisie libre, chiffre par chiffre.
pub fn format_os_number(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect();
    if digits.len() <= YEAR_DIGITS {
        return digits;
    }
    let (year, seq) = digits.split_at(YEAR_DIGITS);
    format!("{year}.{seq}")
}

/// `true` pour une valeur complète au format du masque.
pub fn is_valid_os_number(value: &str) -> bool {
    let Some((year, seq)) = value.split_once('.') else {
        return false;
    };
    year.len() == YEAR_DIGITS
        && (1..=MAX_DIGITS - YEAR_DIGITS).contains(&seq.len())
        && year.bytes().chain(seq.bytes()).all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_applies_while_typing() {
        assert_eq!(format_os_number(""), "");
        assert_eq!(format_os_number("2"), "2");
        assert_eq!(format_os_number("25"), "25");
        assert_eq!(format_os_number("250"), "25.0");
        assert_eq!(format_os_number("25.00"), "25.00");
        assert_eq!(format_os_number("250012"), "25.0012");
        assert_eq!(format_os_number("2500123"), "25.0012");
        assert_eq!(format_os_number("ab25-00x1"), "25.001");
    }

    #[test]
    fn validation() {
        assert!(is_valid_os_number("25.0012"));
        assert!(is_valid_os_number("25.1"));
        assert!(!is_valid_os_number("25."));
        assert!(!is_valid_os_number("250012"));
        assert!(!is_valid_os_number("2.0012"));
        assert!(!is_valid_os_number("25.00123"));
        assert!(!is_valid_os_number("25.00a1"));
        assert!(!is_valid_os_number("SEM OS"));
    }
}
