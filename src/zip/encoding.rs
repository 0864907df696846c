//! Decoding of filenames and comments that do not carry the UTF-8 flag.

/// Code page used for names and comments stored without the UTF-8 flag.
///
/// The ZIP format leaves this to the archiver; `Cp437` (the IBM PC code page)
/// is what most tools assume and is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LegacyEncoding {
    #[default]
    Cp437,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

impl LegacyEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            LegacyEncoding::Cp437 => bytes.iter().map(|&b| cp437_char(b)).collect(),
            LegacyEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Decode raw name or comment bytes, honouring the UTF-8 flag.
pub fn decode_text(bytes: &[u8], utf8: bool, legacy: LegacyEncoding) -> String {
    if utf8 {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        legacy.decode(bytes)
    }
}

fn cp437_char(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        CP437_HIGH[(byte - 0x80) as usize]
    }
}

#[rustfmt::skip]
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp437_high_half() {
        assert_eq!(LegacyEncoding::Cp437.decode(b"caf\x82.txt"), "café.txt");
        assert_eq!(LegacyEncoding::Cp437.decode(&[0x80, 0xE1, 0xFF]), "Çß\u{a0}");
    }

    #[test]
    fn latin1_is_identity() {
        assert_eq!(LegacyEncoding::Latin1.decode(b"caf\xe9"), "café");
    }

    #[test]
    fn utf8_flag_wins() {
        let name = "naïve/文件.txt";
        assert_eq!(decode_text(name.as_bytes(), true, LegacyEncoding::Cp437), name);
        assert_ne!(decode_text(name.as_bytes(), false, LegacyEncoding::Cp437), name);
        assert_eq!(decode_text(b"plain.txt", false, LegacyEncoding::Cp437), "plain.txt");
    }
}
