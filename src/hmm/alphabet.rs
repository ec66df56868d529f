use std::fmt;

/// Residue alphabet of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    Dna,
    Amino,
}

const DNA_SYMBOLS: &[u8; 4] = b"ACGT";
const AMINO_SYMBOLS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

/// Amino-acid code of a stop codon. It is outside the 20 scored residues, so
/// every profile state assigns it infinite cost.
pub const STOP: u8 = 20;

/// Nucleotide code of anything that is not A, C, G or T.
pub const UNKNOWN_NUCL: u8 = 4;

/// Standard genetic code indexed by `c0 << 4 | c1 << 2 | c2` with A=0, C=1,
/// G=2, T=3. Values index `AMINO_SYMBOLS`, with `STOP` for stop codons.
#[rustfmt::skip]
pub const AA_TABLE: [u8; 64] = [
    0x08, 0x0B, 0x08, 0x0B, 0x10, 0x10, 0x10, 0x10, 0x0E, 0x0F, 0x0E, 0x0F, 0x07, 0x07, 0x0A, 0x07,
    0x0D, 0x06, 0x0D, 0x06, 0x0C, 0x0C, 0x0C, 0x0C, 0x0E, 0x0E, 0x0E, 0x0E, 0x09, 0x09, 0x09, 0x09,
    0x03, 0x02, 0x03, 0x02, 0x00, 0x00, 0x00, 0x00, 0x05, 0x05, 0x05, 0x05, 0x11, 0x11, 0x11, 0x11,
    0x14, 0x13, 0x14, 0x13, 0x0F, 0x0F, 0x0F, 0x0F, 0x14, 0x01, 0x12, 0x01, 0x09, 0x04, 0x09, 0x04,
];

impl Alphabet {
    pub fn size(&self) -> usize {
        self.symbols().len()
    }

    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Alphabet::Dna => DNA_SYMBOLS,
            Alphabet::Amino => AMINO_SYMBOLS,
        }
    }

    /// Maps a residue letter to its code. Letters outside the alphabet map to
    /// `size()` (nucleotides) or `STOP` (amino acids), both unscorable.
    pub fn encode(&self, letter: u8) -> u8 {
        let letter = letter.to_ascii_uppercase();
        match self {
            Alphabet::Dna => encode_nucl(letter),
            Alphabet::Amino => AMINO_SYMBOLS
                .iter()
                .position(|&s| s == letter)
                .map_or(STOP, |p| p as u8),
        }
    }

    pub fn decode(&self, code: u8) -> u8 {
        self.symbols().get(code as usize).copied().unwrap_or(match self {
            Alphabet::Dna => b'N',
            Alphabet::Amino => b'*',
        })
    }

    /// Converts nucleotide-space lengths into the residue units of this
    /// alphabet's profiles.
    pub fn nucls_per_symbol(&self) -> usize {
        match self {
            Alphabet::Dna => 1,
            Alphabet::Amino => 3,
        }
    }

    pub fn from_hmmer_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "dna" | "rna" => Some(Alphabet::Dna),
            "amino" => Some(Alphabet::Amino),
            _ => None,
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alphabet::Dna => write!(f, "DNA"),
            Alphabet::Amino => write!(f, "amino"),
        }
    }
}

pub fn encode_nucl(letter: u8) -> u8 {
    match letter {
        b'A' | b'a' => 0,
        b'C' | b'c' => 1,
        b'G' | b'g' => 2,
        b'T' | b't' | b'U' | b'u' => 3,
        _ => UNKNOWN_NUCL,
    }
}

/// Amino-acid code of a codon. Codons with an unknown base translate to `STOP`.
pub fn to_aa(c0: u8, c1: u8, c2: u8) -> u8 {
    let codes = [encode_nucl(c0), encode_nucl(c1), encode_nucl(c2)];
    if codes.iter().any(|&c| c == UNKNOWN_NUCL) {
        return STOP;
    }
    AA_TABLE[((codes[0] << 4) | (codes[1] << 2) | codes[2]) as usize]
}

/// Translates `seq` codon by codon into amino-acid letters, `*` for stops.
/// Trailing bases that do not fill a codon are dropped.
pub fn translate(seq: &[u8]) -> Vec<u8> {
    seq.chunks_exact(3)
        .map(|codon| Alphabet::Amino.decode(to_aa(codon[0], codon[1], codon[2])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_standard_code() {
        assert_eq!(translate(b"ATGGCCTAA"), b"MA*");
        assert_eq!(translate(b"TGGTGATTTAAAGG"), b"W*FK");
        assert_eq!(translate(b"tgc"), b"C");
        assert_eq!(translate(b"AN"), b"");
    }

    #[test]
    fn unknown_bases_translate_to_stop() {
        assert_eq!(to_aa(b'A', b'N', b'G'), STOP);
        assert_eq!(translate(b"NNN"), b"*");
    }

    #[test]
    fn every_table_entry_is_scorable_or_stop() {
        let stops = AA_TABLE.iter().filter(|&&aa| aa == STOP).count();
        assert_eq!(stops, 3);
        assert!(AA_TABLE.iter().all(|&aa| aa <= STOP));
    }

    #[test]
    fn encodes_and_decodes() {
        assert_eq!(Alphabet::Dna.encode(b'g'), 2);
        assert_eq!(Alphabet::Dna.encode(b'N'), UNKNOWN_NUCL);
        assert_eq!(Alphabet::Amino.encode(b'M'), 10);
        assert_eq!(Alphabet::Amino.encode(b'X'), STOP);
        assert_eq!(Alphabet::Amino.decode(STOP), b'*');
        assert_eq!(Alphabet::Dna.decode(3), b'T');
        assert_eq!(Alphabet::from_hmmer_tag("RNA"), Some(Alphabet::Dna));
        assert_eq!(Alphabet::from_hmmer_tag("coins"), None);
    }
}
