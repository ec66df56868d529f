//! Reader for ASCII HMMER3 profile files.

use super::Alphabet;
use crate::utils::{open_text_reader, Result};
use std::io::BufRead;
use std::path::Path;

/// Transition columns in file order: MM MI MD IM II DM DD.
pub const NUM_TRANSITIONS: usize = 7;

/// A profile HMM as stored on disk. Every probability is kept as a negative
/// natural log, `f64::INFINITY` standing for probability zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileHmm {
    pub name: String,
    pub accession: Option<String>,
    pub description: Option<String>,
    pub alphabet: Alphabet,
    /// Model length M.
    pub length: usize,
    /// Rows 1..=M; row 0 is unused and set to infinity.
    pub match_emissions: Vec<Vec<f64>>,
    /// Rows 0..=M.
    pub insert_emissions: Vec<Vec<f64>>,
    /// Rows 0..=M; row 0 holds the Begin transitions.
    pub transitions: Vec<[f64; NUM_TRANSITIONS]>,
}

impl ProfileHmm {
    /// Builds an in-memory profile from probabilities rather than file scores.
    pub fn from_probabilities(
        name: &str,
        alphabet: Alphabet,
        match_probs: &[Vec<f64>],
        insert_probs: &[Vec<f64>],
        transition_probs: &[[f64; NUM_TRANSITIONS]],
    ) -> Result<Self> {
        let length = match_probs.len();
        if insert_probs.len() != length + 1 || transition_probs.len() != length + 1 {
            return Err(format!(
                "Profile {} needs {} insert and transition rows, found {} and {}",
                name,
                length + 1,
                insert_probs.len(),
                transition_probs.len()
            ));
        }
        let neg_ln = |p: &f64| -p.ln();
        let mut match_emissions = vec![vec![f64::INFINITY; alphabet.size()]];
        match_emissions.extend(match_probs.iter().map(|row| row.iter().map(neg_ln).collect()));
        Ok(ProfileHmm {
            name: name.to_string(),
            accession: None,
            description: None,
            alphabet,
            length,
            match_emissions,
            insert_emissions: insert_probs
                .iter()
                .map(|row| row.iter().map(neg_ln).collect())
                .collect(),
            transitions: transition_probs
                .iter()
                .map(|row| row.map(|p| -p.ln()))
                .collect(),
        })
    }
}

/// Streams profiles out of a HMMER3 file.
pub struct HmmReader<R: BufRead> {
    lines: std::iter::Enumerate<std::io::Lines<R>>,
    line_number: usize,
    finished: bool,
}

impl HmmReader<std::io::BufReader<Box<dyn std::io::Read>>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(HmmReader::new(open_text_reader(path)?))
    }
}

impl<R: BufRead> HmmReader<R> {
    pub fn new(reader: R) -> Self {
        HmmReader {
            lines: reader.lines().enumerate(),
            line_number: 0,
            finished: false,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some((index, line)) => {
                self.line_number = index + 1;
                line.map(Some)
                    .map_err(|e| format!("Error reading line {}: {}", self.line_number, e))
            }
            None => Ok(None),
        }
    }

    fn expect_line(&mut self) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| format!("Unexpected end of file after line {}", self.line_number))
    }

    fn error(&self, message: &str) -> String {
        format!("line {}: {}", self.line_number, message)
    }

    fn parse_values(&self, fields: &[&str], count: usize) -> Result<Vec<f64>> {
        if fields.len() < count {
            return Err(self.error(&format!(
                "expected {} values, found {}",
                count,
                fields.len()
            )));
        }
        fields[..count]
            .iter()
            .map(|field| {
                parse_score(field).ok_or_else(|| self.error(&format!("bad value '{}'", field)))
            })
            .collect()
    }

    fn parse_transitions(&mut self) -> Result<[f64; NUM_TRANSITIONS]> {
        let line = self.expect_line()?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let values = self.parse_values(&fields, NUM_TRANSITIONS)?;
        let mut row = [0.0; NUM_TRANSITIONS];
        row.copy_from_slice(&values);
        Ok(row)
    }

    fn parse_model(&mut self, first_line: &str) -> Result<ProfileHmm> {
        if !first_line.starts_with("HMMER3") {
            return Err(self.error(&format!(
                "expected a HMMER3 header, found '{}'",
                first_line
            )));
        }

        let mut name = None;
        let mut accession = None;
        let mut description = None;
        let mut length = None;
        let mut alphabet = None;

        loop {
            let line = self.expect_line()?;
            let (tag, value) = match line.split_once(char::is_whitespace) {
                Some((tag, value)) => (tag, value.trim()),
                None => (line.trim(), ""),
            };
            match tag {
                "NAME" => name = Some(value.to_string()),
                "ACC" => accession = Some(value.to_string()),
                "DESC" => description = Some(value.to_string()),
                "LENG" => {
                    length = Some(
                        value
                            .parse::<usize>()
                            .map_err(|_| self.error(&format!("invalid LENG '{}'", value)))?,
                    )
                }
                "ALPH" => {
                    alphabet = Some(
                        Alphabet::from_hmmer_tag(value)
                            .ok_or_else(|| {
                                self.error(&format!("unsupported alphabet '{}'", value))
                            })?,
                    )
                }
                "HMM" => break,
                _ => {}
            }
        }

        let name = name.ok_or_else(|| self.error("model without NAME"))?;
        let length = length.ok_or_else(|| self.error(&format!("model {} without LENG", name)))?;
        let alphabet =
            alphabet.ok_or_else(|| self.error(&format!("model {} without ALPH", name)))?;
        let size = alphabet.size();

        // Transition column captions.
        self.expect_line()?;

        // Model composition is validated but not used for scoring.
        let mut line = self.expect_line()?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.first() == Some(&"COMPO") {
            self.parse_values(&fields[1..], size)?;
            line = self.expect_line()?;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let mut insert_emissions = vec![self.parse_values(&fields, size)?];
        let mut transitions = vec![self.parse_transitions()?];
        let mut match_emissions = vec![vec![f64::INFINITY; size]];

        for node in 1..=length {
            let line = self.expect_line()?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.first().map(|f| f.parse::<usize>()) {
                Some(Ok(index)) if index == node => {}
                _ => return Err(self.error(&format!("expected match line of node {}", node))),
            }
            match_emissions.push(self.parse_values(&fields[1..], size)?);

            let line = self.expect_line()?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            insert_emissions.push(self.parse_values(&fields, size)?);
            transitions.push(self.parse_transitions()?);
        }

        let terminator = self.expect_line()?;
        if terminator.trim() != "//" {
            return Err(self.error(&format!(
                "expected '//' after {} nodes of model {}",
                length, name
            )));
        }

        Ok(ProfileHmm {
            name,
            accession,
            description,
            alphabet,
            length,
            match_emissions,
            insert_emissions,
            transitions,
        })
    }
}

impl<R: BufRead> Iterator for HmmReader<R> {
    type Item = Result<ProfileHmm>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let first_line = loop {
            match self.next_line() {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => break line,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        };
        let model = self.parse_model(&first_line);
        if model.is_err() {
            self.finished = true;
        }
        Some(model)
    }
}

fn parse_score(field: &str) -> Option<f64> {
    if field == "*" {
        Some(f64::INFINITY)
    } else {
        field.parse::<f64>().ok()
    }
}

pub fn read_hmms(path: &Path) -> Result<Vec<ProfileHmm>> {
    HmmReader::from_path(path)?
        .collect::<Result<Vec<_>>>()
        .map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const TWO_NODE_DNA: &str = "\
HMMER3/f [3.1b2 | February 2015]
NAME  toy
ACC   TY0001.1
DESC  toy nucleotide model
LENG  2
ALPH  DNA
RF    no
STATS LOCAL MSV      -8.1  0.71
HMM          A        C        G        T
            m->m     m->i     m->d     i->m     i->i     d->m     d->d
  COMPO   1.38629  1.38629  1.38629  1.38629
          1.38629  1.38629  1.38629  1.38629
          0.10536  2.99573  3.50656  0.69315  0.69315  0.00000        *
      1   0.10536  3.50656  3.50656  3.50656      1 a - - -
          1.38629  1.38629  1.38629  1.38629
          0.10536  2.99573  3.50656  0.69315  0.69315  0.40547  1.09861
      2   3.50656  3.50656  0.10536  3.50656      2 g - - -
          1.38629  1.38629  1.38629  1.38629
          0.00000        *        *  0.00000        *  0.00000        *
//
";

    #[test]
    fn parses_single_model() {
        let models: Vec<_> = HmmReader::new(Cursor::new(TWO_NODE_DNA))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(models.len(), 1);
        let hmm = &models[0];
        assert_eq!(hmm.name, "toy");
        assert_eq!(hmm.accession.as_deref(), Some("TY0001.1"));
        assert_eq!(hmm.description.as_deref(), Some("toy nucleotide model"));
        assert_eq!(hmm.alphabet, Alphabet::Dna);
        assert_eq!(hmm.length, 2);
        assert_eq!(hmm.match_emissions.len(), 3);
        assert_eq!(hmm.insert_emissions.len(), 3);
        assert_eq!(hmm.transitions.len(), 3);
        assert_relative_eq!(hmm.match_emissions[2][2], 0.10536);
        assert!(hmm.transitions[0][6].is_infinite());
        assert_relative_eq!(hmm.transitions[1][5], 0.40547);
        assert_relative_eq!(hmm.insert_emissions[0][0], 1.38629);
    }

    #[test]
    fn composition_line_is_optional() {
        let without = TWO_NODE_DNA.replace("  COMPO   1.38629  1.38629  1.38629  1.38629\n", "");
        assert_ne!(without, TWO_NODE_DNA);
        let read = |text: &str| {
            HmmReader::new(Cursor::new(text.to_string()))
                .collect::<Result<Vec<_>>>()
                .unwrap()
        };
        assert_eq!(read(&without), read(TWO_NODE_DNA));

        let bad = TWO_NODE_DNA.replace("COMPO   1.38629", "COMPO   x");
        assert!(HmmReader::new(Cursor::new(bad)).any(|m| m.is_err()));
    }

    #[test]
    fn reads_consecutive_models() {
        let data = format!(
            "{}{}",
            TWO_NODE_DNA,
            TWO_NODE_DNA.replace("NAME  toy", "NAME  toy2")
        );
        let names: Vec<_> = HmmReader::new(Cursor::new(data))
            .map(|m| m.unwrap().name)
            .collect();
        assert_eq!(names, vec!["toy", "toy2"]);
    }

    #[test]
    fn reports_truncated_model() {
        let truncated: String = TWO_NODE_DNA.lines().take(16).collect::<Vec<_>>().join("\n");
        let mut reader = HmmReader::new(Cursor::new(truncated));
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn rejects_missing_terminator_and_bad_header() {
        let data = TWO_NODE_DNA.replace("//", "xx");
        assert!(HmmReader::new(Cursor::new(data)).next().unwrap().is_err());
        let data = TWO_NODE_DNA.replace("HMMER3/f", "HMMER2.0");
        assert!(HmmReader::new(Cursor::new(data)).next().unwrap().is_err());
        let data = TWO_NODE_DNA.replace("ALPH  DNA", "ALPH  coins");
        assert!(HmmReader::new(Cursor::new(data)).next().unwrap().is_err());
    }

    #[test]
    fn builds_from_probabilities() {
        let hmm = ProfileHmm::from_probabilities(
            "p",
            Alphabet::Dna,
            &[vec![0.7, 0.1, 0.1, 0.1]],
            &[vec![0.25; 4], vec![0.25; 4]],
            &[[0.9, 0.05, 0.05, 0.5, 0.5, 1.0, 0.0]; 2],
        )
        .unwrap();
        assert_eq!(hmm.length, 1);
        assert_relative_eq!(hmm.match_emissions[1][0], -(0.7f64.ln()));
        assert!(hmm.transitions[1][6].is_infinite());
        assert!(ProfileHmm::from_probabilities("p", Alphabet::Dna, &[], &[], &[]).is_err());
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.hmm");
        std::fs::write(&path, TWO_NODE_DNA).unwrap();
        let models = read_hmms(&path).unwrap();
        assert_eq!(models[0].length, 2);
    }
}
