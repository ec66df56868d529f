mod alphabet;
mod fees;
mod hmm_file;
mod matcher;

pub use alphabet::{encode_nucl, to_aa, translate, Alphabet, AA_TABLE, STOP, UNKNOWN_NUCL};
pub use fees::{background, fees_from_hmm, Fees, Transition};
pub use hmm_file::{read_hmms, HmmReader, ProfileHmm, NUM_TRANSITIONS};
pub use matcher::{Domain, Hit, MatcherThresholds, SeedMatcher, ViterbiMatcher};
