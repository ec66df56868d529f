mod aa_cursor;
mod cursor;
mod neighbourhood;
mod reify;
mod seeds;
mod viterbi;
pub mod workflow;

pub use aa_cursor::AaCursor;
pub use cursor::{Cursor, GraphCursor};
pub use neighbourhood::{
    extract_neighbourhoods, join_neighbourhoods, record_overhang, EdgeAlnInfo, Neighbourhoods,
};
pub use reify::{merge_sequences, path_name, to_path};
pub use seeds::{collect_overhangs, edge_queries, hit_name, match_edges, parse_hit_name, FRAMES};
pub use viterbi::{find_best_path, path_string, PathSet, ScoredPath, SearchParams};
