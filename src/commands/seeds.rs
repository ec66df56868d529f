use crate::cli::{edge_filter, SeedsArgs};
use crate::graph::load_graph;
use crate::hmm::{fees_from_hmm, read_hmms, ViterbiMatcher};
use crate::search::match_edges;
use crate::utils::Result;
use crate::writers::SeedWriter;

pub fn seeds(args: SeedsArgs) -> Result<()> {
    let output_dir = &args.input.output_dir;
    std::fs::create_dir_all(output_dir).map_err(|e| format!("{}: {}", output_dir.display(), e))?;
    let graph = load_graph(&args.input.graph_path, args.input.k)?;
    // The whole file is validated before any seed table is written.
    let hmms = read_hmms(&args.input.hmm_path)?;
    let thresholds = args.matcher.thresholds();
    let edge_id = edge_filter(args.input.edge_id);

    for hmm in &hmms {
        let fees = fees_from_hmm(hmm, hmm.alphabet)?;
        let mut matcher = ViterbiMatcher::new(&fees, thresholds);
        let matched = match_edges(&graph, &mut matcher, hmm.alphabet, edge_id)?;
        if matched.is_empty() {
            log::warn!("{}: no matched edges", hmm.name);
            continue;
        }
        log::info!("{}: {} matched edges", hmm.name, matched.len());
        for (edge, (left, right)) in &matched {
            log::info!("Seed edge {}: overhangs L = {}, R = {}", edge, left, right);
        }
        let mut writer = SeedWriter::new(output_dir, &hmm.name)?;
        writer.write(&matched)?;
    }
    Ok(())
}
