use crate::cli::SearchArgs;
use crate::graph::{load_graph, Graph};
use crate::hmm::{HmmReader, ProfileHmm};
use crate::search::workflow::{analyze_hmm, HmmResult, Params};
use crate::utils::Result;
use crate::writers::ResultWriter;
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{path::Path, sync::Arc, thread};

const CHANNEL_BUFFER_SIZE: usize = 64;

pub fn search(args: SearchArgs) -> Result<()> {
    let output_dir = args.input.output_dir.clone();
    std::fs::create_dir_all(&output_dir).map_err(|e| format!("{}: {}", output_dir.display(), e))?;

    let graph = Arc::new(load_graph(&args.input.graph_path, args.input.k)?);
    log::info!(
        "Graph: {} vertices, {} edges, k = {}",
        graph.size(),
        graph.edge_count(),
        graph.k()
    );

    let writer = if args.no_save {
        None
    } else {
        Some(ResultWriter::new(&output_dir, !args.no_rescore)?)
    };

    let hmm_path = args.input.hmm_path.clone();
    let (sender_hmm, receiver_hmm) = bounded(CHANNEL_BUFFER_SIZE);
    let hmm_stream_thread = thread::spawn(move || stream_hmms_into_channel(&hmm_path, sender_hmm));

    let (sender_result, receiver_result) = bounded::<HmmResult>(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || -> Result<()> {
        let Some(mut writer) = writer else {
            for result in &receiver_result {
                log::debug!("{}: {} hits (not saved)", result.name, result.hits.len());
            }
            return Ok(());
        };
        for result in &receiver_result {
            if let Err(e) = writer.write(&result) {
                log::error!("Writing results of {}: {}", result.name, e);
            }
        }
        writer.finish()
    });

    let workflow_params = Arc::new(args.params());

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = initialize_thread_pool(args.num_threads)?;
    pool.install(|| {
        receiver_hmm
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_result, |s, hmm| {
                process_hmm(hmm, &graph, &workflow_params, s)
            });
    });

    // Clean-up
    drop(sender_result);
    let written = writer_thread.join().expect("Writer thread panicked");
    log::trace!("Writer thread finished");
    hmm_stream_thread
        .join()
        .expect("Profile stream thread panicked")?;
    log::trace!("Profile stream thread finished");
    written
}

/// Feeds profiles to the pool; stops at the first malformed one.
fn stream_hmms_into_channel(path: &Path, sender: Sender<ProfileHmm>) -> Result<()> {
    for hmm in HmmReader::from_path(path)? {
        let hmm = hmm.map_err(|e| format!("{}: {}", path.display(), e))?;
        log::debug!("Queued profile {}", hmm.name);
        if sender.send(hmm).is_err() {
            break;
        }
    }
    Ok(())
}

fn process_hmm(
    hmm: ProfileHmm,
    graph: &Arc<Graph>,
    workflow_params: &Arc<Params>,
    sender_result: &Sender<HmmResult>,
) {
    match analyze_hmm(graph, &hmm, workflow_params) {
        Ok(result) => {
            if let Err(e) = sender_result.send(result) {
                log::error!("Failed to send profile result to writer thread: {}", e);
            }
        }
        Err(err) => {
            log::error!("Error analyzing profile {}: {}", hmm.name, err);
        }
    }
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("graph-hmm-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
