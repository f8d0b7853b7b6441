//! Batch-parallel time-forward processing for the BA model.
//!
//! Here every random edge is a single token: `idx = 2 * edge_id`, the value
//! is the sampled endpoint (or a query deferring to another edge), and the
//! owning vertex is recovered from the index when the edge materializes. All
//! tokens start out in a bulk-interface priority queue; each round extracts a
//! batch of the smallest tokens, partitions it into strips on link
//! boundaries and processes the strips on parallel workers. Everything a
//! worker pushes stays invisible until the epoch closes, so workers never
//! observe each other mid-batch.

use crate::core::config::BaConfig;
use crate::core::token::CompactToken;
use crate::core::utils::errors::PagenError;
use crate::core::Node;
use crate::edges::pool::EdgeWriterPool;
use crate::edges::writer::EdgeListWriter;
use crate::em::bulk_queue::{BulkPushSession, BulkTokenQueue};
use crate::models::ba::{attach_target, AttachTarget};
use crate::sampling::stream_rng;
use crate::stream::seed_circle::SeedCircle;
use rayon::prelude::*;
use tracing::{debug, info};

/// Batches grow with progress, `processed^0.75`, between the configured
/// bounds.
fn batch_size(processed: u64, min_batch: usize, max_batch: usize) -> usize {
    ((processed as f64).powf(0.75) as usize).clamp(min_batch, max_batch)
}

/// Run the batch-parallel BA pipeline into the writer pool. The pool needs
/// one writer per configured thread; worker `i` writes only through writer
/// `i`. The caller still has to `finish()` the pool.
pub fn generate_ba_parallel(
    config: &BaConfig,
    pool: &mut EdgeWriterPool,
) -> Result<(), PagenError> {
    config.validate()?;
    assert!(
        pool.len() >= config.threads,
        "writer pool holds {} writers for {} threads",
        pool.len(),
        config.threads
    );

    let circle = SeedCircle::new(config.seed_vertices(), 0);
    let seed_slots = 2 * circle.number_of_edges();
    let base = circle.max_vertex_id() + 1;
    let m = config.edges_per_vertex;
    let threads = config.threads;

    info!(
        vertices = config.vertices,
        edges_per_vertex = m,
        threads,
        seed = config.seed,
        "generating Barabási–Albert graph, batch-parallel"
    );

    let mut queue = BulkTokenQueue::new(config.memory.pq_bytes, threads)?;

    // fill: one token per random edge, workers over contiguous vertex ranges
    {
        let session = queue.bulk_push_session();
        let chunk = (config.vertices as usize).div_ceil(threads) as u64;
        rayon::scope(|scope| {
            for worker in 0..threads {
                let session = &session;
                let circle = &circle;
                scope.spawn(move |_| {
                    let lo = worker as u64 * chunk;
                    let hi = (lo + chunk).min(config.vertices);
                    let mut shard = session.shard(worker);
                    for i in lo..hi {
                        let mut rng = stream_rng(config.seed, i);
                        for j in 0..m {
                            let idx = 2 * (i * m + j);
                            let token = match attach_target(
                                &mut rng,
                                seed_slots,
                                m,
                                base,
                                i,
                                j,
                                config.edge_dependencies,
                            ) {
                                AttachTarget::Seed(slot) => {
                                    CompactToken::link(idx, circle.vertex_at(slot))
                                }
                                AttachTarget::Owner(node) => CompactToken::link(idx, node),
                                AttachTarget::EdgeValue(edge) => {
                                    CompactToken::query(2 * edge, idx)
                                }
                            };
                            shard.push(token);
                        }
                    }
                });
            }
        });
    }
    queue.bulk_push_end();
    debug!(tokens = queue.len(), "token fill done");

    // the ring does not take part in token processing; write it directly
    for e in 0..circle.number_of_edges() {
        pool.writer(0)
            .write_edge(circle.vertex_at(2 * e), circle.vertex_at(2 * e + 1))?;
    }

    let min_batch = config.memory.min_batch;
    let max_batch = config.memory.max_batch;
    let mut buf: Vec<CompactToken> = Vec::new();

    while !queue.is_empty() {
        let requested = batch_size(pool.total_edges_written(), min_batch, max_batch);
        queue.bulk_pop(&mut buf, requested);
        let drained = queue.is_empty();

        let session = queue.bulk_push_session();
        let (unanswered, completed) = if buf.len() < 2 * min_batch {
            process_strip(&buf, 0, buf.len(), drained, &session, 0, pool.writer(0), m, base)?
        } else {
            let workers = (buf.len() / min_batch).clamp(1, threads);
            let chunk = buf.len() / workers;

            // strips start on link tokens; a query run spanning a chunk
            // boundary belongs to the strip holding its link
            let mut bounds = Vec::with_capacity(workers + 1);
            bounds.push(0);
            for w in 1..workers {
                let mut pos = w * chunk;
                while pos < buf.len() && buf[pos].is_query() {
                    pos += 1;
                }
                pos = pos.max(bounds[w - 1]);
                bounds.push(pos);
            }
            bounds.push(buf.len());

            let buf_ref = &buf;
            let bounds_ref = &bounds;
            let session_ref = &session;
            let writers = &mut pool.writers_mut()[..workers];
            let counts: Result<Vec<(u64, u64)>, PagenError> = writers
                .par_iter_mut()
                .enumerate()
                .map(|(w, writer)| {
                    process_strip(
                        buf_ref,
                        bounds_ref[w],
                        bounds_ref[w + 1],
                        drained,
                        session_ref,
                        w,
                        writer,
                        m,
                        base,
                    )
                })
                .collect();
            counts?
                .into_iter()
                .fold((0, 0), |acc, c| (acc.0 + c.0, acc.1 + c.1))
        };
        drop(session);
        queue.bulk_push_end();

        debug!(
            requested,
            got = buf.len(),
            unanswered,
            completed,
            remaining = queue.len(),
            edges = pool.total_edges_written(),
            "batch processed"
        );
    }

    info!(edges = pool.total_edges_written(), "token processing done");
    Ok(())
}

/// Process one strip of an extracted batch.
///
/// A strip is a maximal run of link groups: a link token followed by the
/// queries asking its index. Leading queries lost their link to an earlier
/// batch and are parked back in the queue; a group cut off by the end of the
/// whole buffer withholds its link the same way, because more queries for it
/// may still sit beyond the pop watermark.
#[allow(clippy::too_many_arguments)]
fn process_strip(
    buf: &[CompactToken],
    start: usize,
    end: usize,
    queue_drained: bool,
    session: &BulkPushSession<'_>,
    worker: usize,
    writer: &mut EdgeListWriter,
    edges_per_vertex: u64,
    base: Node,
) -> Result<(u64, u64), PagenError> {
    let mut shard = session.shard(worker);
    let mut unanswered = 0u64;
    let mut completed = 0u64;

    let mut i = start;
    while i < end {
        if buf[i].is_query() {
            while i < end && buf[i].is_query() {
                shard.push(buf[i]);
                unanswered += 1;
                i += 1;
            }
            continue;
        }

        let link = buf[i];
        i += 1;
        while i < end && buf[i].idx() == link.idx() {
            debug_assert!(buf[i].is_query(), "duplicate link for slot {}", link.idx());
            debug_assert!(buf[i].value() > link.idx());
            shard.push(CompactToken::link(buf[i].value(), link.value()));
            i += 1;
        }

        let may_be_cut = i == end && end == buf.len() && (buf.len() > 1 || !queue_drained);
        if may_be_cut {
            shard.push(link);
        } else {
            let second = link.idx() / (2 * edges_per_vertex) + base;
            writer.write_edge(link.value(), second)?;
            completed += 1;
        }
    }
    Ok((unanswered, completed))
}
