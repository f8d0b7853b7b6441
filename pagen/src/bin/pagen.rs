use clap::{Args, Parser, Subcommand};
use pagen::core::config::{BaConfig, BbcrConfig, MemoryConfig};
use pagen::core::utils::errors::PagenError;
use pagen::core::utils::logging::init_global_logger;
use pagen::core::Node;
use pagen::edges::pool::EdgeWriterPool;
use pagen::edges::writer::{EdgeListReader, EdgeListWriter, EndpointWidth};
use pagen::em::sorter::ExternalSorter;
use pagen::models::ba::generate_ba;
use pagen::models::bbcr::generate_bbcr;
use pagen::sampling::reservoir::ReservoirSampling;
use pagen::sampling::stream_rng;
use pagen::stream::distribution::DistributionCount;
use pagen::tfp::parallel::generate_ba_parallel;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "pagen",
    about = "External-memory preferential-attachment graph generator",
    long_about = None
)]
struct Cli {
    /// Log level filter (ERROR, WARN, INFO, DEBUG, TRACE)
    #[arg(long, global = true, default_value = "INFO")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Undirected Barabási–Albert graph
    Ba(BaArgs),
    /// Directed Bollobás–Borgs–Chayes–Riordan graph
    Bbcr(BbcrArgs),
    /// Degree distribution of existing edge-list files
    Degrees(DegreesArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Bytes per endpoint in the output file (4, 5, 6 or 8)
    #[arg(long, default_value_t = 8)]
    width: u8,

    /// Random seed
    #[arg(short = 'x', long, default_value_t = 1)]
    seed: u64,

    /// Sorter RAM in MiB
    #[arg(long, default_value_t = 256)]
    sorter_mem: usize,

    /// Priority-queue RAM in MiB
    #[arg(long, default_value_t = 256)]
    pq_mem: usize,

    /// Remove all self-loops (without replacement)
    #[arg(short = 's', long)]
    filter_self_loops: bool,

    /// Collapse parallel edges into a single one
    #[arg(short = 'm', long)]
    filter_multi_edges: bool,
}

impl CommonArgs {
    fn memory(&self) -> MemoryConfig {
        MemoryConfig {
            sorter_bytes: self.sorter_mem << 20,
            pq_bytes: self.pq_mem << 20,
            ..MemoryConfig::default()
        }
    }
}

#[derive(Args, Debug)]
struct BaArgs {
    /// Output file; with --threads > 1 it is used as the prefix of one file
    /// per worker
    output: String,

    /// Number of random vertices; positive
    #[arg(long)]
    vertices: u64,

    /// Edges per random vertex; positive
    #[arg(long, default_value_t = 2)]
    edges_per_vertex: u64,

    /// Dependencies between the edges of one vertex
    #[arg(short = 'd', long)]
    edge_dependencies: bool,

    /// Worker threads; more than one selects the batch-parallel engine
    #[arg(short = 'p', long, default_value_t = 1)]
    threads: usize,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct BbcrArgs {
    /// Output file
    output: String,

    /// Number of random edges; positive
    #[arg(long)]
    edges: u64,

    /// Number of seed-ring vertices; at least two
    #[arg(short = 'n', long, default_value_t = 2)]
    seed_vertices: u64,

    /// Relative probability to add a new vertex with an outgoing edge
    #[arg(short = 'a', long, default_value_t = 0.1)]
    alpha: f64,

    /// Relative probability to link two existing vertices
    #[arg(short = 'b', long, default_value_t = 0.8)]
    beta: f64,

    /// Relative probability to add a new vertex with an incoming edge
    #[arg(short = 'g', long, default_value_t = 0.1)]
    gamma: f64,

    /// Non-negative offset of the in-degree distribution
    #[arg(short = 'y', long, default_value_t = 0.0)]
    d_in: f64,

    /// Non-negative offset of the out-degree distribution
    #[arg(short = 'z', long, default_value_t = 0.0)]
    d_out: f64,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct DegreesArgs {
    /// Input edge-list files, interpreted as concatenated
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Input holds directed edges; report out- and in-degrees separately
    #[arg(short = 'd', long)]
    directed: bool,

    /// Bytes per endpoint in the input files (4, 5, 6 or 8)
    #[arg(long, default_value_t = 8)]
    width: u8,

    /// Approximate the distribution from a uniform endpoint sample of this
    /// size instead of the full stream
    #[arg(long)]
    sample: Option<usize>,

    /// Write the distribution here instead of standard output
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Sorter RAM in MiB
    #[arg(long, default_value_t = 256)]
    sorter_mem: usize,

    /// Random seed for --sample
    #[arg(short = 'x', long, default_value_t = 1)]
    seed: u64,
}

fn main() {
    let cli = Cli::parse();
    init_global_logger(&cli.log_level);

    let outcome = match cli.command {
        Command::Ba(args) => run_ba(args),
        Command::Bbcr(args) => run_bbcr(args),
        Command::Degrees(args) => run_degrees(args),
    };

    if let Err(err) = outcome {
        error!(%err, "generation failed");
        std::process::exit(1);
    }
}

fn run_ba(args: BaArgs) -> Result<(), PagenError> {
    let width = EndpointWidth::from_bytes(args.common.width)?;
    let config = BaConfig {
        vertices: args.vertices,
        edges_per_vertex: args.edges_per_vertex,
        edge_dependencies: args.edge_dependencies,
        filter_self_loops: args.common.filter_self_loops,
        filter_multi_edges: args.common.filter_multi_edges,
        seed: args.common.seed,
        threads: args.threads,
        memory: args.common.memory(),
    };
    config.validate()?;

    if config.threads > 1 {
        if config.filter_self_loops || config.filter_multi_edges {
            warn!("edge filters only apply to the sequential engine; ignoring them");
        }
        let expected_per_writer = config.total_edges() / config.threads as u64 + 1;
        let mut pool = EdgeWriterPool::create(
            std::slice::from_ref(&args.output),
            config.threads,
            width,
            expected_per_writer,
        )?;
        generate_ba_parallel(&config, &mut pool)?;
        let written = pool.finish()?;
        info!(edges = written, "wrote {written} edges");
    } else {
        let mut writer = EdgeListWriter::create(&args.output, width, config.total_edges())?;
        generate_ba(&config, &mut writer)?;
        let written = writer.finish()?;
        info!(edges = written, "wrote {written} edges");
    }
    Ok(())
}

fn run_bbcr(args: BbcrArgs) -> Result<(), PagenError> {
    let width = EndpointWidth::from_bytes(args.common.width)?;
    let config = BbcrConfig {
        edges: args.edges,
        seed_vertices: args.seed_vertices,
        alpha: args.alpha,
        beta: args.beta,
        gamma: args.gamma,
        degree_offset_in: args.d_in,
        degree_offset_out: args.d_out,
        filter_self_loops: args.common.filter_self_loops,
        filter_multi_edges: args.common.filter_multi_edges,
        seed: args.common.seed,
        memory: args.common.memory(),
    };
    config.validate()?;

    let mut writer = EdgeListWriter::create(&args.output, width, config.total_edges())?;
    generate_bbcr(&config, &mut writer)?;
    let written = writer.finish()?;
    info!(edges = written, "wrote {written} edges");
    Ok(())
}

fn run_degrees(args: DegreesArgs) -> Result<(), PagenError> {
    let width = EndpointWidth::from_bytes(args.width)?;
    let sorter_bytes = args.sorter_mem << 20;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    if args.directed {
        let mut out_endpoints = EndpointCollector::new(sorter_bytes, args.sample, args.seed)?;
        let mut in_endpoints = EndpointCollector::new(sorter_bytes, args.sample, args.seed + 1)?;
        for path in &args.inputs {
            for (u, v) in EdgeListReader::open(path, width)?.edges() {
                out_endpoints.push(u);
                in_endpoints.push(v);
            }
        }
        writeln!(out, "# out-degree")?;
        write_distribution(out_endpoints, sorter_bytes, &mut out)?;
        writeln!(out, "# in-degree")?;
        write_distribution(in_endpoints, sorter_bytes, &mut out)?;
    } else {
        let mut endpoints = EndpointCollector::new(sorter_bytes, args.sample, args.seed)?;
        for path in &args.inputs {
            for node in EdgeListReader::open(path, width)? {
                endpoints.push(node);
            }
        }
        write_distribution(endpoints, sorter_bytes, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

/// Either the full sorted endpoint stream, or a uniform reservoir sample of
/// it for a cheap approximation on huge inputs.
enum EndpointCollector {
    Full(ExternalSorter<Node>),
    Sampled(ReservoirSampling<Node>),
}

impl EndpointCollector {
    fn new(sorter_bytes: usize, sample: Option<usize>, seed: u64) -> Result<Self, PagenError> {
        Ok(match sample {
            Some(capacity) => {
                EndpointCollector::Sampled(ReservoirSampling::new(capacity, stream_rng(seed, 0)))
            }
            None => EndpointCollector::Full(ExternalSorter::new(sorter_bytes)?),
        })
    }

    fn push(&mut self, node: Node) {
        match self {
            EndpointCollector::Full(sorter) => sorter.push(node),
            EndpointCollector::Sampled(reservoir) => reservoir.push(node),
        }
    }

    fn into_sorted(self) -> Box<dyn Iterator<Item = Node>> {
        match self {
            EndpointCollector::Full(sorter) => Box::new(sorter.sort()),
            EndpointCollector::Sampled(reservoir) => {
                let mut nodes = reservoir.into_vec();
                nodes.sort_unstable();
                Box::new(nodes.into_iter())
            }
        }
    }
}

/// Two counting passes: sorted endpoints collapse into per-vertex degrees,
/// sorted degrees collapse into the distribution, one `degree count` line
/// per block.
fn write_distribution(
    endpoints: EndpointCollector,
    sorter_bytes: usize,
    out: &mut dyn Write,
) -> Result<(), PagenError> {
    let mut degree_sorter = ExternalSorter::new(sorter_bytes)?;
    for block in DistributionCount::new(endpoints.into_sorted()) {
        degree_sorter.push(block.count);
    }

    let mut vertices = 0u64;
    let mut degree_sum = 0u64;
    for block in DistributionCount::new(degree_sorter.sort()) {
        writeln!(out, "{} {}", block.value, block.count)?;
        vertices += block.count;
        degree_sum += block.value * block.count;
    }
    info!(vertices, degree_sum, "distribution written");
    Ok(())
}
