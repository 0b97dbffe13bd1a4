use kmer_cluster::cluster::config::ClusterConfig;
use kmer_cluster::cluster::local::run_local_cluster;
use kmer_cluster::cluster::node::run_node;
use kmer_cluster::cluster::runner::{WorkerReport, write_contigs};
use kmer_cluster::genome::reader;
use kmer_cluster::storage::partitioner::WorkerId;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

struct Args {
    kmer_file: PathBuf,
    workers: usize,
    kmer_len: Option<usize>,
    load_factor: Option<f64>,
    max_in_flight: Option<usize>,
    verbose: bool,
    test_prefix: Option<String>,
    rank: Option<usize>,
    peers: Vec<SocketAddr>,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <kmer_file> [--workers N] [--kmer-len L] [--load-factor F] \
         [--max-in-flight M] [--verbose] [--test [prefix]] [--rank R --peers addr,addr,...]",
        program
    );
    eprintln!("Example: {} data/test.txt --workers 4 --kmer-len 19 --test", program);
    eprintln!(
        "Example: {} data/test.txt --kmer-len 19 --rank 1 --peers 127.0.0.1:7000,127.0.0.1:7001",
        program
    );
    std::process::exit(1);
}

fn value_of(args: &[String], i: usize) -> anyhow::Result<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} requires a value", args[i]))
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1].starts_with("--") {
        usage(&args[0]);
    }

    let mut parsed = Args {
        kmer_file: PathBuf::from(&args[1]),
        workers: 1,
        kmer_len: None,
        load_factor: None,
        max_in_flight: None,
        verbose: false,
        test_prefix: None,
        rank: None,
        peers: vec![],
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--workers" => {
                parsed.workers = value_of(&args, i)?.parse()?;
                i += 2;
            }
            "--kmer-len" => {
                parsed.kmer_len = Some(value_of(&args, i)?.parse()?);
                i += 2;
            }
            "--load-factor" => {
                parsed.load_factor = Some(value_of(&args, i)?.parse()?);
                i += 2;
            }
            "--max-in-flight" => {
                parsed.max_in_flight = Some(value_of(&args, i)?.parse()?);
                i += 2;
            }
            "--rank" => {
                parsed.rank = Some(value_of(&args, i)?.parse()?);
                i += 2;
            }
            "--peers" => {
                parsed.peers = value_of(&args, i)?
                    .split(',')
                    .map(|addr| addr.trim().parse())
                    .collect::<Result<_, _>>()?;
                i += 2;
            }
            "--verbose" => {
                parsed.verbose = true;
                i += 1;
            }
            "--test" => match args.get(i + 1) {
                Some(prefix) if !prefix.starts_with("--") => {
                    parsed.test_prefix = Some(prefix.clone());
                    i += 2;
                }
                _ => {
                    parsed.test_prefix = Some("test".to_string());
                    i += 1;
                }
            },
            _ => {
                i += 1;
            }
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let worker_count = if args.rank.is_some() {
        args.peers.len()
    } else {
        args.workers
    };
    let mut config = ClusterConfig::new(worker_count, WorkerId(args.rank.unwrap_or(0)));
    if let Some(kmer_len) = args.kmer_len {
        config = config.with_kmer_len(kmer_len);
    }
    if let Some(load_factor) = args.load_factor {
        config = config.with_load_factor(load_factor);
    }
    if let Some(max_in_flight) = args.max_in_flight {
        config = config.with_max_in_flight(max_in_flight);
    }

    // Abort before anything is allocated if the input does not match.
    config.validate()?;
    config.check_kmer_len(reader::kmer_size(&args.kmer_file)?)?;

    let total = reader::line_count(&args.kmer_file)?;
    tracing::info!(
        "Assembling {} {}-mers from {} with {} workers (load factor {})",
        total,
        config.kmer_len,
        args.kmer_file.display(),
        config.worker_count,
        config.load_factor
    );

    let started = Instant::now();
    let reports: Vec<WorkerReport> = match args.rank {
        Some(rank) => {
            let bind_addr = args.peers[rank];
            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            let records = reader::read_kmers(&args.kmer_file, config.worker_count, rank)?;
            vec![run_node(&config, args.peers.clone(), listener, records, total).await?]
        }
        None => {
            let records = reader::read_all(&args.kmer_file)?;
            run_local_cluster(&config, records).await?
        }
    };

    for report in &reports {
        tracing::info!(
            "{}: {} contigs, {} broken, insert {:?}, assemble {:?}, {}/{} slots",
            report.worker,
            report.assembly.contigs.len(),
            report.assembly.broken.len(),
            report.timings.insert,
            report.timings.assemble,
            report.shard.occupied,
            report.shard.capacity
        );

        if let Some(prefix) = &args.test_prefix {
            let path = write_contigs(prefix, report)?;
            tracing::info!("Wrote contigs of {} to {}", report.worker, path.display());
        }
    }

    let contigs: usize = reports.iter().map(|r| r.assembly.contigs.len()).sum();
    tracing::info!("Assembled {} contigs in {:?}", contigs, started.elapsed());

    Ok(())
}
