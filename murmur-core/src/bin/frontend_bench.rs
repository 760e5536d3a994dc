//! Spectrogram frontend benchmark.
//!
//! Measures log-mel extraction latency over WAV fixtures at several worker
//! counts and writes a JSON report. Runs against a real resource file when
//! `--resource` is given, otherwise against a flat synthetic filter bank.

fn main() {
    if let Err(e) = run() {
        eprintln!("frontend_bench failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    use murmur_core::pipeline::read_wav_mono;
    use murmur_core::spectrogram::{SpectrogramEngine, CHUNK_SAMPLES, N_FREQS, N_MELS};
    use murmur_core::vocab::LanguageMode;
    use murmur_core::MelFilterBank;
    use serde::Serialize;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Instant;

    #[derive(Debug)]
    struct Args {
        resource: Option<PathBuf>,
        fixtures_dir: Option<PathBuf>,
        threads: Vec<usize>,
        iterations: usize,
        output: Option<PathBuf>,
    }

    #[derive(Debug, Clone, Serialize)]
    struct CaseResult {
        file: String,
        threads: usize,
        iteration: usize,
        latency_ms: f64,
    }

    #[derive(Debug, Clone, Serialize)]
    struct ThreadSummary {
        threads: usize,
        runs: usize,
        p50_latency_ms: f64,
        p95_latency_ms: f64,
        avg_latency_ms: f64,
    }

    #[derive(Debug, Clone, Serialize)]
    struct Summary {
        iterations: usize,
        total_runs: usize,
        total_files: usize,
        thread_counts: Vec<ThreadSummary>,
        cases: Vec<CaseResult>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut resource = None;
        let mut fixtures_dir = None;
        let mut threads = vec![1, 2, 4, 8];
        let mut iterations = 3usize;
        let mut output = None;

        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--resource" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --resource".into());
                    };
                    resource = Some(PathBuf::from(v));
                }
                "--fixtures" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --fixtures".into());
                    };
                    fixtures_dir = Some(PathBuf::from(v));
                }
                "--threads" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --threads".into());
                    };
                    threads = v
                        .split(',')
                        .map(|t| t.parse::<usize>())
                        .collect::<Result<_, _>>()
                        .map_err(|_| "invalid value for --threads".to_string())?;
                }
                "--iterations" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --iterations".into());
                    };
                    iterations = v
                        .parse::<usize>()
                        .map_err(|_| "invalid value for --iterations".to_string())?
                        .clamp(1, 20);
                }
                "--output" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --output".into());
                    };
                    output = Some(PathBuf::from(v));
                }
                "--help" | "-h" => {
                    println!(
                        "Usage: cargo run -p murmur-core --bin frontend_bench -- \\
  [--resource <file>] [--fixtures <dir>] [--threads 1,2,4,8] \\
  [--iterations <n>] [--output <file.json>]"
                    );
                    std::process::exit(0);
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }

        Ok(Args {
            resource,
            fixtures_dir,
            threads,
            iterations,
            output,
        })
    }

    fn collect_wavs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), String> {
        for entry in std::fs::read_dir(dir).map_err(|e| e.to_string())? {
            let path = entry.map_err(|e| e.to_string())?.path();
            if path.is_dir() {
                collect_wavs(&path, out)?;
            } else if path
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case("wav"))
                .unwrap_or(false)
            {
                out.push(path);
            }
        }
        Ok(())
    }

    fn percentile(values: &[f64], p: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let idx = ((sorted.len() - 1) as f64 * p.clamp(0.0, 1.0)).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    let filters = match &args.resource {
        Some(path) => {
            let resources = murmur_core::resource::load(path, LanguageMode::Multilingual)
                .map_err(|e| e.to_string())?;
            resources.filters
        }
        None => MelFilterBank::new(N_MELS, N_FREQS, vec![0.01; N_MELS * N_FREQS])
            .map_err(|e| e.to_string())?,
    };
    let engine = SpectrogramEngine::new(Arc::new(filters));

    // (label, samples) inputs: fixtures when given, one synthetic chunk otherwise.
    let mut inputs: Vec<(String, Vec<f32>)> = Vec::new();
    if let Some(dir) = &args.fixtures_dir {
        let mut wavs = Vec::new();
        collect_wavs(dir, &mut wavs)?;
        wavs.sort();
        if wavs.is_empty() {
            return Err(format!("no .wav fixtures found in {}", dir.display()));
        }
        for wav in &wavs {
            let samples = read_wav_mono(wav).map_err(|e| e.to_string())?;
            let label = wav.strip_prefix(dir).unwrap_or(wav).display().to_string();
            inputs.push((label, samples));
        }
    } else {
        let synthetic: Vec<f32> = (0..CHUNK_SAMPLES)
            .map(|i| (i as f32 * 0.013).sin() * 0.5)
            .collect();
        inputs.push(("synthetic-30s".into(), synthetic));
    }

    println!(
        "Benchmarking {} input(s), threads={:?}, iterations={}",
        inputs.len(),
        args.threads,
        args.iterations
    );

    let mut cases = Vec::new();
    let mut thread_counts = Vec::new();
    for &threads in &args.threads {
        let mut latencies = Vec::new();
        for (label, samples) in &inputs {
            for iteration in 1..=args.iterations {
                let started = Instant::now();
                let mel = engine.compute(samples, threads);
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                assert_eq!(mel.data.len(), mel.n_mel * mel.n_len);
                latencies.push(latency_ms);
                cases.push(CaseResult {
                    file: label.clone(),
                    threads,
                    iteration,
                    latency_ms,
                });
            }
        }
        let avg = latencies.iter().sum::<f64>() / latencies.len() as f64;
        println!(
            "threads={threads}: p50={:.1}ms p95={:.1}ms avg={avg:.1}ms",
            percentile(&latencies, 0.50),
            percentile(&latencies, 0.95)
        );
        thread_counts.push(ThreadSummary {
            threads,
            runs: latencies.len(),
            p50_latency_ms: percentile(&latencies, 0.50),
            p95_latency_ms: percentile(&latencies, 0.95),
            avg_latency_ms: avg,
        });
    }

    let summary = Summary {
        iterations: args.iterations,
        total_runs: cases.len(),
        total_files: inputs.len(),
        thread_counts,
        cases,
    };

    let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
    if let Some(out) = args.output {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        std::fs::write(&out, json).map_err(|e| e.to_string())?;
        println!("Wrote benchmark report: {}", out.display());
    } else {
        println!("{json}");
    }

    Ok(())
}
