use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use sigcorr::kernel::HandleLifecycle;
use sigcorr::signal::correlate::{
    cross_correlate_simd, CrossCorrelateConfig, CrossCorrelateKernel, Strategy,
};
use sigcorr::signal::traits::CrossCorrelate1D;
use sigcorr::vector::VectorBackend;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_ITERS: usize = 50;

/// Relative tolerance every strategy must meet against the `f64` reference.
const PARITY_TOLERANCE: f64 = 1e-4;

/// `(x_len, h_len)` pairs covering each strategy's sweet spot and the edges.
const SHAPES: [(usize, usize); 9] = [
    (1, 1),
    (8, 3),
    (16, 4),
    (257, 257),
    (1000, 10),
    (4096, 64),
    (4096, 2048),
    (16_384, 129),
    (65_536, 512),
];

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ParityRow {
    case_id: String,
    candidate: String,
    backend: String,
    x_len: usize,
    h_len: usize,
    max_abs: f64,
    relative_max_abs: f64,
    candidate_ns: f64,
    baseline_ns: f64,
    speedup_vs_baseline: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParityBundle {
    generated_epoch_seconds: u64,
    backend: String,
    iters: usize,
    tolerance: f64,
    rows: Vec<ParityRow>,
}

struct ParityArgs {
    backend: VectorBackend,
    iters: usize,
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("parity") => run_parity(parse_parity_args(args)?),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- parity [--backend scalar|lanes4|lanes8] [--iters N]");
            Ok(())
        }
    }
}

fn parse_parity_args(mut args: impl Iterator<Item = String>) -> Result<ParityArgs> {
    let mut parsed = ParityArgs {
        backend: VectorBackend::detect(),
        iters: DEFAULT_ITERS,
    };
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| anyhow!("missing value for {flag}"))?;
        match flag.as_str() {
            "--backend" => parsed.backend = value.parse()?,
            "--iters" => {
                parsed.iters = value
                    .parse()
                    .with_context(|| format!("parsing --iters value {value:?}"))?;
                if parsed.iters == 0 {
                    bail!("--iters must be > 0");
                }
            }
            _ => bail!("unknown flag {flag}"),
        }
    }
    Ok(parsed)
}

fn run_parity(args: ParityArgs) -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/parity/{ts}"));
    fs::create_dir_all(&out_dir).context("creating parity output directory")?;

    let mut rows = Vec::new();
    for (x_len, h_len) in SHAPES {
        let x = test_signal(x_len, 27.0);
        let h = test_signal(h_len, 5.0);
        let reference = reference_correlation(&x, &h);

        let mut baseline = vec![0.0f32; x_len];
        let baseline_ns = fastest_call_ns(args.iters, || {
            cross_correlate_simd(false, &x, &h, &mut baseline)
                .map_err(|e| anyhow!("scalar baseline failed: {e}"))
        })?;

        let forced = Strategy::ALL.map(Some);
        for strategy in forced.into_iter().chain([None]) {
            let mut config = CrossCorrelateConfig::new(x_len, h_len).with_backend(args.backend);
            config.strategy = strategy;
            let mut kernel = CrossCorrelateKernel::try_new(config)
                .map_err(|e| anyhow!("{x_len}x{h_len} ({strategy:?}): {e}"))?;
            let candidate = match strategy {
                Some(strategy) => strategy.to_string(),
                None => format!("adaptive:{}", kernel.strategy()),
            };
            let case_id = format!("{candidate}_{x_len}x{h_len}");

            let mut out = vec![0.0f32; x_len];
            let candidate_ns = fastest_call_ns(args.iters, || {
                kernel
                    .run_into(&x, &h, &mut out)
                    .map_err(|e| anyhow!("{case_id} execution failed: {e}"))
            })?;
            kernel.finalize();

            let (max_abs, relative_max_abs) = deviation(&out, &reference);
            rows.push(ParityRow {
                case_id,
                candidate,
                backend: args.backend.to_string(),
                x_len,
                h_len,
                max_abs,
                relative_max_abs,
                candidate_ns,
                baseline_ns,
                speedup_vs_baseline: baseline_ns / candidate_ns,
            });
        }
    }

    let bundle = ParityBundle {
        generated_epoch_seconds: ts,
        backend: args.backend.to_string(),
        iters: args.iters,
        tolerance: PARITY_TOLERANCE,
        rows,
    };

    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;
    fs::write(
        out_dir.join("summary.json"),
        serde_json::to_vec_pretty(&bundle).context("serializing summary bundle")?,
    )
    .context("writing summary.json")?;

    println!("Parity artifacts generated in: {}", out_dir.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - {}", out_dir.join("summary.json").display());
    println!("  - backend: {}", bundle.backend);
    println!("  - cases: {}", bundle.rows.len());

    let failures: Vec<&ParityRow> = bundle
        .rows
        .iter()
        .filter(|row| row.relative_max_abs > PARITY_TOLERANCE)
        .collect();
    if !failures.is_empty() {
        for row in &failures {
            eprintln!(
                "  FAIL {}: relative max abs error {:.3e}",
                row.case_id, row.relative_max_abs
            );
        }
        bail!("{} case(s) exceeded the parity tolerance", failures.len());
    }
    Ok(())
}

fn test_signal(len: usize, period: f64) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let x = i as f64 / period;
            (x.sin() + 0.35 * (2.3 * x).cos() + 0.1 * (7.0 * x).sin()) as f32
        })
        .collect()
}

fn reference_correlation(x: &[f32], h: &[f32]) -> Vec<f64> {
    (0..x.len())
        .map(|n| {
            h.iter()
                .zip(&x[n..])
                .map(|(&hk, &xk)| f64::from(hk) * f64::from(xk))
                .sum::<f64>()
        })
        .collect()
}

/// Largest absolute deviation, and the same relative to the largest
/// reference magnitude (floored at 1).
fn deviation(output: &[f32], reference: &[f64]) -> (f64, f64) {
    let max_abs = output
        .iter()
        .zip(reference)
        .map(|(&o, r)| (f64::from(o) - r).abs())
        .fold(0.0, f64::max);
    let magnitude = reference.iter().fold(1.0f64, |m, r| m.max(r.abs()));
    (max_abs, max_abs / magnitude)
}

/// Fastest of `iters` timed calls, in nanoseconds.
fn fastest_call_ns<F>(iters: usize, mut call: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let mut fastest = f64::INFINITY;
    for _ in 0..iters {
        let start = Instant::now();
        call()?;
        fastest = fastest.min(start.elapsed().as_nanos() as f64);
    }
    Ok(fastest)
}

fn write_summary_csv(path: &Path, rows: &[ParityRow]) -> Result<()> {
    let mut out = String::from(
        "case_id,candidate,backend,x_len,h_len,max_abs,relative_max_abs,candidate_ns,baseline_ns,speedup_vs_baseline\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{:.12},{:.12},{:.1},{:.1},{:.4}\n",
            row.case_id,
            row.candidate,
            row.backend,
            row.x_len,
            row.h_len,
            row.max_abs,
            row.relative_max_abs,
            row.candidate_ns,
            row.baseline_ns,
            row.speedup_vs_baseline
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
