use anyhow::{bail, Context, Result};
use chroma_rs::descriptors::{DescriptorConfig, DescriptorKernel, PeakDescriptors};
use chroma_rs::kernel::KernelLifecycle;
use chroma_rs::signal::traits::PeakDescribe;
use chroma_rs::signal::{
    detect_peaks, extend_left, extend_right, Chromatogram, PeakDetectConfig, PeakRegion,
    ScoreStrategy,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PYTHON_BIN: &str = "python";

/// Samples added on each side of a detected region before describing it.
const DEFAULT_EXTEND: usize = 2;

const DEMO_SIGNAL: [f64; 43] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.1, 1.0, 0.8, 0.9, 1.0, 1.2, 0.9, 1.0, 1.0, 1.1, 1.2, 1.0,
    1.5, 1.0, 3.0, 2.0, 5.0, 3.0, 2.0, 1.0, 1.0, 1.0, 0.9, 1.0, 1.0, 3.0, 2.6, 4.0, 3.0, 3.2, 2.0,
    1.0, 1.0, 1.0, 1.0, 1.0,
];

const PY_PEAK_SCRIPT: &str = r#"
import json
import sys
import time
from math import sqrt

env = json.loads(sys.stdin.read())
iters = int(env["iters"])
p = env["payload"]
t = [float(v) for v in p["time"]]
x = [float(v) for v in p["signal"]]
k = int(p["window_size"])
h = float(p["threshold"])
strategy = p["strategy"]
npnt = int(p["extend"])

def max_drop(i):
    left = max([0.0] + [x[i] - x[i - j] for j in range(1, k + 1)])
    right = max([0.0] + [x[i] - x[i + j] for j in range(1, k + 1)])
    return (left + right) / 2.0

def average_drop(i):
    left = sum(x[i] - x[i - j] for j in range(1, k + 1)) / k
    right = (x[i] - x[i + k]) / k
    return (left + right) / 2.0

def mean_reference(i):
    left = x[i] - sum(x[i - j] for j in range(1, k + 1)) / k
    right = x[i] - x[i + k] / k
    return (left + right) / 2.0

def windowed_mean(i):
    left = x[i] - sum(x[i - j] for j in range(1, k + 1)) / k
    right = x[i] - sum(x[i + j] for j in range(1, k + 1)) / k
    return (left + right) / 2.0

SCORES = {
    "max_drop": max_drop,
    "average_drop": average_drop,
    "mean_reference": mean_reference,
    "windowed_mean": windowed_mean,
}

def detect():
    score = SCORES[strategy]
    a = [score(i) for i in range(k, len(x) - k)]
    pos = [v for v in a if v > 0]
    if not pos:
        return []
    mean = sum(pos) / len(pos)
    stdev = sqrt(sum((v - mean) ** 2 for v in pos) / (len(pos) - 1))
    cut = mean + h * stdev
    regions, run = [], []
    for j, v in enumerate(a):
        if v > 0 and v > cut:
            run.append([t[j + k], x[j + k]])
        elif run:
            regions.append(run)
            run = []
    if run:
        regions.append(run)
    return regions

def index_of(tv):
    for i, ti in enumerate(t):
        if abs(ti - tv) < 1e-6:
            return i
    return None

def extend(region):
    if npnt == 0:
        return region
    lo = index_of(region[0][0])
    hi = index_of(region[-1][0])
    left = [[t[i], x[i]] for i in range(max(lo - npnt, 0), lo)]
    right = [[t[i], x[i]] for i in range(hi + 1, min(hi + npnt, len(t) - 1) + 1)]
    return left + region + right

def mu1(ts, ss):
    n = d = 0.0
    for i in range(len(ts) - 1):
        n += (ss[i] + ss[i + 1]) * (ts[i] + ts[i + 1])
        d += ss[i] + ss[i + 1]
    return n / (2 * d) if d != 0.0 else 0.0

def mu2(ts, ss, m1):
    n = d = 0.0
    for i in range(len(ts) - 1):
        n += (ss[i] + ss[i + 1]) * (((ts[i] + ts[i + 1]) / 2.0) - m1) ** 2
        d += ss[i] + ss[i + 1]
    return n / d if d != 0.0 else 0.0

def integrate(ys, step):
    if len(ys) < 2:
        return 0.0
    total = ys[0] + ys[-1]
    for j, y in enumerate(ys[1:-1]):
        total += (4 if j % 2 == 0 else 2) * y
    return total * step / 3.0

def describe(region):
    ts = [r[0] for r in region]
    ss = [r[1] for r in region]
    if len(ts) < 2:
        return [0.0, 0.0, 0.0]
    m1 = mu1(ts, ss)
    return [m1, mu2(ts, ss, m1), integrate(ss, ts[1] - ts[0])]

def _compute():
    regions = detect()
    return regions, [describe(extend(r)) for r in regions]

regions, descriptors = _compute()

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "regions": regions,
    "descriptors": descriptors,
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0]
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    regions: Vec<Vec<[f64; 2]>>,
    descriptors: Vec<[f64; 3]>,
    avg_ns: f64,
    python_version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    strategy: ScoreStrategy,
    regions_rust: usize,
    regions_python: usize,
    points_max_abs: f64,
    descriptors_mae: f64,
    descriptors_max_abs: f64,
    rust_ns: f64,
    python_ns: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    rows: Vec<ContractRow>,
}

/// Optional JSON overrides for the `demo` command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    detect: PeakDetectConfig<f64>,
    extend: usize,
    step: Option<f64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            detect: PeakDetectConfig {
                window_size: 4,
                threshold: 1.5,
                strategy: ScoreStrategy::MaxDrop,
            },
            extend: DEFAULT_EXTEND,
            step: None,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("demo") => run_demo(args.next().map(PathBuf::from).as_deref()),
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- demo [config.json]");
            eprintln!("  cargo run -p xtask -- contracts");
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        eprintln!("tracing subscriber already installed");
    }
}

fn load_demo_config(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("parsing demo config {}", path.display()))?;
    info!(path = %path.display(), "loaded demo config");
    Ok(config)
}

fn run_demo(config_path: Option<&Path>) -> Result<()> {
    let config = load_demo_config(config_path)?;
    let time = demo_time();
    let chrom = Chromatogram::try_new(&time, &DEMO_SIGNAL).context("building demo chromatogram")?;
    let regions =
        detect_peaks(&time, &DEMO_SIGNAL, &config.detect).context("detecting demo peaks")?;
    let describer = DescriptorKernel::try_new(DescriptorConfig { step: config.step })
        .context("building descriptor kernel")?;

    let bands = extend_all(&chrom, &regions, config.extend);
    let descriptors = describer.run(&bands);

    println!(
        "{} peak(s) with k={} h={} strategy={:?}",
        regions.len(),
        config.detect.window_size,
        config.detect.threshold,
        config.detect.strategy
    );
    for (n, (band, d)) in bands.iter().zip(descriptors.iter()).enumerate() {
        println!("Peak {}", n + 1);
        for p in band.points() {
            println!("  {:>8.3} {:>8.3}", p.time, p.intensity);
        }
        println!("  mu1={:.6} mu2={:.6} area={:.6}", d.mu1, d.mu2, d.area);
    }
    Ok(())
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    fs::create_dir_all(&out_dir).context("creating contract output directories")?;

    let python_bin = detect_python_bin();
    let mut rows = Vec::new();
    let mut python_version = String::from("unknown");

    let demo = demo_time();
    let (synthetic_time, synthetic_signal) = synthetic_chromatogram(2_000);
    let mut spike_signal: Vec<f64> = (0..24).map(|i| [1.0, 1.1, 1.0, 0.9][i % 4]).collect();
    spike_signal[12] = 6.0;
    let spike_time: Vec<f64> = (0..24).map(f64::from).collect();

    let cases: Vec<(&str, &[f64], &[f64], usize)> = vec![
        ("demo", demo.as_slice(), &DEMO_SIGNAL[..], 4),
        ("synthetic_bands", synthetic_time.as_slice(), synthetic_signal.as_slice(), 8),
        ("isolated_spike", spike_time.as_slice(), spike_signal.as_slice(), 3),
    ];
    let strategies = [
        ScoreStrategy::MaxDrop,
        ScoreStrategy::AverageDrop,
        ScoreStrategy::MeanReference,
        ScoreStrategy::WindowedMean,
    ];

    for (name, time, signal, window_size) in cases {
        for strategy in strategies {
            let config = PeakDetectConfig {
                window_size,
                threshold: 1.5,
                strategy,
            };
            let case_id = format!("{name}_{}", strategy_id(strategy));
            match run_case(&python_bin, &case_id, time, signal, &config)? {
                Some((row, version)) => {
                    python_version = version;
                    rows.push(row);
                }
                None => warn!(case_id = %case_id, "skipped case with degenerate score statistics"),
            }
        }
    }

    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.to_string_lossy().into_owned(),
        python_version,
        rows,
    };

    let summary_json = out_dir.join("summary.json");
    fs::write(
        &summary_json,
        serde_json::to_vec_pretty(&bundle).context("serializing contract summary")?,
    )
    .with_context(|| format!("writing {}", summary_json.display()))?;
    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;

    let mismatched: Vec<&str> = bundle
        .rows
        .iter()
        .filter(|r| r.regions_rust != r.regions_python || r.descriptors_max_abs > 1e-9)
        .map(|r| r.case_id.as_str())
        .collect();

    println!("Contract artifacts:");
    println!("  - {}", summary_json.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - cases: {}", bundle.rows.len());

    if !mismatched.is_empty() {
        bail!("contract mismatch in cases: {}", mismatched.join(", "));
    }
    Ok(())
}

fn run_case(
    python_bin: &Path,
    case_id: &str,
    time: &[f64],
    signal: &[f64],
    config: &PeakDetectConfig<f64>,
) -> Result<Option<(ContractRow, String)>> {
    let chrom = Chromatogram::try_new(time, signal)
        .with_context(|| format!("case {case_id} has an invalid chromatogram"))?;
    let describer = DescriptorKernel::try_new(DescriptorConfig::default())
        .context("building descriptor kernel")?;

    let regions = match detect_peaks(time, signal, config) {
        Ok(regions) => regions,
        Err(chroma_rs::Error::DegenerateStatistics { positive_scores }) => {
            debug!(case_id, positive_scores, "degenerate case");
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("case {case_id} detection failed")),
    };
    let descriptors = describer.run(&extend_all(&chrom, &regions, DEFAULT_EXTEND));

    let py = python_peak_eval(
        python_bin,
        json!({
            "time": time,
            "signal": signal,
            "window_size": config.window_size,
            "threshold": config.threshold,
            "strategy": strategy_id(config.strategy),
            "extend": DEFAULT_EXTEND,
        }),
        50,
    )?;

    let rust_ns = benchmark_avg_ns(50, || {
        let regions = detect_peaks(time, signal, config)
            .with_context(|| format!("case {case_id} benchmark failed"))?;
        let _ = describer.run(&extend_all(&chrom, &regions, DEFAULT_EXTEND));
        Ok(())
    })?;

    let rust_points = flatten_regions(&regions);
    let python_points: Vec<f64> = py.regions.iter().flatten().flatten().copied().collect();
    let rust_desc = flatten_descriptors(&descriptors);
    let python_desc: Vec<f64> = py.descriptors.iter().flatten().copied().collect();

    let comparable = regions.len() == py.regions.len();
    if comparable {
        ensure_same_length(case_id, &rust_points, &python_points)?;
        ensure_same_length(case_id, &rust_desc, &python_desc)?;
    } else {
        warn!(
            case_id,
            rust = regions.len(),
            python = py.regions.len(),
            "region counts differ"
        );
    }

    let row = ContractRow {
        case_id: case_id.to_string(),
        strategy: config.strategy,
        regions_rust: regions.len(),
        regions_python: py.regions.len(),
        points_max_abs: if comparable {
            max_abs_error(&rust_points, &python_points)
        } else {
            f64::NAN
        },
        descriptors_mae: if comparable {
            mean_abs_error(&rust_desc, &python_desc)
        } else {
            f64::NAN
        },
        descriptors_max_abs: if comparable {
            max_abs_error(&rust_desc, &python_desc)
        } else {
            f64::NAN
        },
        rust_ns,
        python_ns: py.avg_ns,
        speedup_vs_python: py.avg_ns / rust_ns,
    };
    info!(
        case_id,
        regions = row.regions_rust,
        max_abs = row.descriptors_max_abs,
        "contract case complete"
    );
    Ok(Some((row, py.python_version)))
}

fn demo_time() -> Vec<f64> {
    (1..=43).map(f64::from).collect()
}

/// Gaussian bands on a rippled baseline.
fn synthetic_chromatogram(samples: usize) -> (Vec<f64>, Vec<f64>) {
    let time: Vec<f64> = (0..samples).map(|i| i as f64 * 0.05).collect();
    let span = samples as f64 * 0.05;
    let bands = [(0.15, 5.0, 0.6), (0.4, 8.0, 1.2), (0.7, 3.0, 0.4), (0.85, 6.0, 2.0)];
    let signal = time
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let peaks: f64 = bands
                .iter()
                .map(|(center, height, width)| {
                    let z = (t - center * span) / width;
                    height * (-0.5 * z * z).exp()
                })
                .sum();
            1.0 + peaks + 0.02 * (i as f64 * 1.7).sin()
        })
        .collect();
    (time, signal)
}

fn extend_all(
    chrom: &Chromatogram<'_, f64>,
    regions: &[PeakRegion<f64>],
    npnt: usize,
) -> Vec<PeakRegion<f64>> {
    regions
        .iter()
        .map(|r| extend_right(chrom, &extend_left(chrom, r, npnt), npnt))
        .collect()
}

fn strategy_id(strategy: ScoreStrategy) -> &'static str {
    match strategy {
        ScoreStrategy::MaxDrop => "max_drop",
        ScoreStrategy::AverageDrop => "average_drop",
        ScoreStrategy::MeanReference => "mean_reference",
        ScoreStrategy::WindowedMean => "windowed_mean",
    }
}

fn flatten_regions(regions: &[PeakRegion<f64>]) -> Vec<f64> {
    regions
        .iter()
        .flat_map(|r| r.points().iter().flat_map(|p| [p.time, p.intensity]))
        .collect()
}

fn flatten_descriptors(descriptors: &[PeakDescriptors<f64>]) -> Vec<f64> {
    descriptors
        .iter()
        .flat_map(|d| [d.mu1, d.mu2, d.area])
        .collect()
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_peak_eval(
    python_bin: &Path,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_PEAK_SCRIPT,
        json!({
            "iters": iters,
            "payload": payload
        }),
    )
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(&payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    let parsed: PythonEval = serde_json::from_str(stdout.trim()).context("parsing python json")?;
    Ok(parsed)
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("case_id,strategy,regions_rust,regions_python,points_max_abs,descriptors_mae,descriptors_max_abs,rust_ns,python_ns,speedup_vs_python\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{:.12},{:.12},{:.12},{:.3},{:.3},{:.6}\n",
            row.case_id,
            strategy_id(row.strategy),
            row.regions_rust,
            row.regions_python,
            row.points_max_abs,
            row.descriptors_mae,
            row.descriptors_max_abs,
            row.rust_ns,
            row.python_ns,
            row.speedup_vs_python
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
