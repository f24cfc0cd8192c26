//! CSV and log reports for benchmark timings
//!
//! One report per strategy. Column order is always erosion, dilation,
//! opening, closing (see [`Operator::ALL`]).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::morphology::{Operator, Strategy};

/// Mean per-image time and whole-batch time, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timing {
    pub mean: f64,
    pub total: f64,
}

impl Timing {
    /// Element-wise `self / other`; zero denominators give 0
    pub fn ratio(&self, other: &Timing) -> Timing {
        let div = |a: f64, b: f64| if b > 0.0 { a / b } else { 0.0 };
        Timing {
            mean: div(self.mean, other.mean),
            total: div(self.total, other.total),
        }
    }
}

/// Timings of the four operators for one thread count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingRow {
    pub threads: usize,
    /// Indexed like [`Operator::ALL`]
    pub times: [Timing; 4],
}

/// Sequential baseline and parallel rows of one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub sequential: [Timing; 4],
    pub parallel: Vec<TimingRow>,
}

/// Paths written by [`StrategyReport::write_all`]
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub times_csv: PathBuf,
    pub speedup_csv: PathBuf,
    pub log: PathBuf,
}

impl StrategyReport {
    pub fn new(strategy: Strategy, sequential: [Timing; 4]) -> Self {
        Self {
            strategy,
            sequential,
            parallel: Vec::new(),
        }
    }

    /// Sequential time divided by parallel time, per thread count
    pub fn speedups(&self) -> Vec<TimingRow> {
        self.parallel
            .iter()
            .map(|row| TimingRow {
                threads: row.threads,
                times: std::array::from_fn(|i| self.sequential[i].ratio(&row.times[i])),
            })
            .collect()
    }

    /// `Threads,E_Mean_Seq,E_Total_Seq,E_Mean_Par,E_Total_Par,D_...`
    pub fn write_times_csv<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut header = vec!["Threads".to_string()];
        for op in Operator::ALL {
            let l = op.letter();
            for column in ["Mean_Seq", "Total_Seq", "Mean_Par", "Total_Par"] {
                header.push(format!("{}_{}", l, column));
            }
        }
        writeln!(out, "{}", header.join(","))?;

        for row in &self.parallel {
            let mut fields = vec![row.threads.to_string()];
            for (seq, par) in self.sequential.iter().zip(&row.times) {
                fields.push(format!("{:.6}", seq.mean));
                fields.push(format!("{:.6}", seq.total));
                fields.push(format!("{:.6}", par.mean));
                fields.push(format!("{:.6}", par.total));
            }
            writeln!(out, "{}", fields.join(","))?;
        }
        Ok(())
    }

    /// `Threads,E_Mean,D_Mean,O_Mean,C_Mean,E_Total,D_Total,O_Total,C_Total`
    pub fn write_speedup_csv<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Threads,E_Mean,D_Mean,O_Mean,C_Mean,E_Total,D_Total,O_Total,C_Total")?;
        for row in self.speedups() {
            let means = row.times.iter().map(|t| format!("{:.4}", t.mean));
            let totals = row.times.iter().map(|t| format!("{:.4}", t.total));
            let fields: Vec<String> = std::iter::once(row.threads.to_string())
                .chain(means)
                .chain(totals)
                .collect();
            writeln!(out, "{}", fields.join(","))?;
        }
        Ok(())
    }

    /// Human-readable mirror of both tables
    pub fn write_log<W: Write>(&self, out: &mut W, label: &str) -> io::Result<()> {
        writeln!(
            out,
            "Strategy {} ({}) - {}",
            self.strategy.label(),
            self.strategy,
            label
        )?;
        writeln!(out)?;
        writeln!(out, "Sequential:")?;
        for (op, t) in Operator::ALL.iter().zip(&self.sequential) {
            writeln!(
                out,
                "  {:<9} mean {:>10.6}s  total {:>10.6}s",
                op.name(),
                t.mean,
                t.total
            )?;
        }

        let speedups = self.speedups();
        for (row, speedup) in self.parallel.iter().zip(&speedups) {
            writeln!(out)?;
            writeln!(out, "Parallel, {} threads:", row.threads)?;
            for (i, op) in Operator::ALL.iter().enumerate() {
                let (t, s) = (row.times[i], speedup.times[i]);
                writeln!(
                    out,
                    "  {:<9} mean {:>10.6}s ({:>5.2}x)  total {:>10.6}s ({:>5.2}x)",
                    op.name(),
                    t.mean,
                    s.mean,
                    t.total,
                    s.total
                )?;
            }
        }
        Ok(())
    }

    /// Write `csv_times_*`, `csv_speedup_*` and `log_*` files into `dir`
    pub fn write_all<P: AsRef<Path>>(&self, dir: P, label: &str) -> Result<ReportFiles> {
        let dir = dir.as_ref();
        let tag = self.strategy.label();
        let files = ReportFiles {
            times_csv: dir.join(format!("csv_times_{}_{}.csv", tag, label)),
            speedup_csv: dir.join(format!("csv_speedup_{}_{}.csv", tag, label)),
            log: dir.join(format!("log_{}_{}.txt", tag, label)),
        };

        let mut times = BufWriter::new(File::create(&files.times_csv)?);
        self.write_times_csv(&mut times)?;
        times.flush()?;

        let mut speedup = BufWriter::new(File::create(&files.speedup_csv)?);
        self.write_speedup_csv(&mut speedup)?;
        speedup.flush()?;

        let mut log = BufWriter::new(File::create(&files.log)?);
        self.write_log(&mut log, label)?;
        log.flush()?;

        Ok(files)
    }
}
