//! Simulator: runs one task per processor against a shared `System`.
//!
//! Each task runs on its own scoped thread and replays its workload for the
//! configured number of passes. Tasks never share mutable state except
//! through the barrier, interconnect, and global memory. A task that fails
//! aborts the barrier so every other task unwinds instead of waiting forever.

use std::sync::Arc;
use std::thread;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::common::{SimError, SimResult};
use crate::config::Config;
use crate::core::Processor;
use crate::sched::Barrier;
use crate::sim::workload::Workload;
use crate::soc::System;
use crate::stats::ProcessorStats;

/// Counters of one processor, one entry per pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessorReport {
    /// Tile index.
    pub id: usize,
    /// Counters captured at the end of each pass.
    pub passes: Vec<ProcessorStats>,
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimReport {
    /// Global tick at the end of the run.
    pub total_ticks: u64,
    /// Most requests the memory controller held at once.
    pub controller_high_water: usize,
    /// Requests the memory controller admitted.
    pub controller_admitted: u64,
    /// Per-processor counters, by tile index.
    pub processors: Vec<ProcessorReport>,
}

impl SimReport {
    /// Renders the report as JSON.
    pub fn to_json(&self) -> SimResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Aborts the barrier if the owning task unwinds.
struct AbortOnPanic(Arc<Barrier>);

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

/// Top-level simulator: the shared system plus the task runner.
#[derive(Debug)]
pub struct Simulator {
    system: System,
}

impl Simulator {
    /// Builds the system described by `config`.
    pub fn new(config: Config) -> SimResult<Self> {
        Ok(Self { system: System::new(config)? })
    }

    /// The shared machine.
    pub const fn system(&self) -> &System {
        &self.system
    }

    /// Runs `workloads[i]` on processor `i` until every task finishes.
    ///
    /// Every page a workload touches is mapped in the global page table first.
    ///
    /// # Returns
    ///
    /// The report, or the first error other than `Aborted` that a task hit.
    pub fn run(&self, workloads: &[Workload]) -> SimResult<SimReport> {
        let system = &self.system;
        if workloads.len() > system.tile_count() {
            return Err(SimError::InvalidConfig(format!(
                "{} workloads for {} tiles",
                workloads.len(),
                system.tile_count()
            )));
        }

        for workload in workloads {
            workload.validate()?;
        }
        let shift = system.config().paging.page_shift;
        for workload in workloads {
            for page in workload.footprint(shift) {
                let _ = system.map_page(page)?;
            }
        }

        let processors =
            (0..workloads.len()).map(|id| system.processor(id)).collect::<SimResult<Vec<Processor>>>()?;
        let barrier = Arc::clone(system.barrier());
        for _ in &processors {
            barrier.register_task();
        }
        let passes = system.config().simulation.passes;
        info!(tasks = processors.len(), passes, "Run starting");

        let results: Vec<SimResult<ProcessorReport>> = thread::scope(|scope| {
            let handles: Vec<_> = processors
                .into_iter()
                .zip(workloads)
                .map(|(processor, workload)| {
                    let barrier = Arc::clone(&barrier);
                    scope.spawn(move || {
                        let _guard = AbortOnPanic(Arc::clone(&barrier));
                        let id = processor.id();
                        let result = run_task(processor, workload, passes);
                        match &result {
                            Ok(_) | Err(SimError::Aborted) => {}
                            Err(err) => {
                                error!(processor = id, %err, "Task failed");
                                barrier.abort();
                            }
                        }
                        result
                    })
                })
                .collect();
            barrier.begin();
            handles
                .into_iter()
                .enumerate()
                .map(|(id, handle)| handle.join().unwrap_or(Err(SimError::TaskPanicked { processor: id })))
                .collect()
        });

        let mut reports = Vec::with_capacity(results.len());
        let mut aborted = false;
        for result in results {
            match result {
                Ok(report) => reports.push(report),
                Err(SimError::Aborted) => aborted = true,
                Err(err) => return Err(err),
            }
        }
        if aborted {
            return Err(SimError::Aborted);
        }

        let controller = system.interconnect().controller();
        let report = SimReport {
            total_ticks: barrier.tick(),
            controller_high_water: controller.high_water(),
            controller_admitted: controller.admitted(),
            processors: reports,
        };
        info!(ticks = report.total_ticks, high_water = report.controller_high_water, "Run complete");
        Ok(report)
    }
}

fn run_task(mut processor: Processor, workload: &Workload, passes: usize) -> SimResult<ProcessorReport> {
    processor.start()?;
    let mut stats = Vec::with_capacity(passes);
    for pass in 0..passes {
        for op in workload.ops() {
            processor.execute(op)?;
        }
        processor.flush_pages()?;
        stats.push(*processor.stats());
        debug!(processor = processor.id(), pass, ticks = processor.total_ticks(), "Pass complete");
        processor.reset_counters();
    }
    processor.finish();
    Ok(ProcessorReport { id: processor.id(), passes: stats })
}
