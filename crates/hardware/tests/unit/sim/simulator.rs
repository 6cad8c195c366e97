//! Simulator Tests.
//!
//! Runs whole workloads on threaded processors and checks the reports:
//! - Faults only on the first pass over a resident working set
//! - Dirty data reaching global memory
//! - Power gating completing with a tight budget
//! - Workload ingestion from JSON

use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tilesim_core::common::SimError;
use tilesim_core::config::Config;
use tilesim_core::sim::{MemoryOp, Simulator, Workload};

use crate::common::harness::small_config;
use crate::common::init_tracing;

fn stores(first_page: u64, pages: u64, shift: u32) -> Workload {
    (first_page..first_page + pages)
        .flat_map(|page| {
            let base = page << shift;
            [MemoryOp::store(base, 8, page + 1), MemoryOp::load(base + 0x40, 8)]
        })
        .collect()
}

fn simulator(config: Config) -> Simulator {
    init_tracing();
    Simulator::new(config).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Runs
// ══════════════════════════════════════════════════════════

#[test]
fn resident_working_set_faults_only_on_first_pass() {
    let mut config = small_config();
    config.simulation.passes = 2;
    let shift = config.paging.page_shift;
    let sim = simulator(config);
    let workloads = [stores(0, 4, shift), stores(100, 4, shift)];

    let report = sim.run(&workloads).unwrap();
    assert_eq!(report.processors.len(), 2);
    for processor in &report.processors {
        assert_eq!(processor.passes.len(), 2);
        assert!(processor.passes[0].hard_faults > 0);
        assert_eq!(processor.passes[1].hard_faults, 0);
        assert_eq!(processor.passes[1].combo_faults, 0);
    }
    assert!(report.controller_high_water <= sim.system().config().interconnect.admission_limit);
    assert!(report.controller_admitted > 0);
    assert!(report.total_ticks > 0);
}

#[test]
fn run_publishes_stores_to_global_memory() {
    let config = small_config();
    let shift = config.paging.page_shift;
    let sim = simulator(config);
    let _ = sim.run(&[stores(10, 2, shift)]).unwrap();

    for page in 10..12u64 {
        let mut buf = [0u8; 8];
        sim.system().read_virtual(page << shift, &mut buf).unwrap();
        assert_eq!(u64::from_le_bytes(buf), page + 1);
    }
}

#[test]
fn tight_power_budget_stalls_but_completes() {
    let mut config = small_config();
    config.power.enabled = true;
    config.power.max_active = 1;
    let shift = config.paging.page_shift;
    let sim = simulator(config);

    let report = sim.run(&[stores(0, 2, shift), stores(50, 2, shift)]).unwrap();
    assert!(report.processors[1].passes[0].blocks > 0);
    assert!(sim.system().barrier().power_queue().is_empty());
}

#[test]
fn empty_workloads_finish_immediately() {
    let sim = simulator(small_config());
    let report = sim.run(&[Workload::default(), Workload::default()]).unwrap();
    for processor in &report.processors {
        assert_eq!(processor.passes[0].hard_faults, 0);
        assert_eq!(processor.passes[0].write_backs, 0);
    }
}

#[test]
fn more_workloads_than_tiles_is_rejected() {
    let sim = simulator(small_config());
    let workloads = vec![Workload::default(); 3];
    assert!(matches!(sim.run(&workloads), Err(SimError::InvalidConfig(_))));
}

#[test]
fn oversized_access_is_rejected_before_the_run() {
    let sim = simulator(small_config());
    let workload: Workload = [MemoryOp::load(0, 16)].into_iter().collect();
    assert!(matches!(sim.run(&[workload]), Err(SimError::InvalidConfig(_))));
}

#[test]
fn access_wrapping_the_address_space_aborts_the_run() {
    let sim = simulator(small_config());
    let workload: Workload = [MemoryOp::load(u64::MAX - 3, 8)].into_iter().collect();
    assert!(matches!(sim.run(&[workload]), Err(SimError::AddressOverflow { len: 8, .. })));
}

#[test]
fn report_renders_as_json() {
    let config = small_config();
    let shift = config.paging.page_shift;
    let sim = simulator(config);
    let report = sim.run(&[stores(0, 1, shift)]).unwrap();
    let json = report.to_json().unwrap();
    assert_eq!(json["processors"][0]["id"], 0);
    assert_eq!(json["processors"][0]["passes"][0]["hard_faults"], 1);
}

// ══════════════════════════════════════════════════════════
// 2. Workload Ingestion
// ══════════════════════════════════════════════════════════

#[test]
fn workload_loads_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"kind": "store", "address": 4096, "size": 4, "value": 7}},
            {{"kind": "load", "address": 4096, "size": 4}},
            {{"kind": "fetch", "address": 0}}
        ]"#
    )
    .unwrap();

    let workload = Workload::from_file(file.path()).unwrap();
    assert_eq!(
        workload.ops(),
        &[MemoryOp::store(4096, 4, 7), MemoryOp::load(4096, 4), MemoryOp::fetch(0, 8)]
    );
}

#[test]
fn malformed_workload_is_a_parse_error() {
    let err = Workload::from_json_str(r#"[{"kind": "jump", "address": 0}]"#).unwrap_err();
    assert!(matches!(err, SimError::ConfigParse(_)));
}
