use std::io::Write;
use tempfile::NamedTempFile;
use crate::cache::AccessRequest;
use crate::config::SimulationConfig;
use crate::controller::ControllerState;
use crate::error::CacheError;
use crate::io::get_reader;
use crate::simulator::{parse_trace_line, CacheResult, Simulator, TraceTick};

fn config(json: &str) -> SimulationConfig {
    serde_json::from_str(json).unwrap()
}

fn two_way_config() -> SimulationConfig {
    config(r#"{ "caches": [ { "name": "l1", "lines": 8, "kind": "2way", "replacement_policy": "lru" } ] }"#)
}

#[test]
fn parses_trace_lines() {
    assert_eq!(parse_trace_line(1, "").unwrap(), None);
    assert_eq!(parse_trace_line(2, "   # a comment").unwrap(), None);
    assert_eq!(parse_trace_line(3, "reset").unwrap(), Some(TraceTick {
        request: AccessRequest::default(),
        reset: true,
        repeat: 1,
    }));
    assert_eq!(parse_trace_line(4, "w 0x1f ff").unwrap(), Some(TraceTick {
        request: AccessRequest::write(0x1F, 0xFF),
        reset: false,
        repeat: 1,
    }));
    assert_eq!(parse_trace_line(5, "R 10 x3").unwrap(), Some(TraceTick {
        request: AccessRequest::read(0x10, 0),
        reset: false,
        repeat: 3,
    }));
    assert_eq!(parse_trace_line(6, "reset x2").unwrap().unwrap().repeat, 2);
}

#[test]
fn rejects_malformed_lines() {
    assert!(matches!(parse_trace_line(7, "R zz"), Err(CacheError::Parse { line: 7, .. })));
    assert!(matches!(parse_trace_line(8, "X 10"), Err(CacheError::Parse { line: 8, .. })));
    assert!(matches!(parse_trace_line(9, "R 1FFFFFFFFFFFFFFFF"), Err(CacheError::Parse { line: 9, .. })));
}

#[test]
fn replays_a_trace() {
    let mut simulator = Simulator::new(&two_way_config()).unwrap();
    let trace = "reset\nR 20 AA x4\nR 21 BB x4\nR 20 0 x2\n";
    let result = simulator.simulate(trace.as_bytes()).unwrap();
    assert_eq!(result.ticks, 11);
    assert_eq!(result.caches, vec![CacheResult {
        name: "l1".to_string(),
        accesses: 3,
        hits: 1,
        hit_rate: 33,
        hit_ticks: 2,
    }]);
    assert_eq!(simulator.get_valid_line_counts(), vec![2]);
}

#[test]
fn results_accumulate_over_calls() {
    let mut simulator = Simulator::new(&two_way_config()).unwrap();
    simulator.simulate("R 20 AA x4\n".as_bytes()).unwrap();
    let result = simulator.simulate("R 20 AA x2\nR 21 BB x4\n".as_bytes()).unwrap();
    assert_eq!(result.ticks, 10);
    assert_eq!(result.caches[0].accesses, 2);
    assert_eq!(result.caches[0].hit_ticks, 2);
}

#[test]
fn reports_sequencing_violations_with_line() {
    let mut simulator = Simulator::new(&two_way_config()).unwrap();
    let result = simulator.simulate("R 20 AA x2\nR 24 BB\n".as_bytes());
    match result {
        Err(CacheError::Tick { line, cache, source }) => {
            assert_eq!(line, 2);
            assert_eq!(cache, "l1");
            assert!(matches!(*source, CacheError::SequencingViolation { state: ControllerState::Miss, expected: 0x20, found: 0x24 }));
        }
        other => panic!("expected a tick error, got {other:?}"),
    }
}

#[test]
fn rejects_bad_configurations() {
    assert!(matches!(Simulator::new(&config(r#"{ "caches": [] }"#)), Err(CacheError::Configuration(_))));
    let odd = config(r#"{ "caches": [ { "name": "odd", "lines": 12, "kind": "8way" } ] }"#);
    assert!(matches!(Simulator::new(&odd), Err(CacheError::Configuration(_))));
}

#[test]
fn replays_a_trace_file() {
    let mut config_file = NamedTempFile::new().unwrap();
    write!(config_file, r#"{{ "caches": [
        {{ "name": "direct", "lines": 4, "kind": "direct" }},
        {{ "name": "full", "lines": 4, "kind": "full", "replacement_policy": "lru" }}
    ] }}"#).unwrap();
    let mut trace_file = NamedTempFile::new().unwrap();
    writeln!(trace_file, "reset").unwrap();
    for _ in 0..2 {
        writeln!(trace_file, "R 1 11 x4").unwrap();
        writeln!(trace_file, "R 5 55 x4").unwrap();
    }

    let config: SimulationConfig = serde_json::from_reader(config_file.reopen().unwrap()).unwrap();
    let mut simulator = Simulator::new(&config).unwrap();
    let result = simulator.simulate(get_reader(trace_file.reopen().unwrap()).unwrap()).unwrap();
    assert_eq!(result.ticks, 17);
    // 1 and 5 share an index in the direct mapped cache
    assert_eq!(result.caches[0].hits, 0);
    assert_eq!(result.caches[1].hits, 2);
    assert_eq!(result.caches[1].hit_rate, 50);
}

#[test]
fn rejected_tick_steps_no_cache() {
    let config = config(r#"{ "caches": [
        { "name": "warm", "lines": 8, "kind": "2way" },
        { "name": "cold", "lines": 4, "kind": "direct" }
    ] }"#);
    let mut simulator = Simulator::new(&config).unwrap();
    // 20 and 24 share an index, both fit in the 2 way cache but conflict in the direct mapped one
    simulator.simulate("R 20 AA x4\nR 24 BB x4\nR 20 AA x2\n".as_bytes()).unwrap();
    assert_eq!(simulator.caches()[0].state(), ControllerState::Idle);
    assert_eq!(simulator.caches()[1].state(), ControllerState::Miss);

    let result = simulator.simulate("R 28 CC\n".as_bytes());
    match result {
        Err(CacheError::Tick { line, cache, source }) => {
            assert_eq!(line, 1);
            assert_eq!(cache, "cold");
            assert!(matches!(*source, CacheError::SequencingViolation { state: ControllerState::Miss, expected: 0x20, found: 0x28 }));
        }
        other => panic!("expected a tick error, got {other:?}"),
    }
    let warm = &simulator.caches()[0];
    assert_eq!(warm.state(), ControllerState::Idle);
    assert_eq!(warm.stats().total_accesses, 3);
    assert_eq!(simulator.caches()[1].state(), ControllerState::Miss);

    // Both caches carry on in step once the fill is finished
    let result = simulator.simulate("R 20 AA x2\nR 28 CC x4\n".as_bytes()).unwrap();
    assert_eq!(result.ticks, 16);
    assert_eq!(result.caches[0].accesses, 4);
    assert_eq!(result.caches[1].accesses, 4);
}
