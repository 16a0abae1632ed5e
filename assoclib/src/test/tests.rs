use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use crate::config::SimulationConfig;
use crate::io::get_reader;
use crate::simulator::{SimulationResult, Simulator};
use crate::util::get_cases;

#[test]
fn run_all_demos() -> Result<(), Box<dyn Error>> {
    let cases = get_cases()?;
    assert!(!cases.is_empty());
    for test in cases {
        println!("Running test for {}", test.output);
        let trace_file = File::open(test.trace)?;
        let config_file = File::open(test.config)?;
        let expected_output_file = File::open(test.output.clone())?;
        let expected_output: SimulationResult = serde_json::from_reader(BufReader::new(expected_output_file))?;
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(config_file))?;
        let mut simulator = Simulator::new(&config)?;
        let result = simulator.simulate(get_reader(trace_file)?)?;
        assert_eq!(*result, expected_output, "{}", test.output);
        let time = simulator.get_execution_time();
        println!("Success for {}, time: {}", test.output, time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}
