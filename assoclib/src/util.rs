use std::error::Error;
use std::fs;
use regex::Regex;

pub const DEMO_CONFIGS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/configs");
pub const DEMO_OUTPUTS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/outputs");
pub const DEMO_TRACES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/traces");

pub struct TestCasePaths {
    pub config: String,
    pub trace: String,
    pub output: String
}

/// Finds every demo case, one per expected output named `output-<trace>-<config>.json`
pub fn get_cases() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let mut out = Vec::new();
    let output_pattern = Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json$")?;
    let mut files = Vec::new();
    for entry in fs::read_dir(DEMO_OUTPUTS_PATH)? {
        let file_name = entry?.file_name().into_string().map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if output_pattern.is_match(&file_name) {
            files.push(file_name);
        }
    }
    files.sort();
    for file_name in files {
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace = tokens.name("trace").ok_or("Couldn't get the trace from the output file name".to_string())?.as_str();
        let config = tokens.name("config").ok_or("Couldn't get the config from the output file name".to_string())?.as_str();
        out.push(TestCasePaths {
            config: format!("{DEMO_CONFIGS_PATH}/{config}.json"),
            trace: format!("{DEMO_TRACES_PATH}/{trace}.trace"),
            output: format!("{DEMO_OUTPUTS_PATH}/{file_name}"),
        })
    }
    Ok(out)
}
