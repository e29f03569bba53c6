#![no_main]

use cachescope::csv_output::parse_table;
use cachescope::inference::{detect_jump_table, ChangepointDetector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and detection must never panic, whatever the table holds
        if let Ok(table) = parse_table::<f32>(input) {
            let _ = detect_jump_table(&table, &ChangepointDetector::default());
        }
    }
});
