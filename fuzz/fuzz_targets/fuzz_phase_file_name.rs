#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(name) = std::str::from_utf8(data) {
        // Fuzz phase file name parsing - this should never panic
        let _ = zdd::parse_phase_file_name(name);
    }
});
