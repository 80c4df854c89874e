#![no_main]

use libfuzzer_sys::fuzz_target;
use photoscene::ArchiveReader;
use std::io::Cursor;

// The streaming reader must never panic on arbitrary input; errors and early
// termination are both acceptable outcomes.
fuzz_target!(|data: &[u8]| {
    let mut reader = ArchiveReader::new(Cursor::new(data));
    loop {
        match reader.next_entry() {
            Ok(Some(entry)) => {
                let _ = entry.read_to_vec();
            }
            Ok(None) => break,
            Err(_) => break,
        }
    }
});
