#![no_main]

use libfuzzer_sys::fuzz_target;
use logdisk::ScriptParser;

// The parser must reject garbage with an error, never a panic.
fuzz_target!(|line: &str| {
    let parser = ScriptParser::new();
    let _ = parser.parse_line(line);
});
