#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use logdisk::Session;

#[derive(Debug, Arbitrary)]
enum Op {
    Mkdir { dir: u8 },
    Chdir { dir: u8 },
    Write { file: u8, quantity: u64, unit: u8 },
    Delete { file: u8 },
    Read { file: u8 },
    Raw { line: String },
}

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

fn dir_name(n: u8) -> String {
    format!("/d{}/", n % 8)
}

fn file_name(n: u8) -> String {
    format!("f{}", n % 8)
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let ops = match Vec::<Op>::arbitrary(&mut u) {
        Ok(ops) => ops,
        Err(_) => return,
    };

    let mut session = Session::new();
    if session.execute_line("diskCapacity(64MB)").is_err() {
        return;
    }
    if session.execute_line("blockSize(256KB)").is_err() {
        return;
    }

    for op in ops.into_iter().take(32) {
        let line = match op {
            Op::Mkdir { dir } => format!("mkdir({})", dir_name(dir)),
            Op::Chdir { dir } => format!("chdir({})", dir_name(dir)),
            Op::Write {
                file,
                quantity,
                unit,
            } => {
                // Draws divisible by three keep the full u64 range so the
                // conversion and capacity bounds get hit; the rest stay
                // small enough to allocate.
                let quantity = if quantity % 3 == 0 {
                    quantity
                } else {
                    quantity % 4096
                };
                format!(
                    "write({}, {}{})",
                    file_name(file),
                    quantity,
                    UNITS[unit as usize % UNITS.len()],
                )
            }
            Op::Delete { file } => format!("write({}, 0)", file_name(file)),
            Op::Read { file } => format!("read({})", file_name(file)),
            Op::Raw { line } => line,
        };
        // Malformed Raw lines abort a script with an error; they must
        // never panic or corrupt the device.
        let _ = session.execute_line(&line);
    }

    if let Some(device) = session.device() {
        let stats = device.stats();
        assert!(stats.used_blocks <= stats.total_blocks);
        // Zero-size writes are deletes, so every file owns a block.
        assert!(stats.files <= stats.used_blocks);
    }
});
