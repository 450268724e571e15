#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use logdisk::path;

#[derive(Debug, Arbitrary)]
struct PathCase {
    raw: String,
    segments: Vec<String>,
    levels: u8,
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let case = match PathCase::arbitrary(&mut u) {
        Ok(case) => case,
        Err(_) => return,
    };

    // Canonical current directory from up to four arbitrary segments.
    let mut current = String::from("/");
    for seg in case.segments.iter().take(4) {
        if seg.is_empty() || seg.contains('/') {
            continue;
        }
        current.push_str(seg);
        current.push('/');
    }

    let resolved = path::resolve(&case.raw, &current);
    assert!(resolved.starts_with('/'));

    let levels = usize::from(case.levels) % 8;
    let up = path::move_up_dir(&resolved, levels);
    if levels > 0 {
        assert!(up.starts_with('/'));
        assert!(up.ends_with('/'));
    } else {
        assert_eq!(up, resolved);
    }

    // Climbing past the root saturates instead of underflowing.
    assert_eq!(path::move_up_dir(&current, 64), "/");
});
