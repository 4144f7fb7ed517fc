#![no_main]

use libfuzzer_sys::fuzz_target;
use pepasm::pep10::{self, Features};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut pipeline = pep10::pipeline();
        pep10::add_user(&mut pipeline, s, Features::default());
        let _ = pipeline.assemble();
        for target in pipeline.targets() {
            let _ = pep10::errors(target);
        }
    }
});
