#![no_main]

use libfuzzer_sys::fuzz_target;
use scummscope::{decode, Decompiler, ScriptKind, ScriptSource, Version};
use strum::IntoEnumIterator;

fuzz_target!(|data: &[u8]| {
    for version in Version::iter() {
        if let Ok(program) = decode(data, version) {
            assert_eq!(program.encode(), data);
        }

        let kind = ScriptKind::Object {
            id: 1,
            name: Vec::new(),
        };
        let _ = Decompiler::new(version).decompile(&ScriptSource::new(&kind, data));
    }
});
