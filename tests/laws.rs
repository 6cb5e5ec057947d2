//! Properties that must hold for every script and every version.
//!
//! Programs are generated from a small palette of stack-balanced statement templates with a
//! fixed-seed xorshift generator, so every run checks the same inputs. Programs that carry a
//! value along a branch edge, or across a verb entry point, are checked separately and must
//! fail instead of printing.

use scummscope::{
    decompiler::{evaluate, ControlGraph},
    prelude::*,
};
use strum::IntoEnumIterator;

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

/// Fragment of a generated program; jumps are patched once every start offset is known.
enum Template {
    Plain(Vec<u8>),
    Jump { prefix: Vec<u8>, opcode: u8, target: usize },
}

fn local(index: u8) -> [u8; 2] {
    [index, 0x40]
}

/// Generates a V6-compatible program of `count` statements whose jumps land on statement
/// starts.
fn generate(rng: &mut XorShift, count: usize) -> Vec<u8> {
    let mut templates = Vec::with_capacity(count);
    for _ in 0..count {
        let a = local(rng.below(4) as u8);
        let b = local(rng.below(4) as u8);
        let n = rng.below(100) as u8;
        let target = rng.below(count);
        templates.push(match rng.below(7) {
            0 => Template::Plain(vec![0x00, n, 0x43, a[0], a[1]]),
            1 => Template::Plain(vec![0x03, a[0], a[1], 0x00, n, 0x14, 0x43, b[0], b[1]]),
            2 => Template::Plain(vec![0x4F, a[0], a[1]]),
            3 => Template::Plain(vec![0x6C]),
            4 => Template::Jump {
                prefix: vec![0x03, a[0], a[1], 0x00, n, 0x11],
                opcode: 0x5D,
                target,
            },
            5 => Template::Jump {
                prefix: vec![0x03, a[0], a[1]],
                opcode: 0x5C,
                target,
            },
            _ => Template::Jump {
                prefix: Vec::new(),
                opcode: 0x73,
                target,
            },
        });
    }

    let mut starts = Vec::with_capacity(count + 1);
    let mut offset = 0;
    for template in &templates {
        starts.push(offset);
        offset += match template {
            Template::Plain(bytes) => bytes.len(),
            Template::Jump { prefix, .. } => prefix.len() + 3,
        };
    }
    starts.push(offset);

    let mut data = Vec::with_capacity(offset);
    for template in &templates {
        match template {
            Template::Plain(bytes) => data.extend_from_slice(bytes),
            Template::Jump {
                prefix,
                opcode,
                target,
            } => {
                data.extend_from_slice(prefix);
                data.push(*opcode);
                let field_end = data.len() + 2;
                let relative = starts[*target] as i64 - field_end as i64;
                data.extend_from_slice(&(relative as i16).to_le_bytes());
            }
        }
    }
    data
}

fn corpus() -> Vec<Vec<u8>> {
    let mut rng = XorShift(0x5C0_7713);
    (0..200)
        .map(|_| {
            let count = 1 + rng.below(24);
            generate(&mut rng, count)
        })
        .collect()
}

/// Stack versions share the opcodes the generator emits.
fn stack_versions() -> impl Iterator<Item = Version> {
    Version::iter().filter(|version| *version != Version::V5)
}

#[test]
fn decoded_programs_re_encode_exactly() -> Result<()> {
    for data in corpus() {
        for version in stack_versions() {
            let program = decode(&data, version)?;
            assert_eq!(program.encode(), data, "{version}");
            assert_eq!(program.len(), data.len());
        }
    }
    Ok(())
}

#[test]
fn random_bytes_never_break_the_round_trip() {
    let mut rng = XorShift(0xD15_A55E);
    for _ in 0..2000 {
        let len = 1 + rng.below(32);
        let data: Vec<u8> = (0..len).map(|_| rng.next() as u8).collect();
        for version in Version::iter() {
            match decode(&data, version) {
                Ok(program) => assert_eq!(program.encode(), data),
                Err(Error::RoundTripMismatch { .. }) => {
                    panic!("Expected exact re-encoding of {data:02X?} ({version})")
                }
                Err(_) => {}
            }
        }
    }
}

#[test]
fn every_jump_lands_on_an_instruction() -> Result<()> {
    for data in corpus() {
        let program = decode(&data, Version::V6)?;
        for instr in program.iter() {
            for jump in instr.jumps() {
                let target = jump.resolved_absolute();
                assert!(target >= 0);
                assert!(program.contains(target as u32), "[{:04X}] -> {target}", instr.offset);
            }
        }
    }
    Ok(())
}

#[test]
fn statements_keep_program_order() -> Result<()> {
    for data in corpus() {
        let program = decode(&data, Version::V6)?;
        let evaluation = evaluate(&program)?;
        let offsets: Vec<u32> = evaluation.statements.iter().map(|s| s.offset).collect();
        assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]), "{offsets:?}");
        assert!(offsets.iter().all(|offset| evaluation.range.contains(offset)));
        for label in &evaluation.labels {
            assert!(evaluation.boundaries.contains(label));
        }
    }
    Ok(())
}

#[test]
fn restructuring_reaches_a_fixed_point() -> Result<()> {
    for data in corpus() {
        let program = decode(&data, Version::V6)?;
        let evaluation = evaluate(&program)?;
        let mut graph = ControlGraph::build(
            evaluation.statements.clone(),
            &evaluation.labels,
            evaluation.range.clone(),
        );
        graph.restructure();
        assert_eq!(graph.restructure(), 0);
        assert!(!graph.blocks().is_empty());
    }
    Ok(())
}

#[test]
fn decompilation_is_deterministic() {
    let decompiler = Decompiler::new(Version::V6);
    let kind = ScriptKind::Global(7);
    for data in corpus().iter().take(50) {
        let source = ScriptSource::new(&kind, data);
        let first = decompiler.decompile(&source).unwrap();
        let second = decompiler.decompile(&source).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("script 7 {\n"));
        assert!(first.ends_with("}\n"));
    }
}

#[test]
fn parallel_results_match_sequential_order() {
    let corpus = corpus();
    let kinds: Vec<ScriptKind> = (0..corpus.len() as u16).map(ScriptKind::Global).collect();
    let mut sources: Vec<ScriptSource> = kinds
        .iter()
        .zip(&corpus)
        .map(|(kind, data)| ScriptSource::new(kind, data))
        .collect();

    // one failing script in the middle must not disturb its neighbours
    let broken = ScriptKind::Local(999);
    sources.insert(100, ScriptSource::new(&broken, &[0x1A]));

    let decompiler = Decompiler::new(Version::He90);
    let parallel = decompiler.decompile_all(&sources);
    assert_eq!(parallel.len(), sources.len());

    for (source, result) in sources.iter().zip(&parallel) {
        match (decompiler.decompile(source), result) {
            (Ok(expected), Ok(actual)) => assert_eq!(&expected, actual),
            (Err(expected), Err(actual)) => {
                assert_eq!(expected.error, actual.error);
                assert_eq!(actual.script, "script 999");
                assert_eq!(actual.error, Error::StackUnderflow { offset: 0 });
            }
            _ => panic!("Expected matching results for {}", source.kind),
        }
    }
}

#[test]
fn structured_output_preserves_order() -> Result<()> {
    let scripts: &[&[u8]] = &[
        // counting loop
        &[
            0x00, 0x05, 0x43, 0x00, 0x40, 0x03, 0x00, 0x40, 0x00, 0x0A, 0x11, 0x5D, 0x06, 0x00,
            0x4F, 0x00, 0x40, 0x73, 0xF1, 0xFF, 0x6C,
        ],
        // if/else
        &[
            0x03, 0x64, 0x00, 0x5D, 0x08, 0x00, 0x00, 0x01, 0x43, 0x65, 0x00, 0x73, 0x05, 0x00,
            0x00, 0x02, 0x43, 0x65, 0x00, 0x6C,
        ],
        // wait loop
        &[0x6C, 0x03, 0x05, 0x00, 0x00, 0x00, 0x0E, 0x5C, 0xF6, 0xFF],
    ];

    for data in scripts {
        let evaluation = evaluate(&decode(data, Version::V6)?)?;
        let original: Vec<u32> = evaluation.statements.iter().map(|s| s.offset).collect();
        let mut graph = ControlGraph::build(
            evaluation.statements,
            &evaluation.labels,
            evaluation.range,
        );
        assert!(graph.restructure() > 0);
        assert!(graph.residual_labels().is_empty());

        let flattened = graph.flatten_offsets();
        assert!(flattened.windows(2).all(|pair| pair[0] <= pair[1]), "{flattened:?}");
        let mut rest = original.iter();
        for offset in &flattened {
            assert!(rest.any(|candidate| candidate == offset), "{offset} out of order");
        }
    }
    Ok(())
}

#[test]
fn values_never_cross_a_branch_edge() {
    let kind = ScriptKind::Global(3);
    let scripts: &[(&[u8], u32)] = &[
        // L.1 = L.0 ? 1 : 2 as pushes on both paths, then one writeWordVar
        (
            &[
                0x03, 0x00, 0x40, 0x5D, 0x05, 0x00, 0x00, 0x01, 0x73, 0x02, 0x00, 0x00, 0x02,
                0x43, 0x01, 0x40, 0x6C,
            ],
            8,
        ),
        // jump [0005] lands while pushByte 1 is pending
        (&[0x73, 0x02, 0x00, 0x00, 0x01, 0x00, 0x02, 0x14, 0x1A], 5),
        // jump [0002] re-enters the run of the add
        (&[0x00, 0x01, 0x00, 0x02, 0x14, 0x1A, 0x73, 0xF9, 0xFF], 2),
    ];

    for (data, offset) in scripts {
        for version in stack_versions() {
            let failure = Decompiler::new(version)
                .decompile(&ScriptSource::new(&kind, data))
                .unwrap_err();
            assert_eq!(failure.error, Error::StackAcrossBranch { offset: *offset }, "{version}");
            assert!(!failure.instructions.is_empty());
        }
    }
}

#[test]
fn verb_entries_require_a_drained_stack() {
    let kind = ScriptKind::Object {
        id: 1,
        name: Vec::new(),
    };
    // verb 2 enters at the blob end with pushByte 5 still pending
    let undrained = [0x01, 0x07, 0x00, 0x02, 0x09, 0x00, 0x00, 0x00, 0x05];
    let failure = Decompiler::new(Version::V6)
        .decompile(&ScriptSource::new(&kind, &undrained))
        .unwrap_err();
    assert_eq!(failure.error, Error::VerbOffsetMisaligned { verb: 2, offset: 9 });

    // once a pop drains the stack, an entry at the blob end is an empty verb
    let drained = [0x01, 0x07, 0x00, 0x02, 0x0A, 0x00, 0x00, 0x00, 0x05, 0x1A];
    let text = Decompiler::new(Version::V6)
        .decompile(&ScriptSource::new(&kind, &drained))
        .unwrap();
    assert!(text.contains("\tverb 1 {\n\t\tpop(5)\n\t}\n"), "{text}");
    assert!(text.contains("\tverb 2 {\n\t}\n"), "{text}");
}
