//! Property-based tests for the preprocessing pipeline.
//!
//! Covers the structural guarantees the stepping engine relies on: offsets
//! survive comment removal, blocks can be put back, register bounds and gate
//! arity are enforced exactly, and instruction ids form a contiguous range.

use proptest::prelude::*;
use qdbg_ir::RETURN_SUCCESSOR;
use qdbg_parse::{ParsingError, preprocess, remove_comments, sweep_blocks};

/// Fragments that never form a comment or a brace on their own.
fn arb_text() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["h q;", " ", "\n", "x a;", "cx a, b;"]).prop_map(str::to_string)
}

/// Text with arbitrarily nested, balanced braces.
fn arb_nested() -> impl Strategy<Value = String> {
    arb_text().prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(
            prop_oneof![inner.clone(), inner.prop_map(|s| format!("{{{s}}}"))],
            0..4,
        )
        .prop_map(|parts| parts.concat())
    })
}

/// Balanced text together with its number of top-level blocks.
fn arb_blocks() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec(
        prop_oneof![
            arb_text().prop_map(|t| (t, 0_usize)),
            arb_nested().prop_map(|s| (format!("{{{s}}}"), 1_usize)),
        ],
        0..8,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .fold((String::new(), 0), |(mut text, count), (part, blocks)| {
                text.push_str(&part);
                (text, count + blocks)
            })
    })
}

/// Source text mixing code, comments and multi-byte characters.
fn arb_commented() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["x q;", "//", "/", "\n", "{", "}", " ", "θ", "// π {\n"]),
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

/// One line of a valid program over `qreg q[2]; creg c[2];`.
fn arb_line() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "h q[0];",
        "cx q[0], q[1];",
        "measure q[1] -> c[0];",
        "reset q[1];",
        "barrier q;",
        "if (c == 1) x q[0];",
        "gate g a { h a; x a; }",
        "gate e a, b { }",
        "gate n a { gate m b { z b; } m a; }",
        "g q[1];",
        "// comment {\n",
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn comment_removal_keeps_offsets(code in arb_commented()) {
        let stripped = remove_comments(&code);
        prop_assert_eq!(stripped.len(), code.len());
        let newlines = |s: &str| s.match_indices('\n').map(|(i, _)| i).collect::<Vec<_>>();
        prop_assert_eq!(newlines(&stripped), newlines(&code));
        prop_assert!(!stripped.contains("//"));
        prop_assert_eq!(remove_comments(&stripped), stripped);
    }

    #[test]
    fn blocks_restore_exactly((code, count) in arb_blocks()) {
        let sweep = sweep_blocks(&code);
        prop_assert_eq!(sweep.blocks.len(), count);
        prop_assert!(!sweep.text.contains('{'), "opening brace left in working text");
        prop_assert!(!sweep.text.contains('}'), "closing brace left in working text");
        prop_assert_eq!(sweep.restore(), code);
    }

    #[test]
    fn register_bounds_are_exact(size in 1_usize..20, index in 0_usize..40) {
        let code = format!("qreg q[{size}];\nh q[{index}];");
        let result = preprocess(&code);
        prop_assert_eq!(result.is_ok(), index < size);
        if let Err(err) = result {
            let is_target_error = matches!(err, ParsingError::InvalidTargetQubit { .. });
            prop_assert!(is_target_error);
            prop_assert_eq!(err.line(), 2);
            prop_assert_eq!(err.column(), 3);
        }
    }

    #[test]
    fn arity_is_enforced(params in 1_usize..5, args in 1_usize..5) {
        let formals: Vec<String> = (0..params).map(|i| format!("p{i}")).collect();
        let actuals: Vec<String> = (0..args).map(|i| format!("q[{i}]")).collect();
        let code = format!(
            "qreg q[4];\ngate f {} {{ h p0; }}\nf {};",
            formals.join(", "),
            actuals.join(", ")
        );
        let result = preprocess(&code);
        prop_assert_eq!(result.is_ok(), params == args);
        if let Err(err) = result {
            let is_arity_error = matches!(err, ParsingError::ArityMismatch { .. });
            prop_assert!(is_arity_error);
            prop_assert_eq!(err.line(), 3);
        }
    }

    #[test]
    fn ids_are_contiguous_and_linked(lines in prop::collection::vec(arb_line(), 0..16)) {
        let code = format!("qreg q[2];\ncreg c[2];\n{}", lines.join("\n"));
        let program = preprocess(&code).unwrap();
        let instructions = &program.instructions;

        for (position, instruction) in instructions.iter().enumerate() {
            prop_assert_eq!(instruction.index, position);

            if instruction.is_return() {
                prop_assert_eq!(instruction.successor_index, RETURN_SUCCESSOR);
                prop_assert!(instruction.in_function_definition);
            } else if instruction.is_function_definition {
                let ret = &instructions[instruction.successor_index - 1];
                prop_assert!(ret.is_return());
                prop_assert_eq!(&ret.targets, &instruction.targets);
            } else if instruction.is_function_call {
                let entry = &instructions[instruction.successor_index];
                prop_assert!(entry.in_function_definition);
                prop_assert_ne!(entry.index, position);
            } else {
                prop_assert_eq!(instruction.successor_index, position + 1);
            }

            for dependency in &instruction.data_dependencies {
                prop_assert!(dependency.instruction < position);
            }
        }
    }
}
