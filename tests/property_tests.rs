//! Property-based tests for pepasm
//!
//! These tests use proptest to verify invariants across many randomly
//! generated programs, catching edge cases that hand-written tests might miss.

use pepasm::format::format_source;
use pepasm::pep10::{self, Features};
use proptest::prelude::*;

// =============================================================================
// Program generators
// =============================================================================

fn symbol() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

/// One statement that always parses, optionally labelled and commented.
fn statement() -> impl Strategy<Value = String> {
    let body = prop_oneof![
        Just("RET".to_string()),
        Just("NOP".to_string()),
        (0u16..=0xFFFF).prop_map(|v| format!("LDWA {v},i")),
        (0u16..=0xFFFF).prop_map(|v| format!("ldba 0x{v:X},d")),
        (0u16..=0xFF).prop_map(|v| format!(".BYTE {v}")),
        (0u16..=0xFFFF).prop_map(|v| format!(".WORD {v}")),
        (0u16..=16).prop_map(|v| format!(".BLOCK {v}")),
        "[a-z ]{1,10}".prop_map(|s| format!(".ASCII \"{s}\"")),
        prop::sample::select(vec![1u16, 2, 4, 8]).prop_map(|v| format!(".ALIGN {v}")),
    ];
    (prop::option::of(symbol()), body, prop::option::of("[a-z ]{0,12}")).prop_map(|(label, body, comment)| {
        let mut line = String::new();
        if let Some(label) = label {
            line.push_str(&label);
            line.push_str(": ");
        }
        line.push_str(&body);
        if let Some(comment) = comment {
            line.push_str(" ;");
            line.push_str(&comment);
        }
        line
    })
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(statement(), 0..12).prop_map(|lines| {
        let mut out = String::new();
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    })
}

// =============================================================================
// Format Properties
// =============================================================================

proptest! {
    /// Property: Formatting is idempotent (format(format(x)) == format(x))
    #[test]
    fn format_is_idempotent(source in program()) {
        let once = format_source(&source).expect("generated programs parse");
        let twice = format_source(&once).expect("formatted output parses");
        prop_assert_eq!(once, twice);
    }

    /// Property: Formatting keeps one output row per input line
    #[test]
    fn format_keeps_line_count(source in program()) {
        let formatted = format_source(&source).expect("generated programs parse");
        prop_assert_eq!(formatted.lines().count(), source.lines().count());
    }
}

// =============================================================================
// Assembly Properties
// =============================================================================

proptest! {
    /// Property: Object code size equals the sum of the laid-out line sizes
    #[test]
    fn object_size_matches_layout(source in program()) {
        let mut p = pep10::pipeline();
        pep10::add_user(&mut p, &source, Features::default());
        // Generated labels may repeat, which is a legitimate failure.
        prop_assume!(p.assemble());

        let target = &p.targets()[0];
        let laid_out: u32 = pep10::lines(target).iter().filter_map(|l| l.address()).map(|a| a.size).sum();
        let object = pep10::object(target).expect("object body");
        prop_assert_eq!(object.bytes().len() as u32, laid_out);
    }

    /// Property: Addresses never decrease without an `.ORG`
    #[test]
    fn addresses_are_monotonic(source in program()) {
        let mut p = pep10::pipeline();
        pep10::add_user(&mut p, &source, Features::default());
        prop_assume!(p.assemble());

        let addresses: Vec<u16> = pep10::lines(&p.targets()[0])
            .iter()
            .filter_map(|l| l.address())
            .map(|a| a.address)
            .collect();
        prop_assert!(addresses.windows(2).all(|w| w[0] <= w[1]));
    }
}
