//! Property-based tests for the backtracking token buffer
//!
//! Random sequences of matches, checkpoints, rollbacks and releases are replayed against a buffer over a fixed
//! program; the buffer's bookkeeping must hold after every step.

use pepp_syntax::buffer::{Checkpoint, TokenBuffer};
use pepp_syntax::intern::StringPool;
use pepp_syntax::lexer::{PepLexer, TokenMask};
use proptest::prelude::*;

const PROGRAM: &str = "main: LDWA 0x0010,d\n  STWA x,s ;store\nx: .BLOCK 2\n.END\n@DECI 1,2\n";

#[derive(Debug, Clone)]
enum Op {
    Match,
    Take,
    Rollback(usize),
    Release(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Match),
        2 => Just(Op::Take),
        1 => (0usize..8).prop_map(Op::Rollback),
        1 => (0usize..8).prop_map(Op::Release),
    ]
}

fn buffer() -> TokenBuffer<PepLexer> {
    TokenBuffer::new(PepLexer::new(PROGRAM, StringPool::shared()))
}

proptest! {
    /// Property: rolling back a checkpoint restores the matched-token count it saw.
    #[test]
    fn rollback_restores_matched_count(prefix in 0usize..6, extra in 0usize..10) {
        let b = buffer();
        for _ in 0..prefix {
            b.match_mask(TokenMask::ANY);
        }
        let _outer = b.checkpoint();
        let before = b.count_matched_tokens();
        let cp = b.checkpoint();
        for _ in 0..extra {
            b.match_mask(TokenMask::ANY);
        }
        cp.rollback();
        prop_assert_eq!(b.count_matched_tokens(), before);
    }

    /// Property: while any checkpoint is alive the buffer never forgets a token.
    #[test]
    fn buffered_tokens_never_shrink_under_checkpoint(ops in prop::collection::vec(op(), 1..40)) {
        let b = buffer();
        let mut live: Vec<(Checkpoint<PepLexer>, usize)> = Vec::new();
        let mut high_water = 0usize;
        for op in ops {
            match op {
                Op::Match => {
                    b.match_mask(TokenMask::ANY);
                }
                Op::Take => {
                    let head = b.count_matched_tokens();
                    live.push((b.checkpoint(), head));
                }
                Op::Rollback(i) if !live.is_empty() => {
                    let (cp, _) = &live[i % live.len()];
                    cp.rollback();
                }
                Op::Release(i) if !live.is_empty() => {
                    let index = i % live.len();
                    drop(live.remove(index));
                    if live.is_empty() {
                        high_water = 0;
                    }
                }
                Op::Rollback(_) | Op::Release(_) => {}
            }
            let buffered = b.count_buffered_tokens();
            if !live.is_empty() {
                prop_assert!(buffered >= high_water, "buffered shrank from {} to {}", high_water, buffered);
                high_water = buffered;
            }
            prop_assert!(b.count_matched_tokens() <= buffered);
        }
    }

    /// Property: rolling back to the same checkpoint twice replays the same tokens.
    #[test]
    fn rollback_replays_identical_tokens(n in 1usize..12) {
        let b = buffer();
        let cp = b.checkpoint();
        let first: Vec<_> = (0..n).filter_map(|_| b.match_mask(TokenMask::ANY)).collect();
        cp.rollback();
        let second: Vec<_> = (0..n).filter_map(|_| b.match_mask(TokenMask::ANY)).collect();
        prop_assert_eq!(first, second);
    }
}
