/*!
# Reduction Invariants

Drives whole reductions of a mid-sized program with oracles that accept
and reject in a fixed pattern, and checks the tree and the symbol index
after every pass.
*/

use std::collections::HashMap;

use goreduce::parser::NodeId;
use goreduce::semantic::SymbolKind;
use goreduce::{print_tree, GoParser, Reducer, SymbolIndex, Tree};
use pretty_assertions::assert_eq;

const PROGRAM: &str = r#"package main

import (
	"fmt"
	"strings"
)

const greeting = "hello"

type point struct {
	x, y int
}

func sum(xs []int) int {
	total := 0
	for _, x := range xs {
		total += x
	}
	return total
}

func main() {
	p := point{x: 1, y: 2}
	xs := []int{p.x, p.y, 3}
	if n := sum(xs[1:]); n > 2 {
		fmt.Println(strings.Repeat(greeting, n))
	} else {
		defer fmt.Println(-n)
	}
	{
		p := 4
		xs = append(xs, p)
	}
	panic(len(xs))
}
"#;

/// Reference counts keyed by declaring node, which stays stable across edits
fn counts_by_decl(index: &SymbolIndex) -> HashMap<NodeId, (String, usize)> {
    index
        .symbols()
        .map(|(id, s)| (s.decl, (s.name.clone(), index.reference_count(id))))
        .collect()
}

fn assert_index_matches_tree(index: &SymbolIndex, tree: &Tree) {
    index.verify(tree).unwrap();
    let fresh = SymbolIndex::build(tree);
    assert_eq!(counts_by_decl(index), counts_by_decl(&fresh));
}

/// Accepts every `every`-th candidate that still panics
fn patterned(every: usize) -> impl FnMut(&str) -> bool {
    let mut calls = 0;
    move |candidate: &str| {
        calls += 1;
        calls % every == 0 && candidate.contains("panic(")
    }
}

#[test]
fn test_program_round_trips() {
    let tree = GoParser::new().parse_text(PROGRAM).unwrap();
    assert_eq!(print_tree(&tree), PROGRAM);
}

#[test]
fn test_rejected_pass_restores_tree_and_counts() {
    let tree = GoParser::new().parse_text(PROGRAM).unwrap();
    let mut r = Reducer::new(tree, |_: &str| false);
    let before_tree = r.tree().clone();
    let before_counts = counts_by_decl(r.index());

    assert_eq!(r.reduce_once().unwrap(), None);
    assert_eq!(r.tree(), &before_tree);
    assert_eq!(counts_by_decl(r.index()), before_counts);
    assert_index_matches_tree(r.index(), r.tree());
    assert!(r.oracle_calls() > 20);
}

#[test]
fn test_index_stays_consistent_through_reduction() {
    for every in [1, 2, 3, 5] {
        let tree = GoParser::new().parse_text(PROGRAM).unwrap();
        let mut r = Reducer::new(tree, patterned(every));

        for _ in 0..500 {
            let before = counts_by_decl(r.index());
            let Some(_) = r.reduce_once().unwrap() else {
                break;
            };
            assert_index_matches_tree(r.index(), r.tree());

            // A symbol that lost its last reference must not keep a live
            // declaration (types and functions may stay unused)
            for (id, symbol) in r.index().symbols() {
                let was_used = before.get(&symbol.decl).is_some_and(|(_, n)| *n > 0);
                let is_used = r.index().reference_count(id) > 0;
                let may_idle = matches!(symbol.kind, SymbolKind::Type | SymbolKind::Func);
                assert!(
                    !was_used || is_used || may_idle,
                    "`{}` orphaned in:\n{}",
                    symbol.name,
                    r.source()
                );
            }
        }
        assert!(r.source().contains("panic("));
    }
}

#[test]
fn test_empty_pass_is_idempotent() {
    let tree = GoParser::new().parse_text(PROGRAM).unwrap();
    let mut r = Reducer::new(tree, patterned(1));
    r.run().unwrap();

    let settled = r.source();
    let calls = r.oracle_calls();
    assert_eq!(r.reduce_once().unwrap(), None);
    assert_eq!(r.reduce_once().unwrap(), None);
    assert_eq!(r.source(), settled);
    assert!(r.oracle_calls() > calls);
}

#[test]
fn test_reduction_shrinks_program() {
    let tree = GoParser::new().parse_text(PROGRAM).unwrap();
    let mut r = Reducer::new(tree, |c: &str| c.contains("panic("));
    let report = r.run().unwrap();

    assert!(report.lines_after < report.lines_before);
    assert_eq!(report.passes, report.changes.len() + 1);
    let reduced = r.source();
    assert!(!reduced.contains("import"));
    assert!(!reduced.contains("fmt."));
    // The reduced program must still parse
    GoParser::new().parse_text(&reduced).unwrap();
}
