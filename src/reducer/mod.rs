/*!
# Reducer

Drives the reduction: each pass walks the tree in preorder and tries the
rules for every node until one candidate is accepted by the oracle. Passes
repeat until one makes no change, or a pass or time limit is hit.

Every trial is a reversible edit. A rejected candidate is reverted so the
tree is exactly what it was before; an accepted one keeps its edits and
the symbol index built for it.

```rust,ignore
let tree = GoParser::new().parse_text(&source)?;
let mut reducer = Reducer::new(tree, |candidate: &str| candidate.contains("panic"));
let report = reducer.run()?;
println!("{}", reducer.source());
```
*/

pub mod dead_refs;
pub mod oracle;
pub mod undo;

mod inline;
mod rules;
mod statements;

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::ReducerConfig;
use crate::core::{count_lines, Change, ReduceError, ReduceResult, ReductionReport, StopReason};
use crate::parser::ast::{NodeId, Tree};
use crate::parser::print_tree;
use crate::semantic::SymbolIndex;

pub use dead_refs::{orphans, resolve_dead_refs};
pub use oracle::{CommandOracle, Oracle, FILE_PLACEHOLDER};
pub use undo::Undo;

/// Reduction state for one source file
pub struct Reducer<O> {
    tree: Tree,
    index: SymbolIndex,
    oracle: O,
    config: ReducerConfig,
    /// Set once a trial of the current pass is accepted
    did_change: bool,
    last_change: Option<Change>,
    oracle_calls: usize,
}

impl<O: Oracle> Reducer<O> {
    pub fn new(tree: Tree, oracle: O) -> Self {
        Self::with_config(tree, oracle, ReducerConfig::default())
    }

    pub fn with_config(tree: Tree, oracle: O, config: ReducerConfig) -> Self {
        let index = SymbolIndex::build(&tree);
        Self {
            tree,
            index,
            oracle,
            config,
            did_change: false,
            last_change: None,
            oracle_calls: 0,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls
    }

    /// The current program as Go source.
    pub fn source(&self) -> String {
        print_tree(&self.tree)
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Fails unless the oracle accepts the unmodified program.
    pub fn check_initial(&mut self) -> ReduceResult<()> {
        let source = self.source();
        self.oracle_calls += 1;
        if self.oracle.accepts(&source)? {
            Ok(())
        } else {
            Err(ReduceError::InitialRejected)
        }
    }

    /// One pass: stops at the first accepted change and returns it.
    pub fn reduce_once(&mut self) -> ReduceResult<Option<Change>> {
        self.index.verify(&self.tree)?;
        self.did_change = false;
        self.last_change = None;
        if self.tree.is_empty() {
            return Ok(None);
        }

        // Rejected trials restore the tree exactly and the pass ends at the
        // first accepted one, so the walk order can be fixed up front
        for (id, parent) in preorder(&self.tree) {
            self.dispatch(id, parent)?;
            if self.did_change {
                break;
            }
        }
        Ok(self.last_change.take())
    }

    /// Runs passes until a fixpoint or a configured limit.
    pub fn run(&mut self) -> ReduceResult<ReductionReport> {
        self.run_with(|_| {})
    }

    /// Like `run`, calling `on_change` after every accepted change.
    pub fn run_with<F: FnMut(&Change)>(&mut self, mut on_change: F) -> ReduceResult<ReductionReport> {
        let start = Instant::now();
        let lines_before = count_lines(&self.source());
        let calls_before = self.oracle_calls;
        let timeout = self.config.timeout_secs.map(Duration::from_secs);

        let mut changes = Vec::new();
        let mut passes = 0;
        let stop_reason = loop {
            if self.config.max_passes.is_some_and(|max| passes >= max) {
                break StopReason::PassLimit;
            }
            if timeout.is_some_and(|limit| start.elapsed() >= limit) {
                break StopReason::Timeout;
            }
            passes += 1;
            match self.reduce_once()? {
                Some(change) => {
                    on_change(&change);
                    changes.push(change);
                }
                None => break StopReason::Fixpoint,
            }
        };

        let report = ReductionReport {
            changes,
            passes,
            oracle_calls: self.oracle_calls - calls_before,
            lines_before,
            lines_after: count_lines(&self.source()),
            stop_reason,
            elapsed: start.elapsed(),
        };
        info!("Reduction stopped ({:?}): {}", report.stop_reason, report.summary());
        Ok(report)
    }

    /// Shows the edited tree to the oracle and keeps or reverts the edits.
    ///
    /// `mark` is the arena length before the trial allocated any node.
    fn attempt(&mut self, mark: usize, undo: Undo, change: Change) -> ReduceResult<bool> {
        let candidate = print_tree(&self.tree);
        let candidate_index = SymbolIndex::build(&self.tree);
        self.oracle_calls += 1;

        match self.oracle.accepts(&candidate) {
            Ok(true) => {
                undo.commit();
                self.index = candidate_index;
                info!(rule = %change.rule, "{}", change);
                self.did_change = true;
                self.last_change = Some(change);
                Ok(true)
            }
            Ok(false) => {
                debug!(rule = %change.rule, "rejected: {}", change);
                self.rollback(mark, undo)?;
                Ok(false)
            }
            Err(err) => {
                self.rollback(mark, undo)?;
                Err(err)
            }
        }
    }

    fn rollback(&mut self, mark: usize, undo: Undo) -> ReduceResult<()> {
        undo.revert(&mut self.tree)?;
        self.tree.truncate(mark);
        Ok(())
    }
}

/// Every node of the tree with its parent, in preorder.
fn preorder(tree: &Tree) -> Vec<(NodeId, Option<NodeId>)> {
    let mut out = Vec::new();
    let mut stack = vec![(tree.root(), None)];
    while let Some((id, parent)) = stack.pop() {
        out.push((id, parent));
        for child in tree.node(id).children().into_iter().rev() {
            stack.push((child, Some(id)));
        }
    }
    out
}
