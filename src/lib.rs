/*!
# goreduce

Reduces a Go program while an external check keeps reporting the same
behavior. Each candidate is produced by one small syntactic rewrite
(dropping a statement, keeping only one branch of an `if`, replacing a
literal with its zero value, inlining a block, ...) and handed to an
oracle; accepted candidates are kept, rejected ones are undone exactly.

## Architecture

```text
goreduce
├── Core      - positions, errors, change records
├── Parser    - logos lexer, recursive-descent parser, arena AST, printer
├── Semantic  - scopes, symbol resolution, symbol index
├── Reducer   - rules, undo records, dead-reference resolver, driver
├── Config    - TOML/YAML reducer configuration
└── CLI       - logging, output and progress helpers
```

## Usage

### CLI
```bash
# Keep the compiler error while shrinking the file
goreduce --match 'undefined: bar' main.go

# Runtime behavior, reduced copy written elsewhere
goreduce --run --match 'index out of range' --output small.go main.go

# Custom check; {} is the candidate file
goreduce --match 'vet:' --call go vet {} -- main.go
```

### Library
```rust,ignore
use goreduce::{reduce_source, ReducerConfig};

let (reduced, report) = reduce_source(&source, |c: &str| c.contains("panic("), ReducerConfig::default())?;
println!("{}\n{}", reduced, report.summary());
```
*/

pub mod cli_common;
pub mod config;
pub mod core;
pub mod parser;
pub mod reducer;
pub mod semantic;

pub use config::{OracleConfig, ReducerConfig, RuleKind};
pub use core::{Change, ReduceError, ReduceResult, ReductionReport, StopReason};
pub use parser::{print_tree, GoParser, ParseError, Tree};
pub use reducer::{CommandOracle, Oracle, Reducer};
pub use semantic::SymbolIndex;

use std::path::Path;

/// Reduces Go source text; returns the reduced text and the run report.
///
/// Fails with `ReduceError::InitialRejected` when the oracle does not accept
/// the input as given.
pub fn reduce_source<O: Oracle>(
    source: &str,
    oracle: O,
    config: ReducerConfig,
) -> ReduceResult<(String, ReductionReport)> {
    let tree = GoParser::new().parse_text(source)?;
    let mut reducer = Reducer::with_config(tree, oracle, config);
    reducer.check_initial()?;
    let report = reducer.run()?;
    Ok((reducer.source(), report))
}

/// Reduces a Go file with the command oracle described by `config`.
pub fn reduce_file<P: AsRef<Path>>(path: P, config: ReducerConfig) -> ReduceResult<(String, ReductionReport)> {
    let tree = GoParser::new().parse_file(path.as_ref())?;
    let oracle = CommandOracle::new(&config.oracle)?;
    let mut reducer = Reducer::with_config(tree, oracle, config);
    reducer.check_initial()?;
    let report = reducer.run()?;
    Ok((reducer.source(), report))
}
