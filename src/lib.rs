/*!

# jsregexp - ECMAScript 3 regular expressions over UTF-16 text

This crate provides a backtracking regular expression engine with the syntax and semantics of the
regular expressions in ECMAScript 3 (JavaScript 1.5), including the legacy behaviors that era's
runtimes depended on: octal escapes, lenient braces, and the `RegExp.$1` match registers.

Subjects are sequences of UTF-16 code units, and every index (match ranges, captures,
`lastIndex`) is a code unit offset.

# Example: test if a string contains a match

```rust
use jsregexp::Regex;
let re = Regex::new(r"\d{4}").unwrap();
let matched = re.find("2020-20-05").is_some();
assert!(matched);
```

# Example: iterating over matches

Here we use a backreference to find doubled characters:

```rust
use jsregexp::Regex;
let re = Regex::new(r"(\w)\1").unwrap();
let text = "Frankly, Miss Piggy, I don't give a hoot!";
let doubled: Vec<String> = re.find_iter(text).map(|m| m.as_string()).collect();
assert_eq!(doubled, ["ss", "gg", "oo"]);
```

# Example: exec, lastIndex and the match registers

Like JavaScript's `RegExp.prototype.exec`, a global regex starts each search at its
`lastIndex` and advances it. Each successful match is recorded in a [`RegExpStatics`], which the
caller owns and passes to every stateful call.

```rust
use jsregexp::{Regex, RegExpStatics};
let mut statics = RegExpStatics::new();
let mut re = Regex::with_flags(r"(\d+)-(\d+)", "g").unwrap();
let m = re.exec("10-20 30-40", &mut statics).unwrap().unwrap();
assert_eq!(m.as_string(), "10-20");
assert_eq!(re.last_index(), 5);
assert_eq!(statics.paren(2).to_string(), "20");
assert_eq!(statics.right_context().to_string(), " 30-40");
```

# Example: replacement

```rust
use jsregexp::{Regex, RegExpStatics};
let mut statics = RegExpStatics::new();
let mut re = Regex::new(r"(\d+)-(\d+)-(\d+)").unwrap();
let result = re.replace("2015-01-02", "$3/$2/$1", &mut statics).unwrap();
assert_eq!(result, "02/01/2015");
```

# Supported Syntax

jsregexp targets ES3 syntax: alternation, greedy and lazy quantifiers, capturing and
non-capturing groups, positive and negative lookahead, backreferences, character classes, and
the `g`, `i` and `m` flags. Named groups, lookbehind, the sticky, unicode and dotAll flags, and
Unicode property escapes are not supported.

Case-insensitive matching uses simple Unicode case folding of code units.

# Architecture

jsregexp has a recursive-descent parser which builds a graph of nodes in an arena, and a
"classical backtracking" matcher which walks that graph. Concatenation is expressed by `next`
links and the composite nodes (alternatives, quantifiers, lookaheads) hold a child; the graph has
join points but no cycles. Character class bitmaps are built the first time a class is used.

Backtracking state lives on the heap: choice points and capture undo records on a backtrack
stack, and loop and lookahead continuations in a frame arena. Its size is bounded by
[`Config::backtrack_limit`]; pathological patterns report [`ExecError::BacktrackLimitExceeded`].

A compiled [`Regex`] is not `Send`: it is meant for single-threaded, synchronous use.

*/

#![warn(clippy::all)]
#![allow(clippy::upper_case_acronyms, clippy::match_like_matches_macro)]
// Clippy's manual_range_contains suggestion produces worse codegen.
#![allow(clippy::manual_range_contains)]

pub use crate::api::*;
pub use crate::exec::{ExecError, ExecMode, Execution, Matches};
pub use crate::parse::ErrorKind;
pub use crate::replace::{ReplaceArgs, Template};
pub use crate::statics::RegExpStatics;
pub use crate::types::{Range, SubString, Subject};

mod util;

mod api;
mod bitmap;
mod charclasses;
mod classicalbacktrack;
mod exec;
mod folds;
mod ir;
mod parse;
mod replace;
mod statics;
mod types;
