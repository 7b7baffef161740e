//! # Runtime overload dispatch.
//!
//! Loosely-typed callers (scripts, config files, the [`build`](crate::combinators::build)
//! entry point) hand over argument lists of [`Value`]s. [`Overloads`] picks the single
//! [`Pattern`] those arguments fit and maps them to a result.
//!
//! ```text
//! args: [Number(3), Function(..)]
//!          │
//!          ▼  type_tag() per position
//!       (number, function)
//!          │
//!          ▼  match every registered pattern
//!   "number, function"        ✔  ──► map(args)
//!   "number, array|object"    ✘
//! ```
//!
//! ## Rules
//! - Patterns are comma-separated positions; a position is a `|`-separated union of
//!   type names: `undefined, null, function, string, number, boolean, date, array,
//!   object, regex, any`.
//! - Arity must match exactly.
//! - `any` matches every type, whichever side it appears on.
//! - Exactly one pattern must match: none → [`SignatureError::NoMatch`],
//!   several → [`SignatureError::Ambiguous`].
//!
//! [`SignatureError::NoMatch`]: crate::SignatureError::NoMatch
//! [`SignatureError::Ambiguous`]: crate::SignatureError::Ambiguous

mod overloads;
mod pattern;
mod value;

pub use overloads::Overloads;
pub use pattern::{Pattern, TypeSet, TypeTag};
pub use value::{Callable, Value};
