//! Centralized limits and thresholds: one place to tune bounds that exist
//! to guarantee termination rather than to express a language rule.

/// Upper bound on fixed-point passes over a function's CFG (§4.3.2, §5).
/// Exceeding this surfaces an `iteration-budget-exceeded` diagnostic and the
/// last-computed state is returned rather than looping forever.
pub const MAX_FIXED_POINT_PASSES: usize = 64;

/// Upper bound on the two extra passes of the per-function call-site scheme
/// (§4.3.5): pre-scan, call-site collection, final analysis. The scheme is
/// fixed at 3; this constant documents that, rather than tuning it.
pub const FUNCTION_ANALYSIS_PASSES: usize = 3;

/// Recursion depth guard for structural type walks (equality, widening,
/// substitution) so a malformed recursive type cannot blow the stack before
/// the visited-set logic in `ft-types` even kicks in.
pub const MAX_TYPE_WALK_DEPTH: usize = 256;

/// Array literals with at most this many elements (and no spread) are typed
/// as tuples rather than widened to `array(union(elements))` (§4.3.7).
pub const MAX_TUPLE_LENGTH: usize = 10;
