// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts
// of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Keeping this layer pure means it is unit-testable without a
// GPU and readable without any framework noise.

// A single Bengali / Banglish sentence pair
pub mod pair;

// Core abstractions (traits) that other layers implement
pub mod traits;
