// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that define what the pipeline works on.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A movie synopsis with its genre label
pub mod document;

// Fatal configuration / contract errors
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
