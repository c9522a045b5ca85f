// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates all the other layers to accomplish one goal:
// training the transliteration model end to end.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;
