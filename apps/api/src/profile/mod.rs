// Profile completion: JSON normalization, checklist scoring, tiers and the
// server-side application eligibility gate.

pub mod completion;
pub mod handlers;
pub mod normalize;
pub mod tier;
