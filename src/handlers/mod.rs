// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer JWT, see middleware::auth)

pub mod protected;
pub mod public;
