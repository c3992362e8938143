/// Error raised by a schema callback (operator override, category source,
/// field validator, named-ruleset resolver).
///
/// The core never propagates these: a failing callback counts as "capability
/// absent", "not found" or "invalid", depending on the hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;
