use thiserror::Error;

/// An error raised while planning an exchange.
///
/// Ineligibility is never an error: the planner reports it as an empty
/// result, and the caller falls back to a single-node merge. Variants here
/// describe conditions the caller has to surface instead of swallowing.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The database targeted by the terminal write stage does not exist.
	///
	/// Distinct from a missing collection: the write stage can create a
	/// fresh unsharded collection, but a whole missing database is an
	/// anomaly the caller needs to see.
	#[error("The database '{name}' does not exist")]
	DatabaseNotFound {
		name: String,
	},

	/// The planner encountered unreachable logic.
	#[error("The planner encountered unreachable logic: {0}")]
	Unreachable(String),
}
