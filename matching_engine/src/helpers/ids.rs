use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Generates a fresh record identifier with the given prefix, e.g. `req-x1GQpT4m9bKw`.
pub fn fresh_id(prefix: &str) -> String {
    let suffix: String = thread_rng().sample_iter(&Alphanumeric).take(12).map(char::from).collect();
    format!("{prefix}-{suffix}")
}
