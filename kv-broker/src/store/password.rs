use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 11;

/// Generates store passwords from mixed-case alphanumerics.
///
/// Each generator owns its random source. Two consecutive passwords from the
/// same generator are never equal.
pub struct PasswordGenerator {
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    rng: StdRng,
    last: Option<String>,
}

impl PasswordGenerator {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(GeneratorState { rng, last: None }),
        }
    }

    pub fn generate(&self) -> String {
        let mut state = self.state.lock();
        loop {
            let len = state.rng.gen_range(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN);
            let password: String = (&mut state.rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();

            if state.last.as_deref() != Some(password.as_str()) {
                state.last = Some(password.clone());
                return password;
            }
        }
    }
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
