use rand::SeedableRng;

// Seeded rng for replicable tests.
pub fn seeded_rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"NEVER USE THIS FOR ANYTHING REAL";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const ISSUER: &str = "CN=attestation.id";
