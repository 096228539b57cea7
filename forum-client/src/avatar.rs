use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};

const AVATAR_URL_PREFIX: &str = "https://api.dicebear.com/7.x/identicon/svg?seed=";
const AVATAR_SEED_LEN: usize = 12;

/// Source of placeholder avatars for comments that are being written
pub trait AvatarGenerator: Send {
    fn generate(&mut self) -> String;
}

pub struct RandomAvatars {
    rng: StdRng,
}

impl RandomAvatars {
    pub fn new() -> RandomAvatars {
        RandomAvatars {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> RandomAvatars {
        RandomAvatars {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAvatars {
    fn default() -> RandomAvatars {
        RandomAvatars::new()
    }
}

impl AvatarGenerator for RandomAvatars {
    fn generate(&mut self) -> String {
        let seed: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(AVATAR_SEED_LEN)
            .map(char::from)
            .collect();
        format!("{AVATAR_URL_PREFIX}{seed}")
    }
}

/// Hands out `avatar-0`, `avatar-1`, ... in order
#[derive(Debug, Default)]
pub struct SequentialAvatars {
    next: usize,
}

impl SequentialAvatars {
    pub fn new() -> SequentialAvatars {
        SequentialAvatars::default()
    }
}

impl AvatarGenerator for SequentialAvatars {
    fn generate(&mut self) -> String {
        let res = format!("avatar-{}", self.next);
        self.next += 1;
        res
    }
}
