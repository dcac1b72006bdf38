use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

pub const TOKEN_LENGTH: usize = 32;

/// Source of invitation tokens.
pub trait TokenSource: Send + Sync {
    fn issue(&self) -> String;
}

/// 32 alphanumeric characters drawn from OS entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn issue(&self) -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_32_alphanumeric_chars() {
        let token = RandomTokenSource.issue();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| RandomTokenSource.issue()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
