use rand::Rng;

/// Generates gateway-facing order codes: a fixed prefix followed by a random
/// numeric suffix. Codes are not unique by construction; storage enforces
/// uniqueness and the orchestrator retries on a clash.
#[derive(Debug, Clone)]
pub struct OrderCodeGenerator {
    prefix: String,
    length: usize,
}

impl OrderCodeGenerator {
    pub fn new(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length: length.max(1),
        }
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_has_prefix_and_numeric_suffix() {
        let codes = OrderCodeGenerator::new("ORDER-", 5);
        let code = codes.generate();
        let suffix = code.strip_prefix("ORDER-").unwrap();
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_zero_length_is_clamped() {
        let code = OrderCodeGenerator::new("X", 0).generate();
        assert_eq!(code.len(), 2);
    }
}
