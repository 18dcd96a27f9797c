use std::fmt;

use subtle::{Choice, ConstantTimeEq};

use crate::config::ConfigError;

/// The username/password pair a protected route expects.
///
/// Built once from configuration and shared read-only afterwards.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Validate and build the expected credentials.
    ///
    /// Empty values are rejected instead of being treated as "anyone may enter".
    /// A `:` in the username can never be transmitted with Basic, so it is
    /// refused as well.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into();
        let password = password.into();

        if username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        if username.contains(':') {
            return Err(ConfigError::ColonInUsername);
        }

        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Compare a supplied pair against the expected one.
    ///
    /// Both halves are always compared so the time taken does not reveal
    /// whether the username alone was right.
    pub fn matches(&self, username: &[u8], password: &[u8]) -> bool {
        let user_ok = choice_eq(username, self.username.as_bytes());
        let pass_ok = choice_eq(password, self.password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Constant-time equality for equal-length inputs. Differing lengths compare
/// unequal without inspecting the contents.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    choice_eq(a, b).into()
}

pub(crate) fn choice_eq(a: &[u8], b: &[u8]) -> Choice {
    a.ct_eq(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_username() {
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(ConfigError::EmptyUsername)
        ));
    }

    #[test]
    fn test_rejects_empty_password() {
        assert!(matches!(
            Credentials::new("joe", ""),
            Err(ConfigError::EmptyPassword)
        ));
    }

    #[test]
    fn test_rejects_colon_in_username() {
        assert!(matches!(
            Credentials::new("jo:e", "secret"),
            Err(ConfigError::ColonInUsername)
        ));
    }

    #[test]
    fn test_matches_exact_pair_only() {
        let creds = Credentials::new("joe", "Password1").unwrap();

        assert!(creds.matches(b"joe", b"Password1"));
        assert!(!creds.matches(b"joe", b"Password2"));
        assert!(!creds.matches(b"Joe", b"Password1"));
        assert!(!creds.matches(b"joe", b"Password1 "));
        assert!(!creds.matches(b"", b""));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("joe", "Password1").unwrap();
        let printed = format!("{:?}", creds);

        assert!(printed.contains("joe"));
        assert!(!printed.contains("Password1"));
    }

    #[test]
    fn test_ct_eq_lengths() {
        assert!(ct_eq(b"abc", b"abc"));
        assert!(!ct_eq(b"abc", b"abcd"));
        assert!(!ct_eq(b"abd", b"abc"));
    }

    /// Correct and incorrect passwords of the same length should take about the
    /// same time to reject. Timing-sensitive, so opt in with `--ignored`.
    #[test]
    #[ignore = "timing-sensitive; run on a quiet machine with --ignored"]
    fn test_comparison_timing_is_flat() {
        use std::time::Instant;

        let creds = Credentials::new("joe", "Password1-with-a-longer-tail-0000").unwrap();
        let right = b"Password1-with-a-longer-tail-0000";
        let wrong_early = b"XXXXXXXXX-with-a-longer-tail-0000";
        let wrong_late = b"Password1-with-a-longer-tail-000X";

        fn median_ns(mut samples: Vec<u128>) -> u128 {
            samples.sort_unstable();
            samples[samples.len() / 2]
        }

        let sample = |candidate: &[u8]| {
            (0..2000)
                .map(|_| {
                    let start = Instant::now();
                    for _ in 0..200 {
                        std::hint::black_box(creds.matches(b"joe", std::hint::black_box(candidate)));
                    }
                    start.elapsed().as_nanos()
                })
                .collect::<Vec<_>>()
        };

        let t_right = median_ns(sample(right)) as f64;
        let t_early = median_ns(sample(wrong_early)) as f64;
        let t_late = median_ns(sample(wrong_late)) as f64;

        for t in [t_early, t_late] {
            let ratio = t / t_right;
            assert!(
                (0.8..1.25).contains(&ratio),
                "timing ratio {ratio:.3} suggests data-dependent comparison"
            );
        }
    }
}
