//! Arithmetic CAPTCHA for the report submission form.
//!
//! A challenge is two random integers in [1, 10]; the expected sum is stored
//! in the caller's session and the question string ("a + b") is rendered
//! into the form. Verification is consume-on-check: the expected value is
//! removed from the session before comparison, so a challenge can be
//! answered at most once regardless of outcome.

use actix_session::Session;
use rand::Rng;

const CAPTCHA_SESSION_KEY: &str = "captcha_expected";

/// A generated challenge, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub question: String,
    pub expected: i32,
}

/// CAPTCHA verification error
#[derive(Debug, PartialEq, Eq)]
pub enum CaptchaError {
    /// No challenge was stored in the session (never issued, or already used)
    NoChallenge,
    /// The submitted answer was missing or not a number
    NotANumber,
    /// The submitted answer did not match the expected sum
    WrongAnswer,
    /// Session storage failed
    Session(String),
}

impl std::fmt::Display for CaptchaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptchaError::NoChallenge => write!(f, "No CAPTCHA challenge in session"),
            CaptchaError::NotANumber => write!(f, "CAPTCHA answer was not a number"),
            CaptchaError::WrongAnswer => write!(f, "CAPTCHA answer was incorrect"),
            CaptchaError::Session(e) => write!(f, "CAPTCHA session error: {}", e),
        }
    }
}

impl std::error::Error for CaptchaError {}

/// Build a new random challenge.
pub fn new_challenge() -> Challenge {
    let mut rng = rand::thread_rng();
    let a: i32 = rng.gen_range(1..=10);
    let b: i32 = rng.gen_range(1..=10);

    Challenge {
        question: format!("{} + {}", a, b),
        expected: a + b,
    }
}

/// Generate a challenge and store its expected answer in the session.
///
/// Issuing a new challenge replaces any previous one.
pub fn issue(session: &Session) -> Result<Challenge, CaptchaError> {
    let challenge = new_challenge();
    session
        .insert(CAPTCHA_SESSION_KEY, challenge.expected)
        .map_err(|e| CaptchaError::Session(e.to_string()))?;
    Ok(challenge)
}

/// Verify a submitted answer against the session-stored challenge.
///
/// The stored value is removed first, whatever the outcome; replaying the
/// same form POST fails with `NoChallenge` the second time.
pub fn verify_and_consume(session: &Session, answer: Option<&str>) -> Result<(), CaptchaError> {
    let expected = session
        .get::<i32>(CAPTCHA_SESSION_KEY)
        .map_err(|e| CaptchaError::Session(e.to_string()))?;

    // Single use: clear before checking anything else.
    session.remove(CAPTCHA_SESSION_KEY);

    let expected = expected.ok_or(CaptchaError::NoChallenge)?;

    let answer: i32 = answer
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CaptchaError::NotANumber)?
        .parse()
        .map_err(|_| CaptchaError::NotANumber)?;

    if answer != expected {
        log::debug!("CAPTCHA failed: expected {}, got {}", expected, answer);
        return Err(CaptchaError::WrongAnswer);
    }

    Ok(())
}
