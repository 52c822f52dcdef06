//! Detection of the upstream's anti-bot challenge page

/// Substrings that only appear on the bot-mitigation interstitial
///
/// - `PXlJuB4eTB`: obfuscated identifier of the challenge script
/// - `blockScript`: the named bot-mitigation script tag
/// - `captcha.js`: the captcha loader
pub const CHALLENGE_SIGNATURES: &[&str] = &["PXlJuB4eTB", "blockScript", "captcha.js"];

/// Returns true if a response body is a challenge page rather than data
///
/// A heuristic substring match against [`CHALLENGE_SIGNATURES`]; new
/// signatures only need to be added to that table.
pub fn is_challenge(body: &str) -> bool {
    CHALLENGE_SIGNATURES.iter().any(|sig| body.contains(sig))
}
