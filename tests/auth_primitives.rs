use chrono::{Duration, Utc};

use sample_api::auth::jwt::{decode_token, encode_token, Claims, SESSION_LIFETIME_HOURS};
use sample_api::auth::password;
use sample_api::auth::reset_token::{self, ResetTokenSigner, RANDOM_BYTES};
use sample_api::config::JwtConfig;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "unit-test-jwt-secret".to_string(),
        issuer: None,
        audience: None,
    }
}

// ── Passwords ─────────────────────────────────────────────────────

#[test]
fn password_hash_verifies_only_matching_password() {
    let hash = password::hash("Corr3ct-horse").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(password::verify("Corr3ct-horse", &hash));
    assert!(!password::verify("corr3ct-horse", &hash));
}

#[test]
fn password_hashes_are_salted() {
    let a = password::hash("Same-Passw0rd").unwrap();
    let b = password::hash("Same-Passw0rd").unwrap();
    assert_ne!(a, b);
}

#[test]
fn malformed_hash_never_matches() {
    assert!(!password::verify("anything", "not-a-phc-string"));
    assert!(!password::verify("anything", ""));
}

#[test]
fn dummy_verification_always_fails() {
    assert!(!password::verify_dummy("Passw0rd!"));
}

#[test]
fn password_policy() {
    assert!(password::check_policy("Passw0rd!").is_ok());
    assert!(password::check_policy("Aa1~aaaa").is_ok());
    assert!(password::check_policy("Aa1`aaaa").is_ok());

    let short = password::check_policy("Pa0!").unwrap_err();
    assert!(short.contains("at least 8"));

    for weak in [
        "passw0rd!", // no uppercase
        "PASSW0RD!", // no lowercase
        "Password!", // no digit
        "Passw0rdX", // no symbol
        "Passw0rd €", // space and non-ASCII are not symbols
    ] {
        assert!(password::check_policy(weak).is_err(), "accepted {weak}");
    }
}

#[test]
fn password_length_counts_characters() {
    // Seven characters even though it is more than seven bytes.
    assert!(password::check_policy("Aä1!ééé").is_err());
    assert!(password::check_policy("Aä1!éééa").is_ok());
}

// ── Session tokens ────────────────────────────────────────────────

#[test]
fn jwt_round_trip() {
    let config = jwt_config();
    let claims = Claims::new(42, "user@example.com", &config);
    assert_eq!(claims.exp - claims.iat, SESSION_LIFETIME_HOURS * 3600);

    let token = encode_token(&claims, &config).unwrap();
    let decoded = decode_token(&token, &config).unwrap();
    assert_eq!(decoded, claims);
}

#[test]
fn jwt_rejects_wrong_secret() {
    let config = jwt_config();
    let token = encode_token(&Claims::new(1, "a@example.com", &config), &config).unwrap();

    let other = JwtConfig {
        secret: "some-other-secret".to_string(),
        ..jwt_config()
    };
    assert!(decode_token(&token, &other).is_err());
}

#[test]
fn jwt_rejects_expired_token() {
    let config = jwt_config();
    let issued = Utc::now() - Duration::hours(SESSION_LIFETIME_HOURS + 1);
    let claims = Claims::issued_at(1, "a@example.com", &config, issued);
    let token = encode_token(&claims, &config).unwrap();

    assert!(decode_token(&token, &config).is_err());
}

#[test]
fn jwt_rejects_token_expired_seconds_ago() {
    let config = jwt_config();
    let issued = Utc::now() - Duration::hours(SESSION_LIFETIME_HOURS) - Duration::seconds(5);
    let claims = Claims::issued_at(1, "a@example.com", &config, issued);
    let token = encode_token(&claims, &config).unwrap();

    assert!(decode_token(&token, &config).is_err());

    // Still inside its lifetime by a few seconds.
    let issued = Utc::now() - Duration::hours(SESSION_LIFETIME_HOURS) + Duration::seconds(30);
    let claims = Claims::issued_at(1, "a@example.com", &config, issued);
    let token = encode_token(&claims, &config).unwrap();
    assert!(decode_token(&token, &config).is_ok());
}

#[test]
fn jwt_checks_issuer_and_audience_when_configured() {
    let strict = JwtConfig {
        issuer: Some("sample-api".to_string()),
        audience: Some("web".to_string()),
        ..jwt_config()
    };
    let token = encode_token(&Claims::new(7, "a@example.com", &strict), &strict).unwrap();
    assert_eq!(decode_token(&token, &strict).unwrap().user_id, 7);

    let other_issuer = JwtConfig {
        issuer: Some("someone-else".to_string()),
        ..strict.clone()
    };
    assert!(decode_token(&token, &other_issuer).is_err());

    let other_audience = JwtConfig {
        audience: Some("mobile".to_string()),
        ..strict.clone()
    };
    assert!(decode_token(&token, &other_audience).is_err());

    // A token minted without issuer/audience does not satisfy a strict verifier.
    let loose = jwt_config();
    let bare = encode_token(&Claims::new(7, "a@example.com", &loose), &loose).unwrap();
    assert!(decode_token(&bare, &strict).is_err());
}

#[test]
fn jwt_rejects_garbage() {
    assert!(decode_token("not.a.jwt", &jwt_config()).is_err());
    assert!(decode_token("", &jwt_config()).is_err());
}

// ── Reset tokens ──────────────────────────────────────────────────

#[test]
fn reset_token_round_trip() {
    let signer = ResetTokenSigner::new("reset-secret");
    let issued = signer.issue().unwrap();

    let (raw, signature) = issued.signed.split_once('.').unwrap();
    assert_eq!(raw.len(), RANDOM_BYTES * 2);
    assert_eq!(signature.len(), 64);

    let verified = signer.verify(&issued.signed).unwrap();
    assert_eq!(verified, raw);
    assert_eq!(reset_token::hash_raw(&verified), issued.token_hash);
}

#[test]
fn reset_tokens_are_unique() {
    let signer = ResetTokenSigner::new("reset-secret");
    let a = signer.issue().unwrap();
    let b = signer.issue().unwrap();
    assert_ne!(a.signed, b.signed);
    assert_ne!(a.token_hash, b.token_hash);
}

#[test]
fn reset_token_hash_is_not_the_token() {
    let signer = ResetTokenSigner::new("reset-secret");
    let issued = signer.issue().unwrap();
    let (raw, _) = issued.signed.split_once('.').unwrap();

    assert_ne!(issued.token_hash, raw);
    assert!(!issued.signed.contains(&issued.token_hash));
    assert_eq!(issued.token_hash.len(), 64);
}

#[test]
fn reset_token_rejects_tampering() {
    let signer = ResetTokenSigner::new("reset-secret");
    let issued = signer.issue().unwrap();
    let (raw, signature) = issued.signed.split_once('.').unwrap();

    let flip = |s: &str| {
        let mut chars: Vec<char> = s.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '0' { '1' } else { '0' };
        chars.into_iter().collect::<String>()
    };

    assert!(signer.verify(&format!("{}.{signature}", flip(raw))).is_err());
    assert!(signer.verify(&format!("{raw}.{}", flip(signature))).is_err());

    let other = ResetTokenSigner::new("different-secret");
    assert!(other.verify(&issued.signed).is_err());
}

#[test]
fn reset_token_rejects_bad_format() {
    let signer = ResetTokenSigner::new("reset-secret");
    let issued = signer.issue().unwrap();
    let (raw, _) = issued.signed.split_once('.').unwrap();

    for bad in [
        String::new(),
        raw.to_string(),
        format!("{}.abc", &raw[..10]),
        format!("{}.abc", "z".repeat(64)),
        format!("{}.x.y", raw),
    ] {
        assert!(signer.verify(&bad).is_err(), "accepted {bad:?}");
    }
}

#[test]
fn reset_signer_debug_hides_secret() {
    let signer = ResetTokenSigner::new("super-secret-value");
    assert!(!format!("{signer:?}").contains("super-secret-value"));
}
