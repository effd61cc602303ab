//! Property tests for signing, verification and identifiers

use proptest::prelude::*;
use runpay_core::{
    generate_idempotency_key, generate_order_reference, sanitize_log_data, verify_jenga_signature,
    verify_rsa_signature, Amount, SignatureData,
};
use runpay_test_utils::test_signer;
use serde_json::{json, Map, Value};

fn signature_data() -> impl Strategy<Value = SignatureData> {
    (
        "[A-Z0-9]{1,12}",
        "[A-Z0-9]{1,24}",
        prop::option::of("[A-Z]{3}"),
        1u64..10_000_000,
        "https://[a-z]{1,12}\\.org/[a-z/]{0,20}",
    )
        .prop_map(|(merchant, reference, currency, amount, url)| {
            SignatureData::new(
                &merchant,
                &reference,
                currency.as_deref(),
                &Amount::from_units(amount),
                &url,
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn rsa_sign_then_verify(data in signature_data()) {
        let signer = test_signer();
        let signature = signer.sign(&data).unwrap();
        prop_assert!(verify_rsa_signature(signer.public_key(), &data, &signature));
    }
}

proptest! {
    #[test]
    fn webhook_hash_accepts_own_digest(data in signature_data()) {
        let hash = data.sha256_hex();
        prop_assert!(verify_jenga_signature(&data, &hash));
    }

    #[test]
    fn webhook_hash_rejects_any_single_char_mutation(
        data in signature_data(),
        position in 0usize..64,
        replacement in prop::sample::select(b"0123456789abcdef".to_vec()),
    ) {
        let mut bytes = data.sha256_hex().into_bytes();
        prop_assume!(bytes[position] != replacement);
        bytes[position] = replacement;
        let mutated = String::from_utf8(bytes).unwrap();
        prop_assert!(!verify_jenga_signature(&data, &mutated));
    }

    #[test]
    fn webhook_hash_rejects_empty(data in signature_data()) {
        prop_assert!(!verify_jenga_signature(&data, ""));
    }

    #[test]
    fn idempotency_key_is_pure(reference in "[A-Z0-9]{1,24}", tx in "[A-Za-z0-9]{1,16}") {
        let a = generate_idempotency_key(&reference, Some(&tx));
        let b = generate_idempotency_key(&reference, Some(&tx));
        prop_assert_eq!(&a, &b);
        prop_assert_ne!(a, generate_idempotency_key(&reference, None));
    }

    #[test]
    fn order_reference_is_provider_safe(prefix in "\\PC{0,12}") {
        let reference = generate_order_reference(Some(&prefix));
        prop_assert!(!reference.as_str().is_empty());
        prop_assert!(reference
            .as_str()
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn sanitized_values_never_leak_past_prefix(secret in "[a-zA-Z0-9]{5,40}") {
        let mut map = Map::new();
        map.insert("token".into(), json!(secret.clone()));
        let out = sanitize_log_data(&map);
        let expected = format!("{}...", &secret[..4]);
        prop_assert_eq!(&out["token"], &Value::String(expected));
    }
}

#[test]
fn order_reference_keeps_prefix() {
    let reference = generate_order_reference(Some("ORD"));
    assert!(reference.as_str().starts_with("ORD"));
}

