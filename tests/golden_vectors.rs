//! Golden test vector validation

use anyhow::Result;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use fieldseal::keys::FieldKeys;
use fieldseal::{FieldCipher, KeyMode, OwnerId, armor, fieldcrypt};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoldenVector {
    owner: String,
    mode: String,
    plaintext: String,
    iv: String,
    blob: String,
    comment: String,
}

fn load_golden_vectors() -> Result<Vec<GoldenVector>> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    let vectors: Vec<GoldenVector> = serde_json::from_str(json_data)?;
    Ok(vectors)
}

fn check_vector(vector: &GoldenVector) -> Result<()> {
    let owner: OwnerId = vector.owner.parse()?;
    let mode: KeyMode = vector.mode.parse()?;
    let expected_plaintext = BASE64_STANDARD.decode(&vector.plaintext)?;
    let iv: [u8; fieldcrypt::IV_LEN] = BASE64_STANDARD
        .decode(&vector.iv)?
        .try_into()
        .map_err(|iv: Vec<u8>| anyhow::anyhow!("iv must be 16 bytes, got {}", iv.len()))?;

    // Sealing with the recorded IV must reproduce the stored blob exactly.
    let keys = FieldKeys::derive(&owner, mode)?;
    let sealed = fieldcrypt::encrypt_with_iv(&keys, &expected_plaintext, &iv)?;
    let blob = armor::wrap(&sealed);
    anyhow::ensure!(
        blob == vector.blob,
        "blob mismatch\n  expected: {}\n  actual:   {}",
        vector.blob,
        blob
    );

    let decrypted = FieldCipher::new(mode).decrypt(&owner, &vector.blob)?;
    anyhow::ensure!(
        decrypted == expected_plaintext,
        "plaintext mismatch (expected {} bytes, got {})",
        expected_plaintext.len(),
        decrypted.len()
    );

    Ok(())
}

#[test]
fn test_golden_vectors() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    println!("Testing {} golden vectors", vectors.len());

    let mut failed = 0;
    for (i, vector) in vectors.iter().enumerate() {
        if let Err(e) = check_vector(vector) {
            eprintln!("Vector {}: FAILED - {}", i, e);
            eprintln!("  Comment: {}", vector.comment);
            failed += 1;
        }
    }

    assert_eq!(failed, 0, "Some golden vectors failed validation");
    assert!(!vectors.is_empty(), "No golden vectors were tested");
}

#[test]
fn test_golden_vectors_reject_neighbouring_owner() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");

    for vector in &vectors {
        let owner: u64 = vector.owner.parse().expect("golden owners are numeric");
        let mode: KeyMode = vector.mode.parse().unwrap();
        let err = FieldCipher::new(mode)
            .decrypt(&OwnerId::from(owner + 1), &vector.blob)
            .expect_err("blob must not open for another owner");
        assert!(err.is_decryption_failure(), "{}", vector.comment);
    }
}

#[test]
fn test_concrete_scenario_layout() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let vector = &vectors[0];
    assert_eq!(vector.owner, "42");

    let raw = BASE64_STANDARD.decode(&vector.blob).unwrap();
    assert!(vector.blob.len() > 64);
    assert_eq!(&raw[..fieldcrypt::IV_LEN], BASE64_STANDARD.decode(&vector.iv).unwrap());
    assert_eq!(
        (raw.len() - fieldcrypt::IV_LEN - fieldcrypt::MAC_LEN) % fieldcrypt::BLOCK_LEN,
        0
    );

    let cipher = FieldCipher::default();
    assert_eq!(
        cipher.decrypt_string(&OwnerId::from(42u64), &vector.blob).unwrap(),
        "Some text"
    );
    assert!(cipher.decrypt_string(&OwnerId::from(43u64), &vector.blob).is_err());
}
