use bitcoin::bip32::{DerivationPath as ReferencePath, Xpriv, Xpub};
use bitcoin::secp256k1::Secp256k1;
use secp_engine::{
    DerivationPath, EngineError, EngineSettings, ExtendedKey, Network, Secp256k1Engine,
};
use std::str::FromStr;

const VECTOR_1_SEED: &str = "000102030405060708090a0b0c0d0e0f";
const VECTOR_2_SEED: &str = "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a29f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542";

fn engines() -> Vec<Secp256k1Engine> {
    vec![
        Secp256k1Engine::with_settings(&EngineSettings::native()),
        Secp256k1Engine::with_settings(&EngineSettings::portable()),
    ]
}

/// Compare against rust-bitcoin's BIP32 implementation
fn assert_matches_reference(engine: &Secp256k1Engine, seed: &[u8], path: &str) {
    let secp = Secp256k1::new();
    let reference_master = Xpriv::new_master(bitcoin::Network::Bitcoin, seed).unwrap();
    let reference = reference_master
        .derive_priv(&secp, &ReferencePath::from_str(path).unwrap())
        .unwrap();
    let reference_pub = Xpub::from_priv(&secp, &reference);

    let key = ExtendedKey::from_seed(engine, seed)
        .unwrap()
        .derive_path_str(engine, path)
        .unwrap();

    assert_eq!(key.to_base58(Network::Mainnet), reference.to_string(), "{}", path);
    assert_eq!(key.to_extended_public(Network::Mainnet), reference_pub.to_string(), "{}", path);
    assert_eq!(
        key.private_key().unwrap().as_bytes(),
        &reference.private_key.secret_bytes()
    );
}

#[test]
fn test_vector_1_master() {
    for engine in engines() {
        let master = ExtendedKey::from_seed(&engine, &hex::decode(VECTOR_1_SEED).unwrap()).unwrap();
        assert_eq!(
            hex::encode(master.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            hex::encode(master.private_key().unwrap().as_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            master.to_base58(Network::Mainnet),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            master.to_extended_public(Network::Mainnet),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
    }
}

#[test]
fn test_vector_1_chain() {
    for engine in engines() {
        let master = ExtendedKey::from_seed(&engine, &hex::decode(VECTOR_1_SEED).unwrap()).unwrap();
        let key = master.derive_path_str(&engine, "m/0'/1/2'").unwrap();

        assert_eq!(key.depth(), 3);
        assert_eq!(key.path().to_string(), "m/0'/1/2'");
        assert_eq!(
            key.public_key().to_hex(),
            "0357bfe1e341d01c69fe5654309956cbea516822fba8a601743a012a7896ee8dc2"
        );
        assert_eq!(
            hex::encode(key.private_key().unwrap().as_bytes()),
            "cbce0d719ecf7431d88e6a89fa1483e02e35092af60c042b1df2ff59fa424dca"
        );
    }
}

#[test]
fn test_vector_1_against_reference() {
    let seed = hex::decode(VECTOR_1_SEED).unwrap();
    for engine in engines() {
        for path in ["m/0'", "m/0'/1", "m/0'/1/2'", "m/0'/1/2'/2", "m/0'/1/2'/2/1000000000"] {
            assert_matches_reference(&engine, &seed, path);
        }
    }
}

#[test]
fn test_vector_2_against_reference() {
    let seed = hex::decode(VECTOR_2_SEED).unwrap();
    for engine in engines() {
        assert_matches_reference(&engine, &seed, "m/0/2147483647'/1/2147483646'/2");
    }
}

#[test]
fn test_zero_seed_regression() {
    let seed = [0u8; 32];
    for engine in engines() {
        assert_matches_reference(&engine, &seed, "m/0'/1/2'");

        let first = ExtendedKey::from_seed(&engine, &seed).unwrap();
        let second = ExtendedKey::from_seed(&engine, &seed).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.derive_path_str(&engine, "0'/1/2'").unwrap(),
            second.derive_path_str(&engine, "m/0h/1/2h").unwrap()
        );
    }
}

#[test]
fn test_public_derivation_equals_neutered_private() {
    let seed = hex::decode(VECTOR_1_SEED).unwrap();
    for engine in engines() {
        let account = ExtendedKey::from_seed(&engine, &seed)
            .unwrap()
            .derive_path_str(&engine, "m/44'/0'/0'")
            .unwrap();
        let path = DerivationPath::from_str("m/0/17").unwrap();

        let private_then_neuter = account.derive_path(&engine, &path).unwrap().neuter();
        let public_only = account.neuter().derive_path(&engine, &path).unwrap();
        assert_eq!(private_then_neuter.public_key(), public_only.public_key());
        assert_eq!(private_then_neuter.chain_code(), public_only.chain_code());
        assert_eq!(
            private_then_neuter.to_base58(Network::Mainnet),
            public_only.to_base58(Network::Mainnet)
        );
    }
}

#[test]
fn test_xpub_import_derives_like_reference() {
    let secp = Secp256k1::new();
    let seed = hex::decode(VECTOR_2_SEED).unwrap();
    let reference = Xpriv::new_master(bitcoin::Network::Bitcoin, &seed).unwrap();
    let reference_child = Xpub::from_priv(&secp, &reference)
        .derive_pub(&secp, &ReferencePath::from_str("m/0/5").unwrap())
        .unwrap();

    for engine in engines() {
        let xpub = Xpub::from_priv(&secp, &reference).to_string();
        let imported = ExtendedKey::from_base58(&engine, &xpub).unwrap();
        assert!(!imported.is_private());
        let child = imported.derive_path_str(&engine, "0/5").unwrap();
        assert_eq!(child.to_base58(Network::Mainnet), reference_child.to_string());

        assert_eq!(
            imported.derive_path_str(&engine, "0'").unwrap_err(),
            EngineError::PrivateKeyRequired
        );
    }
}

#[test]
fn test_base58_rejections() {
    for engine in engines() {
        // valid Base58Check, wrong payload length
        let short = bs58::encode(vec![0u8; 40]).with_check().into_string();
        assert!(matches!(
            ExtendedKey::from_base58(&engine, &short),
            Err(EngineError::InvalidEncoding(_))
        ));

        // unknown version bytes
        let mut payload = bs58::decode(
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8",
        )
        .with_check(None)
        .into_vec()
        .unwrap();
        payload[3] ^= 0xff;
        let unknown = bs58::encode(&payload).with_check().into_string();
        assert!(matches!(
            ExtendedKey::from_base58(&engine, &unknown),
            Err(EngineError::InvalidEncoding(_))
        ));

        // depth 0 with a parent fingerprint
        payload[3] ^= 0xff;
        payload[5] = 1;
        let orphan = bs58::encode(&payload).with_check().into_string();
        assert!(matches!(
            ExtendedKey::from_base58(&engine, &orphan),
            Err(EngineError::InvalidEncoding(_))
        ));
    }
}

#[test]
fn test_invalid_path_text() {
    let engine = &engines()[0];
    let master = ExtendedKey::from_seed(engine, &[7u8; 32]).unwrap();
    assert!(matches!(
        master.derive_path_str(engine, "m/0'/x"),
        Err(EngineError::InvalidPath(_))
    ));
}
