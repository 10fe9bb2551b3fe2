//! CLI command parsing and utility tests.
//!
//! The CLI is a binary crate, so these tests exercise the equivalent logic
//! through the underlying library crates, the way the commands wire them
//! together.

// ============================================================================
// commands::common tests
// ============================================================================

mod common_tests {
    use skinfaxi_bb84::DetectionPolicy;

    /// Equivalent to commands::common::parse_policy
    fn parse_policy(policy: &str) -> anyhow::Result<DetectionPolicy> {
        match policy.to_lowercase().as_str() {
            "fixed" => Ok(DetectionPolicy::default()),
            "relative" | "noise-relative" => Ok(DetectionPolicy::noise_relative()),
            other => anyhow::bail!("Unknown policy: '{other}'"),
        }
    }

    #[test]
    fn test_policy_fixed() {
        assert!(matches!(
            parse_policy("fixed").unwrap(),
            DetectionPolicy::FixedThresholds { .. }
        ));
    }

    #[test]
    fn test_policy_relative() {
        assert!(matches!(
            parse_policy("relative").unwrap(),
            DetectionPolicy::NoiseRelative { .. }
        ));
    }

    #[test]
    fn test_policy_alias() {
        assert!(matches!(
            parse_policy("Noise-Relative").unwrap(),
            DetectionPolicy::NoiseRelative { .. }
        ));
    }

    #[test]
    fn test_policy_unknown() {
        assert!(parse_policy("strict").is_err());
    }
}

// ============================================================================
// simulate → key file → encrypt flow
// ============================================================================

mod flow_tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use skinfaxi_bb84::{
        BitPool, Exchange, ExchangeConfig, SiftedKey, xor_encrypt,
    };

    #[test]
    fn key_file_round_trip_feeds_encryption() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("shared.key");

        let config = ExchangeConfig {
            photons: 256,
            noise: 0.0,
            ..ExchangeConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(77);
        let exchange =
            Exchange::run_with_rng(&config, &mut rng, &mut BitPool::empty()).unwrap();
        let key = exchange.key.expect("no eavesdropper — key retained");
        std::fs::write(&key_path, key.to_string()).unwrap();

        // What `encrypt --key-file` does.
        let loaded = SiftedKey::parse(&std::fs::read_to_string(&key_path).unwrap()).unwrap();
        assert_eq!(loaded, key);

        let transcript = xor_encrypt(&loaded, "hello").unwrap();
        assert_eq!(transcript.decrypted_bits(), transcript.message_bits);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = ExchangeConfig::default();
        let run = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            Exchange::run_with_rng(&config, &mut rng, &mut BitPool::empty()).unwrap()
        };
        let a = run(5);
        let b = run(5);
        assert_eq!(a.events, b.events);
        assert_eq!(a.key, b.key);
        let c = run(6);
        assert_ne!(a.events, c.events);
    }
}

// ============================================================================
// analyze output naming
// ============================================================================

mod analyze_tests {
    use skinfaxi_analysis::analysis_file_name;

    #[test]
    fn test_output_name_from_token() {
        assert_eq!(
            analysis_file_name("2025-07-23_14-22-52_meas_10000.csv", false),
            "2025-07-23_14-22-52_analysis.csv"
        );
    }

    #[test]
    fn test_output_name_simulate_mode() {
        assert_eq!(
            analysis_file_name("2025-07-23_14-22-52_meas_10000.csv", true),
            "2025-07-23_14-22-52_analysis_SM.csv"
        );
    }
}
