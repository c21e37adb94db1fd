//! Property tests for field validation
//!
//! A rejected setter must never change state, and accepted values must be
//! stored exactly as given.

use govtalk_codec::{registry, ConfigurationState, MessageKeyStore, TargetOrganisationList};
use proptest::prelude::*;

fn state() -> ConfigurationState {
    ConfigurationState::new("https://secure.gateway.gov.uk/submission").unwrap()
}

proptest! {
    #[test]
    fn prop_correlation_id_accepts_upper_hex(id in "[0-9A-F]{0,32}") {
        let mut config = state();
        prop_assert!(config.set_correlation_id(&id).is_ok());
        prop_assert_eq!(config.correlation_id(), Some(id.as_str()));
    }

    #[test]
    fn prop_correlation_id_rejects_lowercase(id in "[0-9A-F]{0,10}[a-z][0-9a-z]{0,10}") {
        let mut config = state();
        config.set_correlation_id("ABC").unwrap();
        prop_assert!(config.set_correlation_id(&id).is_err());
        prop_assert_eq!(config.correlation_id(), Some("ABC"));
    }

    #[test]
    fn prop_unknown_class_is_noop(class in "[a-z]{1,12}") {
        let mut config = state();
        config.set_message_class("HMRC-VAT-DEC").unwrap();
        prop_assert!(config.set_message_class(&class).is_err());
        prop_assert_eq!(config.message_class(), Some("HMRC-VAT-DEC"));
    }

    #[test]
    fn prop_email_without_at_rejected(local in "[a-z0-9.]{1,20}") {
        prop_assert!(registry::validate_email(&local).is_err());
    }

    #[test]
    fn prop_dotted_domain_email_accepted(
        local in r"[A-Za-z0-9!#$%&'*+/=?^_{|}~.\-]{1,16}",
        labels in proptest::collection::vec("[A-Za-z0-9\\-]{1,10}", 2..5),
    ) {
        let address = format!("{local}@{}", labels.join("."));
        prop_assert!(registry::validate_email(&address).is_ok());
    }

    #[test]
    fn prop_keys_keep_insertion_order(names in proptest::collection::btree_set("[A-Za-z]{1,8}", 1..8)) {
        let mut keys = MessageKeyStore::new();
        let names: Vec<String> = names.into_iter().collect();
        for (i, name) in names.iter().enumerate() {
            keys.add(name, &i.to_string()).unwrap();
        }
        let stored: Vec<&str> = keys.iter().map(|(name, _)| name).collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_organisations_deduplicate(code in "[A-Z]{1,32}", repeats in 1usize..5) {
        let mut organisations = TargetOrganisationList::new();
        for _ in 0..repeats {
            organisations.add(&code).unwrap();
        }
        prop_assert_eq!(organisations.len(), 1);
    }
}
