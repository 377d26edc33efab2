//! Integration tests for listing the available policies.
use policysim::cli::handle_policies_command;
use policysim::policy::list_policies;

/// An integration test for the `policies` command.
#[test]
fn test_handle_policies_command() {
    handle_policies_command().unwrap();
}

#[test]
fn test_listed_policies_have_valid_defaults() {
    let policies: Vec<_> = list_policies().collect();
    assert_eq!(policies.len(), 5);
    for policy in policies {
        assert!(policy.validate().is_ok(), "{policy} is invalid");
        for def in policy.parameter_definitions() {
            assert!(def.min <= def.default && def.default <= def.max);
        }
    }
}
