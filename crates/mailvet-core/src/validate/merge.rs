//! Merging offline and service verdicts into outcomes.

use std::collections::HashMap;

use super::extract::normalize;
use super::model::{Outcome, SyntaxVerdict, VerifierVerdict};

/// Reason shown for deliverable addresses.
pub const REASON_DELIVERABLE: &str = "Deliverable";

/// Merges verdicts into one outcome per syntax verdict, in the same order.
///
/// Addresses that never reached the service keep their syntax verdict with
/// `deliverable = false`.
#[must_use]
pub fn merge(syntax: &[SyntaxVerdict], verified: &[VerifierVerdict]) -> Vec<Outcome> {
    let lookup: HashMap<String, &VerifierVerdict> = verified
        .iter()
        .map(|verdict| (normalize(&verdict.address), verdict))
        .collect();

    syntax
        .iter()
        .map(|verdict| match lookup.get(&verdict.address) {
            Some(service) => merge_one(verdict, service),
            None => Outcome::from(verdict.clone()),
        })
        .collect()
}

fn merge_one(syntax: &SyntaxVerdict, service: &VerifierVerdict) -> Outcome {
    let deliverable = service.valid && service.deliverable;
    let reason = if deliverable {
        REASON_DELIVERABLE.to_string()
    } else if service.reason.is_empty() {
        syntax.reason.clone()
    } else {
        service.reason.clone()
    };

    Outcome {
        address: syntax.address.clone(),
        valid: service.valid,
        deliverable,
        reason,
        risk_level: syntax.risk_level,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validate::model::RiskLevel;
    use crate::validate::syntax::classify;
    use proptest::prelude::*;

    fn service(address: &str, valid: bool, deliverable: bool, reason: &str) -> VerifierVerdict {
        VerifierVerdict {
            address: address.into(),
            deliverable,
            valid,
            reason: reason.into(),
        }
    }

    #[test]
    fn test_merge_without_service_verdicts() {
        let syntax = vec![classify("a@b.com"), classify("bad"), classify("x@gmail.co")];
        let outcomes = merge(&syntax, &[]);
        let expected: Vec<Outcome> = syntax.into_iter().map(Outcome::from).collect();
        assert_eq!(outcomes, expected);
        assert!(outcomes.iter().all(|o| !o.deliverable));
    }

    #[test]
    fn test_merge_deliverable_reason() {
        let syntax = vec![classify("a@b.com")];
        let outcomes = merge(&syntax, &[service("a@b.com", true, true, "Mailbox Verified")]);
        assert!(outcomes[0].valid);
        assert!(outcomes[0].deliverable);
        assert_eq!(outcomes[0].reason, REASON_DELIVERABLE);
    }

    #[test]
    fn test_merge_service_reason_then_syntax_reason() {
        let syntax = vec![classify("a@b.com"), classify("c@d.com")];
        let outcomes = merge(
            &syntax,
            &[
                service("c@d.com", false, false, ""),
                service("a@b.com", false, false, "Mailbox Not Found"),
            ],
        );
        assert_eq!(outcomes[0].reason, "Mailbox Not Found");
        assert!(!outcomes[0].valid);
        assert_eq!(outcomes[1].reason, "Format valid");
    }

    #[test]
    fn test_merge_keeps_risk_level() {
        let syntax = vec![classify("user@gmail.co")];
        let outcomes = merge(&syntax, &[service("user@gmail.co", true, false, "SMTP unreachable")]);
        assert_eq!(outcomes[0].risk_level, RiskLevel::Medium);
        assert!(outcomes[0].valid);
    }

    #[test]
    fn test_merge_never_deliverable_without_valid() {
        let syntax = vec![classify("a@b.com")];
        let outcomes = merge(&syntax, &[service("a@b.com", false, true, "odd")]);
        assert!(!outcomes[0].deliverable);
        assert_eq!(outcomes[0].reason, "odd");
    }

    #[test]
    fn test_merge_matches_uppercase_service_address() {
        let syntax = vec![classify("a@b.com")];
        let outcomes = merge(&syntax, &[service("A@B.com", true, true, "")]);
        assert!(outcomes[0].deliverable);
    }

    proptest! {
        #[test]
        fn prop_deliverable_implies_valid(
            flags in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..30),
        ) {
            let syntax: Vec<SyntaxVerdict> = (0..flags.len())
                .map(|i| classify(&format!("user{i}@example.com")))
                .collect();
            let verified: Vec<VerifierVerdict> = flags
                .iter()
                .enumerate()
                .map(|(i, (valid, deliverable))| {
                    service(&format!("user{i}@example.com"), *valid, *deliverable, "x")
                })
                .collect();
            for outcome in merge(&syntax, &verified) {
                prop_assert!(!outcome.deliverable || outcome.valid);
            }
        }
    }
}
