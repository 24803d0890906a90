//! Verb-restriction guard.
//!
//! Every operation declares which advertised methods it accepts, whether it
//! needs an idempotent navigator and whether it needs a concrete URI. The
//! declarations live in [`RESTRICTIONS`] and are checked by [`check`] before
//! anything is sent.

use super::Navigator;
use crate::core::{NavigatorError, Result};

/// Operations subject to the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Get,
    Create,
    Delete,
    Select,
}

#[derive(Debug)]
pub(crate) struct Restriction {
    pub operation: Operation,
    pub name: &'static str,
    pub allowed_methods: &'static [&'static str],
    pub requires_idempotent: bool,
    pub requires_non_templated: bool,
}

pub(crate) static RESTRICTIONS: [Restriction; 4] = [
    Restriction {
        operation: Operation::Get,
        name: "get",
        allowed_methods: &["GET"],
        requires_idempotent: true,
        requires_non_templated: true,
    },
    Restriction {
        operation: Operation::Create,
        name: "create",
        allowed_methods: &["POST"],
        requires_idempotent: false,
        requires_non_templated: true,
    },
    Restriction {
        operation: Operation::Delete,
        name: "delete",
        allowed_methods: &["DELETE"],
        requires_idempotent: false,
        requires_non_templated: true,
    },
    Restriction {
        operation: Operation::Select,
        name: "select",
        allowed_methods: &["GET"],
        requires_idempotent: false,
        requires_non_templated: false,
    },
];

fn restriction(operation: Operation) -> &'static Restriction {
    // Rows are in declaration order of `Operation`.
    &RESTRICTIONS[operation as usize]
}

/// Fail if `navigator` may not perform `operation`.
pub(crate) fn check(navigator: &Navigator, operation: Operation) -> Result<()> {
    let rule = restriction(operation);
    let target = navigator.uri().or(navigator.template_uri()).unwrap_or_default();

    if rule.requires_idempotent && !navigator.is_idempotent() {
        return Err(NavigatorError::InvalidOperation {
            message: format!(
                "Cannot {} a non-idempotent resource. Maybe you want this navigator's parent(), \
                 or one of the resources in its links",
                rule.name
            ),
        });
    }

    if navigator.method_validation()
        && !rule.allowed_methods.iter().any(|m| m.eq_ignore_ascii_case(navigator.method()))
    {
        return Err(NavigatorError::InvalidOperation {
            message: format!(
                "\"{}\" is permitted only for links supporting {:?}; {} supports \"{}\"",
                rule.name,
                rule.allowed_methods,
                target,
                navigator.method()
            ),
        });
    }

    if rule.requires_non_templated && navigator.is_templated() {
        return Err(NavigatorError::AmbiguousNavigation {
            operation: rule.name.to_string(),
            template_uri: target.to_string(),
        });
    }

    Ok(())
}
