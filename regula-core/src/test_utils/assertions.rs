//! Assertions with readable failure messages

use std::fmt::Debug;

use crate::catalog::{Package, PackageStatus};

/// Assert that a Result is Ok and return the value
pub fn assert_ok<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("Expected Ok, got Err: {:?}", e),
    }
}

/// Assert that a Result is Err and return the error
pub fn assert_err<T: Debug, E>(result: Result<T, E>) -> E {
    match result {
        Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
        Err(e) => e,
    }
}

/// Assert that an Option is Some and return the value
pub fn assert_some<T>(option: Option<T>) -> T {
    match option {
        Some(value) => value,
        None => panic!("Expected Some, got None"),
    }
}

/// Assert that a package has `expected` status
pub fn assert_status(package: &Package, expected: PackageStatus) {
    if package.status != expected {
        panic!(
            "Package {} ({}) is {}, expected {}",
            package.id, package.name, package.status, expected
        );
    }
}

/// Assert that a settled review left a consistent package
///
/// The status is approved or rejected and `verified` agrees with it.
pub fn assert_reviewed(package: &Package) {
    match package.status {
        PackageStatus::Approved | PackageStatus::Rejected => {}
        other => panic!("Package {} is {}, expected a review verdict", package.id, other),
    }
    let approved = package.status == PackageStatus::Approved;
    if package.verified != approved {
        panic!(
            "Package {} is {} but verified = {}",
            package.id, package.status, package.verified
        );
    }
    if package.reviewed_at.is_none() {
        panic!("Package {} was reviewed without a review timestamp", package.id);
    }
}
