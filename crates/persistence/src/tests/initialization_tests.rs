// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Connection establishment, migration application, and foreign key
//! enforcement are also exercised implicitly by every other
//! persistence test through `Persistence::new_in_memory()`.

use crate::Persistence;

#[test]
fn in_memory_initialization_succeeds() {
    let result: Result<Persistence, crate::PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn foreign_key_enforcement_is_active() {
    let mut store: Persistence = Persistence::new_in_memory().expect("database");
    store
        .verify_foreign_key_enforcement()
        .expect("foreign keys on");
}

#[test]
fn in_memory_databases_are_isolated() {
    let mut first: Persistence = Persistence::new_in_memory().expect("first");
    let mut second: Persistence = Persistence::new_in_memory().expect("second");

    let member = agenda_domain::Staff {
        staff_id: None,
        business_id: 1,
        location_id: 1,
        display_name: String::from("Dana"),
    };
    let created = first.create_staff(&member).expect("staff");

    // The row exists only in the database that wrote it.
    assert!(first.get_staff(created.staff_id.expect("id")).is_ok());
    assert!(second.get_staff(created.staff_id.expect("id")).is_err());
}
