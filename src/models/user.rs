use diesel::prelude::*;
use jiff_diesel::DateTime;
use serde::Deserialize;

use crate::models::Role;

/// User account model for reading from the database.
/// Derives Queryable for SELECT operations and Selectable for type-safe column selection
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub password: String,
    pub enabled: bool,
    pub avatar: Option<String>,
    pub roles: Vec<Role>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// NewUser model for inserting new records
/// Derives Insertable for INSERT operations
#[derive(Debug, Insertable, Deserialize, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub password: String,
    pub enabled: bool,
    pub roles: Vec<Role>,
}

/// UpdateUser model for partial updates
/// Derives AsChangeset for UPDATE operations with optional fields.
///
/// `avatar` is doubly optional: `None` leaves the column untouched while
/// `Some(None)` writes SQL NULL, which is how the avatar-delete branch
/// clears a stored reference.
#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub enabled: Option<bool>,
    pub avatar: Option<Option<String>>,
}

impl UpdateUser {
    /// True when no field would change, in which case an UPDATE statement
    /// would have an empty SET clause and diesel rejects it.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.gender.is_none()
            && self.enabled.is_none()
            && self.avatar.is_none()
    }
}
