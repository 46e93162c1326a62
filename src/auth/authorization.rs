//! Ownership rule for todos: only the user who created a todo may read,
//! change or delete it.

use crate::models::Todo;

pub fn is_owner(requester_id: i64, owner_id: i64) -> bool {
    requester_id == owner_id
}

pub fn can_modify(requester_id: i64, todo: &Todo) -> bool {
    is_owner(requester_id, todo.user_id)
}
