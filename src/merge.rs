/// Add `new_role` to the `allowed_roles` of a Vault database connection.
///
/// Returns the merged list and whether it differs from `current`. Existing entries
/// keep their order, a missing role is appended at the end.
pub fn merge_allowed_roles(current: &[String], new_role: &str) -> (Vec<String>, bool) {
    if current.iter().any(|role| role == new_role) {
        return (current.to_vec(), false);
    }

    let mut merged = current.to_vec();
    merged.push(new_role.to_string());

    (merged, true)
}
