use shared::domain::Employee;

/// Derives the displayed subset of `authoritative` for a search term.
///
/// The term is trimmed and matched case-insensitively as a substring of the
/// full name, email or document. Matching records keep their relative order;
/// a blank term returns every record.
pub fn filter_employees(authoritative: &[Employee], term: &str) -> Vec<Employee> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return authoritative.to_vec();
    }

    authoritative
        .iter()
        .filter(|employee| matches_term(employee, &needle))
        .cloned()
        .collect()
}

fn matches_term(employee: &Employee, needle: &str) -> bool {
    [&employee.full_name, &employee.email, &employee.document]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
