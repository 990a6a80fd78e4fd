//! Info panel content for a selected location.

use geofind_core::Location;

/// Placeholder shown while location records carry no imagery of their own.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/56/ffffff/999999/?text=m";

/// Display-ready panel fields. Absent or empty values render as `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPanel {
    pub image: String,
    pub title: String,
    pub category: String,
    pub address_street: String,
    pub address_city: String,
    pub phone_numbers: String,
    pub href: String,
    pub email: String,
    pub desc: String,
}

impl InfoPanel {
    #[must_use]
    pub fn from_location(location: &Location) -> Self {
        Self {
            image: PLACEHOLDER_IMAGE.to_string(),
            title: or_slash(Some(&location.title)),
            category: or_slash(location.category.as_deref()),
            address_street: or_slash(location.address_street.as_deref()),
            address_city: or_slash(location.address_city.as_deref()),
            phone_numbers: format_phone_numbers(location.phone_numbers.as_deref()),
            href: or_slash(location.href.as_deref()),
            email: or_slash(location.email.as_deref()),
            desc: or_slash(location.desc.as_deref()),
        }
    }
}

fn or_slash(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "/".to_string(),
    }
}

/// Comma-separated numbers are trimmed and re-joined with a uniform `, `
/// separator; a single number passes through untouched.
fn format_phone_numbers(raw: Option<&str>) -> String {
    match raw {
        Some(raw) if !raw.is_empty() => {
            if raw.contains(',') {
                raw.split(',').map(str::trim).collect::<Vec<_>>().join(", ")
            } else {
                raw.to_string()
            }
        }
        _ => "/".to_string(),
    }
}
