/// Router Module Index
///
/// Routes are grouped by the access level they need. The route guard in front of the
/// whole router is what actually enforces the admin group; the grouping keeps the
/// privileged endpoints under the prefixes the guard protects.

/// Routes open to everyone: health, sign-up/sign-in, reading content, the contact form.
pub mod public;

/// Routes that need any valid session.
pub mod authenticated;

/// Routes under `/api/admin`, reachable only with a privileged token.
pub mod admin;
