// Endpoint groups, implemented as inherent methods on `ApiClient`.

mod auth;
mod notifications;
mod recipes;
mod users;
